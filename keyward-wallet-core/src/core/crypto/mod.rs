//! Cryptographic functionality for the wallet core
//!
//! This module provides key material handling, HD derivation and the
//! passphrase envelope used by the keystore.
//!
//! SECURITY: key and seed bytes live in zeroizing buffers and no type here
//! implements `Debug` over secret content.

pub mod keys;
pub mod encryption;

// Re-export all public items from submodules
pub use keys::*;
pub use encryption::*;
