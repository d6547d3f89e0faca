//! Infrastructure layer - storage backends and keystore wallets
//!
//! This module contains the concrete wallet and account types behind the
//! capability traits, and the stores their documents are persisted in.

pub mod platform;
pub mod keystore;

// Re-export infrastructure components
pub use platform::*;
pub use keystore::*;
