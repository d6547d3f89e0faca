//! Key material and derivation for the wallet core

pub mod secure_private_key;
pub mod key_manager;

// Re-export all public items from submodules
pub use secure_private_key::*;
pub use key_manager::*;
