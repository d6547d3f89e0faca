//! Constants for the wallet core
//!
//! This module contains all constants used throughout the wallet core.

// Wallet type tags as reported by `Wallet::wallet_type`
pub const HD_WALLET_TYPE: &str = "hierarchical deterministic";
pub const ND_WALLET_TYPE: &str = "non-deterministic";

/// Account names starting with this marker are derivation paths
pub const DERIVATION_PATH_PREFIX: &str = "m/";

/// Parent of the accounts created inside an HD wallet; the index is appended
pub const DEFAULT_ACCOUNT_PATH_BASE: &str = "m/44'/60'/0'/0";

/// Separator between wallet and account in a qualified account name
pub const ACCOUNT_SEPARATOR: char = '/';

// Security constants
pub const PRIVATE_KEY_SIZE: usize = 32;
pub const KEY_SIZE: usize = 32;
pub const NONCE_SIZE: usize = 12;
pub const TAG_SIZE: usize = 16;
pub const SALT_SIZE: usize = 16;

// Argon2id defaults for the keystore envelope
pub const ARGON2_MEMORY_COST: u32 = 65536;
pub const ARGON2_TIME_COST: u32 = 3;
pub const ARGON2_PARALLELISM: u32 = 1;

// Storage constants
pub const KEYSTORE_VERSION: u32 = 1;
pub const WALLET_FILE_EXTENSION: &str = "json";

/// Default bound for each blocking sub-operation, in seconds
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 10;
