//! Error handling for the wallet core
//!
//! This module defines the error type used throughout the wallet core. The
//! first group of variants is the classification surfaced by account key
//! retrieval; the rest come from the keystore implementation.

use thiserror::Error;

/// Wallet error type
#[derive(Error, Debug, Clone)]
pub enum WalletError {
    #[error("Invalid account reference: {0}")]
    InvalidReference(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Unlock failed: {0}")]
    UnlockFailed(String),

    #[error("Export failed: {0}")]
    ExportFailed(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Relock failed: {0}")]
    RelockFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Wallet not found: {0}")]
    WalletNotFound(String),

    #[error("Wallet already exists: {0}")]
    WalletAlreadyExists(String),

    #[error("Account already exists: {0}")]
    AccountAlreadyExists(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result alias used across the crate
pub type WalletResult<T> = Result<T, WalletError>;

/// Payload-free classification of a [`WalletError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidReference,
    MissingCredential,
    UnsupportedOperation,
    AccountNotFound,
    UnlockFailed,
    ExportFailed,
    Timeout,
    RelockFailed,
    Config,
    Crypto,
    Validation,
    Storage,
    WalletNotFound,
    WalletAlreadyExists,
    AccountAlreadyExists,
    Internal,
}

impl WalletError {
    /// Create an invalid reference error
    pub fn invalid_reference(message: impl Into<String>) -> Self {
        Self::InvalidReference(message.into())
    }

    /// Create a missing credential error
    pub fn missing_credential(message: impl Into<String>) -> Self {
        Self::MissingCredential(message.into())
    }

    /// Create an unsupported operation error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation(message.into())
    }

    /// Create an account not found error
    pub fn account_not_found(message: impl Into<String>) -> Self {
        Self::AccountNotFound(message.into())
    }

    /// Create an unlock failure
    pub fn unlock_failed(message: impl Into<String>) -> Self {
        Self::UnlockFailed(message.into())
    }

    /// Create an export failure
    pub fn export_failed(message: impl Into<String>) -> Self {
        Self::ExportFailed(message.into())
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout(message.into())
    }

    /// Create a relock failure
    pub fn relock_failed(message: impl Into<String>) -> Self {
        Self::RelockFailed(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a cryptographic error
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create a wallet not found error
    pub fn wallet_not_found(message: impl Into<String>) -> Self {
        Self::WalletNotFound(message.into())
    }

    /// Create a wallet already exists error
    pub fn wallet_already_exists(message: impl Into<String>) -> Self {
        Self::WalletAlreadyExists(message.into())
    }

    /// Create an account already exists error
    pub fn account_already_exists(message: impl Into<String>) -> Self {
        Self::AccountAlreadyExists(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidReference(_) => ErrorKind::InvalidReference,
            Self::MissingCredential(_) => ErrorKind::MissingCredential,
            Self::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            Self::AccountNotFound(_) => ErrorKind::AccountNotFound,
            Self::UnlockFailed(_) => ErrorKind::UnlockFailed,
            Self::ExportFailed(_) => ErrorKind::ExportFailed,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::RelockFailed(_) => ErrorKind::RelockFailed,
            Self::Config(_) => ErrorKind::Config,
            Self::Crypto(_) => ErrorKind::Crypto,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Storage(_) => ErrorKind::Storage,
            Self::WalletNotFound(_) => ErrorKind::WalletNotFound,
            Self::WalletAlreadyExists(_) => ErrorKind::WalletAlreadyExists,
            Self::AccountAlreadyExists(_) => ErrorKind::AccountAlreadyExists,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Message without the kind prefix
    pub fn detail(&self) -> &str {
        match self {
            Self::InvalidReference(m)
            | Self::MissingCredential(m)
            | Self::UnsupportedOperation(m)
            | Self::AccountNotFound(m)
            | Self::UnlockFailed(m)
            | Self::ExportFailed(m)
            | Self::Timeout(m)
            | Self::RelockFailed(m)
            | Self::Config(m)
            | Self::Crypto(m)
            | Self::Validation(m)
            | Self::Storage(m)
            | Self::WalletNotFound(m)
            | Self::WalletAlreadyExists(m)
            | Self::AccountAlreadyExists(m)
            | Self::Internal(m) => m,
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for WalletError {
    fn from(err: std::io::Error) -> Self {
        Self::storage(format!("IO error: {}", err))
    }
}

impl From<hex::FromHexError> for WalletError {
    fn from(err: hex::FromHexError) -> Self {
        Self::validation(format!("Hex decoding error: {}", err))
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        Self::storage(format!("JSON error: {}", err))
    }
}

impl From<tokio::task::JoinError> for WalletError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal(format!("Task join error: {}", err))
    }
}

// Cryptographic error conversions
impl From<secp256k1::Error> for WalletError {
    fn from(err: secp256k1::Error) -> Self {
        Self::crypto(format!("Secp256k1 error: {}", err))
    }
}

impl From<argon2::Error> for WalletError {
    fn from(err: argon2::Error) -> Self {
        Self::crypto(format!("Argon2 error: {}", err))
    }
}

impl From<aes_gcm::Error> for WalletError {
    fn from(err: aes_gcm::Error) -> Self {
        Self::crypto(format!("AES-GCM error: {}", err))
    }
}
