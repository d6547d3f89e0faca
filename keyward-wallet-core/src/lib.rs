//! Keyward Wallet Core
//!
//! Encrypted keystore wallets and the account key retrieval protocol.
//!
//! ## Architecture
//!
//! - **Domain**: capability traits for wallets and accounts, qualified name resolution
//! - **Core**: key material, secret candidates, keystore management, key retrieval
//! - **Infrastructure**: storage backends and the concrete keystore wallets
//! - **Shared**: common types, constants, errors and utilities
//!
//! ## Security Features
//!
//! - Key and seed bytes live in zeroizing buffers
//! - Argon2id + AES-256-GCM for every secret at rest
//! - Accounts unlocked for an export are locked again afterwards
//!
//! ## Usage
//!
//! ```rust,no_run
//! use keyward_wallet_core::{FileStorage, SecretCandidates, WalletCore};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), keyward_wallet_core::WalletError> {
//! let storage = Arc::new(FileStorage::new("/tmp/keyward/wallets")?);
//! let core = WalletCore::new(storage, Duration::from_secs(10));
//!
//! let secrets = SecretCandidates::from_strings(None, ["first guess", "second guess"]);
//! let retrieval = core.account_key("Personal/Operations", &secrets).await;
//! let key = retrieval.into_result()?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

pub mod core;
pub mod domain;
pub mod shared;
pub mod infrastructure;

pub use crate::core::crypto::{KdfParams, KeyDeriver, PrivateKeyBytes, SecretEnvelope};
pub use crate::core::retrieval::{KeyRetrieval, KeyRetriever, RelockGuard};
pub use crate::core::secrets::{SecretCandidates, SecretSource};
pub use crate::core::storage::{CreatedWallet, KeystoreManager};
pub use crate::domain::capabilities::{
    Account, AccountByNameProvider, AccountLocker, KeyMaterial, PrivateKeyProvider, Wallet,
    WalletLocker,
};
pub use crate::domain::reference::{NameResolver, QualifiedNameResolver};
pub use crate::infrastructure::platform::{FileStorage, MemoryStorage, WalletStore};
pub use shared::error::{ErrorKind, WalletError, WalletResult};
pub use shared::types::{AccountReference, SecretBytes, WalletType};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Install `env_logger` for embedders that have no logger of their own.
/// Safe to call more than once.
pub fn init() {
    if env_logger::try_init().is_ok() {
        log::debug!("{} {} logging initialized", NAME, VERSION);
    }
}

/// Keystore plus retrieval, wired to one store
pub struct WalletCore {
    pub keystore: KeystoreManager,
    pub retriever: KeyRetriever,
}

impl WalletCore {
    pub fn new(store: Arc<dyn WalletStore>, timeout: Duration) -> Self {
        Self {
            keystore: KeystoreManager::new(store),
            retriever: KeyRetriever::new(timeout),
        }
    }

    pub fn from_parts(keystore: KeystoreManager, retriever: KeyRetriever) -> Self {
        Self { keystore, retriever }
    }

    /// Open the wallet named by `qualifier` and retrieve the account's key
    pub async fn account_key(&self, qualifier: &str, secrets: &dyn SecretSource) -> KeyRetrieval {
        let wallet = match QualifiedNameResolver::wallet_name(qualifier)
            .and_then(|name| self.keystore.open_wallet(&name))
        {
            Ok(wallet) => wallet,
            Err(e) => {
                return KeyRetrieval { outcome: Err(e), relock_error: None };
            }
        };
        self.retriever
            .retrieve_private_key(wallet.as_ref(), qualifier, secrets)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "keyward-wallet-core");
    }

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
    }

    #[tokio::test]
    async fn test_account_key_for_unknown_wallet() {
        let core = WalletCore::new(Arc::new(MemoryStorage::new()), Duration::from_secs(1));
        let retrieval = core
            .account_key("Ghost/Operations", &SecretCandidates::new())
            .await;
        assert_eq!(retrieval.outcome.err().map(|e| e.kind()), Some(ErrorKind::WalletNotFound));
    }

    #[tokio::test]
    async fn test_account_key_for_malformed_reference() {
        let core = WalletCore::new(Arc::new(MemoryStorage::new()), Duration::from_secs(1));
        let retrieval = core.account_key("", &SecretCandidates::new()).await;
        assert_eq!(retrieval.outcome.err().map(|e| e.kind()), Some(ErrorKind::InvalidReference));
    }
}
