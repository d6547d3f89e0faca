//! CLI subcommand implementations.

use anyhow::Result;
use std::sync::Arc;

use keyward_wallet_core::{FileStorage, KeyRetriever, KeystoreManager, WalletCore};

use crate::infrastructure::config::CliConfig;

pub mod account_create;
pub mod account_import;
pub mod account_key;
pub mod wallet_create;

/// Keystore and retriever rooted at the configured base directory
pub(crate) fn wallet_core(config: &CliConfig) -> Result<WalletCore> {
    let storage = Arc::new(FileStorage::new(config.base_dir.clone())?);
    let keystore = KeystoreManager::new(storage).with_kdf(config.kdf);
    Ok(WalletCore::from_parts(keystore, KeyRetriever::new(config.timeout())))
}
