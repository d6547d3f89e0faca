//! Encrypted keystore wallets
//!
//! Wallet documents are JSON. Every account key is sealed in its own
//! [`SecretEnvelope`] under the account passphrase; HD wallets additionally
//! seal their seed under the wallet passphrase.

pub mod account;
pub mod hd;
pub mod nd;

pub use account::*;
pub use hd::*;
pub use nd::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::crypto::{KdfParams, PrivateKeyBytes, SecretEnvelope};
use crate::domain::capabilities::Wallet;
use crate::shared::constants::KEYSTORE_VERSION;
use crate::shared::error::{WalletError, WalletResult};
use crate::shared::types::{SecretBytes, WalletType};
use crate::shared::utils::generate_id;

/// Persisted account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountDocument {
    pub id: String,
    pub name: String,
    pub public_key: String,
    /// Derivation path, for accounts created inside an HD wallet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub key: SecretEnvelope,
    pub created_at: DateTime<Utc>,
}

impl AccountDocument {
    /// Seal `key` under `passphrase`. Runs the KDF; call from a blocking context.
    pub fn seal(
        name: &str,
        key: &PrivateKeyBytes,
        passphrase: &[u8],
        kdf: KdfParams,
        path: Option<String>,
    ) -> WalletResult<Self> {
        Ok(Self {
            id: generate_id(),
            name: name.to_string(),
            public_key: key.public_key_hex()?,
            path,
            key: SecretEnvelope::seal(key.as_bytes(), passphrase, kdf)?,
            created_at: Utc::now(),
        })
    }
}

/// Persisted wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletDocument {
    pub version: u32,
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub wallet_type: WalletType,
    /// HD seed sealed under the wallet passphrase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<SecretEnvelope>,
    /// Index used for the next account created in an HD wallet
    #[serde(default)]
    pub next_account: u32,
    #[serde(default)]
    pub accounts: Vec<AccountDocument>,
    pub created_at: DateTime<Utc>,
}

impl WalletDocument {
    pub fn non_deterministic(name: &str) -> Self {
        Self::new(name, WalletType::NonDeterministic, None)
    }

    /// Seal `seed` under `passphrase`. Runs the KDF; call from a blocking context.
    pub fn hierarchical(name: &str, seed: &[u8], passphrase: &[u8], kdf: KdfParams) -> WalletResult<Self> {
        let envelope = SecretEnvelope::seal(seed, passphrase, kdf)?;
        Ok(Self::new(name, WalletType::HierarchicalDeterministic, Some(envelope)))
    }

    fn new(name: &str, wallet_type: WalletType, seed: Option<SecretEnvelope>) -> Self {
        Self {
            version: KEYSTORE_VERSION,
            id: generate_id(),
            name: name.to_string(),
            wallet_type,
            seed,
            next_account: 0,
            accounts: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn account(&self, name: &str) -> Option<&AccountDocument> {
        self.accounts.iter().find(|account| account.name == name)
    }

    pub fn from_json(data: &[u8]) -> WalletResult<Self> {
        let document: Self = serde_json::from_slice(data)?;
        if document.version != KEYSTORE_VERSION {
            return Err(WalletError::storage(format!(
                "Unsupported keystore version {} for wallet {:?}",
                document.version, document.name
            )));
        }
        Ok(document)
    }

    pub fn to_json(&self) -> WalletResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Open the document as a wallet handle, with every account locked
    pub fn open(&self) -> WalletResult<Arc<dyn Wallet>> {
        let wallet: Arc<dyn Wallet> = match self.wallet_type {
            WalletType::NonDeterministic => Arc::new(NonDeterministicWallet::from_document(self)?),
            WalletType::HierarchicalDeterministic => {
                Arc::new(HierarchicalDeterministicWallet::from_document(self)?)
            }
        };
        Ok(wallet)
    }
}

/// Run the KDF-bound `open` of an envelope off the async executor
pub(crate) async fn open_envelope(envelope: &SecretEnvelope, passphrase: &[u8]) -> WalletResult<SecretBytes> {
    let envelope = envelope.clone();
    let passphrase = SecretBytes::new(passphrase.to_vec());
    tokio::task::spawn_blocking(move || envelope.open(&passphrase)).await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::ErrorKind;

    #[test]
    fn test_document_json_shape() {
        let key = PrivateKeyBytes::generate().expect("key");
        let mut document = WalletDocument::non_deterministic("Personal");
        document.accounts.push(
            AccountDocument::seal("Operations", &key, b"pw", KdfParams::insecure_fast(), None)
                .expect("seal"),
        );

        let json: serde_json::Value =
            serde_json::from_slice(&document.to_json().expect("json")).expect("parse");
        assert_eq!(json["type"], "non_deterministic");
        assert_eq!(json["accounts"][0]["name"], "Operations");
        assert!(json.get("seed").is_none());
        assert!(json["accounts"][0].get("path").is_none());

        let restored = WalletDocument::from_json(&document.to_json().expect("json")).expect("restore");
        assert_eq!(restored.account("Operations").expect("account").public_key, key.public_key_hex().expect("pk"));
    }

    #[test]
    fn test_unknown_version_rejected() {
        let mut document = WalletDocument::non_deterministic("Personal");
        document.version = KEYSTORE_VERSION + 1;
        let err = WalletDocument::from_json(&document.to_json().expect("json")).expect_err("version");
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[test]
    fn test_open_reports_type_tag() {
        let document = WalletDocument::hierarchical("Seeded", &[1u8; 64], b"pw", KdfParams::insecure_fast())
            .expect("hd document");
        let wallet = document.open().expect("open");
        assert_eq!(wallet.wallet_type(), "hierarchical deterministic");
        assert_eq!(wallet.name(), "Seeded");
        assert!(wallet.as_locker().is_some());

        let wallet = WalletDocument::non_deterministic("Plain").open().expect("open");
        assert_eq!(wallet.wallet_type(), "non-deterministic");
        assert!(wallet.as_locker().is_none());
        assert!(wallet.as_account_provider().is_some());
    }
}
