use async_trait::async_trait;
use std::sync::Arc;

use super::{StoredAccount, WalletDocument};
use crate::domain::capabilities::{Account, AccountByNameProvider, Wallet};
use crate::shared::constants::ND_WALLET_TYPE;
use crate::shared::error::{WalletError, WalletResult};
use crate::shared::types::WalletType;

/// Wallet of independently imported accounts. There is no wallet passphrase.
pub struct NonDeterministicWallet {
    id: String,
    name: String,
    accounts: Vec<Arc<StoredAccount>>,
}

impl NonDeterministicWallet {
    pub fn from_document(document: &WalletDocument) -> WalletResult<Self> {
        if document.wallet_type != WalletType::NonDeterministic {
            return Err(WalletError::validation(format!(
                "wallet {:?} is {}, not {}",
                document.name, document.wallet_type, ND_WALLET_TYPE
            )));
        }
        Ok(Self {
            id: document.id.clone(),
            name: document.name.clone(),
            accounts: stored_accounts(document),
        })
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Arc<StoredAccount>> {
        self.accounts.iter()
    }
}

pub(super) fn stored_accounts(document: &WalletDocument) -> Vec<Arc<StoredAccount>> {
    document
        .accounts
        .iter()
        .cloned()
        .map(|account| Arc::new(StoredAccount::new(account)))
        .collect()
}

pub(super) fn find_stored(
    accounts: &[Arc<StoredAccount>],
    wallet_name: &str,
    name: &str,
) -> WalletResult<Arc<dyn Account>> {
    accounts
        .iter()
        .find(|account| account.name() == name)
        .map(|account| account.clone() as Arc<dyn Account>)
        .ok_or_else(|| {
            WalletError::account_not_found(format!("{:?} in wallet {:?}", name, wallet_name))
        })
}

impl Wallet for NonDeterministicWallet {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn wallet_type(&self) -> &str {
        ND_WALLET_TYPE
    }

    fn as_account_provider(&self) -> Option<&dyn AccountByNameProvider> {
        Some(self)
    }
}

#[async_trait]
impl AccountByNameProvider for NonDeterministicWallet {
    async fn account_by_name(&self, name: &str) -> WalletResult<Arc<dyn Account>> {
        find_stored(&self.accounts, &self.name, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::crypto::{KdfParams, PrivateKeyBytes};
    use crate::infrastructure::keystore::AccountDocument;
    use crate::shared::error::ErrorKind;

    fn wallet() -> NonDeterministicWallet {
        let key = PrivateKeyBytes::generate().expect("key");
        let mut document = WalletDocument::non_deterministic("Personal");
        document.accounts.push(
            AccountDocument::seal("Operations", &key, b"pw", KdfParams::insecure_fast(), None)
                .expect("seal"),
        );
        NonDeterministicWallet::from_document(&document).expect("wallet")
    }

    #[tokio::test]
    async fn test_lookup_by_name() {
        let wallet = wallet();
        let account = wallet.account_by_name("Operations").await.expect("account");
        assert_eq!(account.name(), "Operations");
        assert!(account.as_locker().is_some());
        assert_eq!(wallet.accounts().count(), 1);
    }

    #[tokio::test]
    async fn test_missing_and_path_names_not_found() {
        let wallet = wallet();
        for name in ["Savings", "m/44'/60'/0'/0/0"] {
            let err = wallet.account_by_name(name).await.err().expect("absent");
            assert_eq!(err.kind(), ErrorKind::AccountNotFound);
        }
    }

    #[tokio::test]
    async fn test_lookup_returns_same_handle() {
        let wallet = wallet();
        let first = wallet.account_by_name("Operations").await.expect("account");
        first.as_locker().expect("locker").unlock(b"pw").await.expect("unlock");
        let second = wallet.account_by_name("Operations").await.expect("account");
        assert!(second.as_locker().expect("locker").is_unlocked().await.expect("state"));
    }

    #[test]
    fn test_rejects_hd_document() {
        let document = WalletDocument::hierarchical("Seeded", &[2u8; 64], b"pw", KdfParams::insecure_fast())
            .expect("document");
        assert!(NonDeterministicWallet::from_document(&document).is_err());
    }
}
