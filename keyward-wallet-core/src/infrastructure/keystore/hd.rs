//! Hierarchical deterministic wallet
//!
//! Holds its BIP-39 seed sealed under the wallet passphrase. Named accounts
//! are stored like any other; names beginning with `m/` are treated as
//! derivation paths and derived from the seed, which needs the wallet to be
//! unlocked.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

use super::nd::{find_stored, stored_accounts};
use super::{open_envelope, DerivedAccount, StoredAccount, WalletDocument};
use crate::core::crypto::{KeyDeriver, SecretEnvelope};
use crate::domain::capabilities::{Account, AccountByNameProvider, Wallet, WalletLocker};
use crate::shared::constants::HD_WALLET_TYPE;
use crate::shared::error::{WalletError, WalletResult};
use crate::shared::types::{is_derivation_path, SecretBytes, WalletType};

pub struct HierarchicalDeterministicWallet {
    id: String,
    name: String,
    seed: SecretEnvelope,
    accounts: Vec<Arc<StoredAccount>>,
    unlocked_seed: Mutex<Option<SecretBytes>>,
}

impl HierarchicalDeterministicWallet {
    pub fn from_document(document: &WalletDocument) -> WalletResult<Self> {
        if document.wallet_type != WalletType::HierarchicalDeterministic {
            return Err(WalletError::validation(format!(
                "wallet {:?} is {}, not {}",
                document.name, document.wallet_type, HD_WALLET_TYPE
            )));
        }
        let seed = document.seed.clone().ok_or_else(|| {
            WalletError::storage(format!("HD wallet {:?} has no seed", document.name))
        })?;
        Ok(Self {
            id: document.id.clone(),
            name: document.name.clone(),
            seed,
            accounts: stored_accounts(document),
            unlocked_seed: Mutex::new(None),
        })
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Arc<StoredAccount>> {
        self.accounts.iter()
    }

    fn seed_slot(&self) -> WalletResult<MutexGuard<'_, Option<SecretBytes>>> {
        self.unlocked_seed
            .lock()
            .map_err(|_| WalletError::internal("Wallet seed lock poisoned"))
    }

    fn derive(&self, path: &str) -> WalletResult<Arc<dyn Account>> {
        let seed = self.seed_slot()?.clone().ok_or_else(|| {
            WalletError::unlock_failed(format!(
                "wallet {:?} must be unlocked to derive {:?}",
                self.name, path
            ))
        })?;
        let key = KeyDeriver::derive(&seed, path).map_err(|e| {
            WalletError::account_not_found(format!(
                "{:?} in wallet {:?}: {}",
                path,
                self.name,
                e.detail()
            ))
        })?;
        log::debug!("Derived account {:?} in wallet {:?}", path, self.name);
        Ok(Arc::new(DerivedAccount::new(&self.id, path, key)))
    }
}

impl Wallet for HierarchicalDeterministicWallet {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn wallet_type(&self) -> &str {
        HD_WALLET_TYPE
    }

    fn as_locker(&self) -> Option<&dyn WalletLocker> {
        Some(self)
    }

    fn as_account_provider(&self) -> Option<&dyn AccountByNameProvider> {
        Some(self)
    }
}

#[async_trait]
impl WalletLocker for HierarchicalDeterministicWallet {
    async fn unlock(&self, passphrase: &[u8]) -> WalletResult<()> {
        let seed = open_envelope(&self.seed, passphrase).await?;
        *self.seed_slot()? = Some(seed);
        Ok(())
    }

    async fn lock(&self) -> WalletResult<()> {
        self.seed_slot()?.take();
        Ok(())
    }

    async fn is_unlocked(&self) -> WalletResult<bool> {
        Ok(self.seed_slot()?.is_some())
    }
}

#[async_trait]
impl AccountByNameProvider for HierarchicalDeterministicWallet {
    async fn account_by_name(&self, name: &str) -> WalletResult<Arc<dyn Account>> {
        if is_derivation_path(name) {
            return self.derive(name);
        }
        find_stored(&self.accounts, &self.name, name)
    }
}
