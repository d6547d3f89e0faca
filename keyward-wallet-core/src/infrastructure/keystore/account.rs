use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

use super::{open_envelope, AccountDocument};
use crate::core::crypto::PrivateKeyBytes;
use crate::domain::capabilities::{Account, AccountLocker, KeyMaterial, PrivateKeyProvider};
use crate::shared::error::{WalletError, WalletResult};

type KeySlot = Mutex<Option<PrivateKeyBytes>>;

fn slot(key: &KeySlot) -> WalletResult<MutexGuard<'_, Option<PrivateKeyBytes>>> {
    key.lock()
        .map_err(|_| WalletError::internal("Account key lock poisoned"))
}

fn export(key: &KeySlot, account_name: &str) -> WalletResult<Box<dyn KeyMaterial>> {
    let guard = slot(key)?;
    let key = guard.as_ref().ok_or_else(|| {
        WalletError::export_failed(format!("account {:?} is locked", account_name))
    })?;
    Ok(Box::new(PrivateKeyBytes::from_bytes(key.as_bytes())?))
}

/// Account persisted with its key sealed under the account passphrase.
///
/// Starts locked. `unlock` opens the envelope and keeps the key in memory
/// until `lock`.
pub struct StoredAccount {
    document: AccountDocument,
    key: KeySlot,
}

impl StoredAccount {
    pub fn new(document: AccountDocument) -> Self {
        Self { document, key: Mutex::new(None) }
    }
}

impl Account for StoredAccount {
    fn id(&self) -> &str {
        &self.document.id
    }

    fn name(&self) -> &str {
        &self.document.name
    }

    fn as_locker(&self) -> Option<&dyn AccountLocker> {
        Some(self)
    }

    fn as_private_key_provider(&self) -> Option<&dyn PrivateKeyProvider> {
        Some(self)
    }
}

#[async_trait]
impl AccountLocker for StoredAccount {
    async fn unlock(&self, passphrase: &[u8]) -> WalletResult<()> {
        let plaintext = open_envelope(&self.document.key, passphrase).await?;
        let key = PrivateKeyBytes::from_bytes(&plaintext)?;
        if key.public_key_hex()? != self.document.public_key {
            return Err(WalletError::crypto(format!(
                "key of account {:?} does not match its public key",
                self.document.name
            )));
        }
        *slot(&self.key)? = Some(key);
        Ok(())
    }

    async fn lock(&self) -> WalletResult<()> {
        slot(&self.key)?.take();
        Ok(())
    }

    async fn is_unlocked(&self) -> WalletResult<bool> {
        Ok(slot(&self.key)?.is_some())
    }
}

#[async_trait]
impl PrivateKeyProvider for StoredAccount {
    async fn private_key(&self) -> WalletResult<Box<dyn KeyMaterial>> {
        export(&self.key, &self.document.name)
    }
}

/// Account derived on demand from an unlocked HD seed.
///
/// It has no passphrase of its own: it is created unlocked and `unlock`
/// is refused.
pub struct DerivedAccount {
    id: String,
    path: String,
    key: KeySlot,
}

impl DerivedAccount {
    pub fn new(wallet_id: &str, path: &str, key: PrivateKeyBytes) -> Self {
        Self {
            id: format!("{}:{}", wallet_id, path),
            path: path.to_string(),
            key: Mutex::new(Some(key)),
        }
    }
}

impl Account for DerivedAccount {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.path
    }

    fn as_locker(&self) -> Option<&dyn AccountLocker> {
        Some(self)
    }

    fn as_private_key_provider(&self) -> Option<&dyn PrivateKeyProvider> {
        Some(self)
    }
}

#[async_trait]
impl AccountLocker for DerivedAccount {
    async fn unlock(&self, _passphrase: &[u8]) -> WalletResult<()> {
        Err(WalletError::unsupported(format!(
            "derived account {:?} is unlocked through its wallet",
            self.path
        )))
    }

    async fn lock(&self) -> WalletResult<()> {
        slot(&self.key)?.take();
        Ok(())
    }

    async fn is_unlocked(&self) -> WalletResult<bool> {
        Ok(slot(&self.key)?.is_some())
    }
}

#[async_trait]
impl PrivateKeyProvider for DerivedAccount {
    async fn private_key(&self) -> WalletResult<Box<dyn KeyMaterial>> {
        export(&self.key, &self.path)
    }
}
