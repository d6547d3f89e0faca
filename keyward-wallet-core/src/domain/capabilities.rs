//! Wallet and account capability model
//!
//! An opened wallet or account is an opaque handle that supports some subset
//! of optional capabilities. Each handle advertises what it supports through
//! the `as_*` accessors; callers take a [`WalletView`] or [`AccountView`] once
//! and branch on the captured options instead of probing repeatedly.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::shared::error::WalletResult;
use crate::shared::types::SecretBytes;

/// An opened wallet
pub trait Wallet: Send + Sync {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    /// Type tag, e.g. `"hierarchical deterministic"`
    fn wallet_type(&self) -> &str;

    fn as_locker(&self) -> Option<&dyn WalletLocker> {
        None
    }

    fn as_account_provider(&self) -> Option<&dyn AccountByNameProvider> {
        None
    }
}

/// An account handle obtained from a wallet
pub trait Account: Send + Sync {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn as_locker(&self) -> Option<&dyn AccountLocker> {
        None
    }

    fn as_private_key_provider(&self) -> Option<&dyn PrivateKeyProvider> {
        None
    }
}

/// Wallet-wide unlock and lock
#[async_trait]
pub trait WalletLocker: Send + Sync {
    async fn unlock(&self, passphrase: &[u8]) -> WalletResult<()>;

    async fn lock(&self) -> WalletResult<()>;

    async fn is_unlocked(&self) -> WalletResult<bool>;
}

/// Account-level unlock and lock
#[async_trait]
pub trait AccountLocker: Send + Sync {
    async fn unlock(&self, passphrase: &[u8]) -> WalletResult<()>;

    async fn lock(&self) -> WalletResult<()>;

    async fn is_unlocked(&self) -> WalletResult<bool>;
}

/// Fetch an account handle by name. Absence is `AccountNotFound`.
#[async_trait]
pub trait AccountByNameProvider: Send + Sync {
    async fn account_by_name(&self, name: &str) -> WalletResult<Arc<dyn Account>>;
}

/// Raw private key export
#[async_trait]
pub trait PrivateKeyProvider: Send + Sync {
    async fn private_key(&self) -> WalletResult<Box<dyn KeyMaterial>>;
}

/// Exported key material
pub trait KeyMaterial: Send + Sync {
    fn marshal(&self) -> SecretBytes;
}

/// Which optional wallet capabilities a handle supports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalletCapabilities {
    pub locker: bool,
    pub account_lookup: bool,
}

/// Which optional account capabilities a handle supports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountCapabilities {
    pub locker: bool,
    pub private_key_export: bool,
}

impl fmt::Display for WalletCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "locker={} account_lookup={}", self.locker, self.account_lookup)
    }
}

impl fmt::Display for AccountCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "locker={} private_key_export={}", self.locker, self.private_key_export)
    }
}

/// Wallet handle with its capabilities resolved once
pub struct WalletView<'a> {
    pub wallet: &'a dyn Wallet,
    pub locker: Option<&'a dyn WalletLocker>,
    pub accounts: Option<&'a dyn AccountByNameProvider>,
}

impl<'a> WalletView<'a> {
    pub fn of(wallet: &'a dyn Wallet) -> Self {
        Self {
            wallet,
            locker: wallet.as_locker(),
            accounts: wallet.as_account_provider(),
        }
    }

    pub fn capabilities(&self) -> WalletCapabilities {
        WalletCapabilities {
            locker: self.locker.is_some(),
            account_lookup: self.accounts.is_some(),
        }
    }
}

/// Account handle with its capabilities resolved once
pub struct AccountView<'a> {
    pub account: &'a dyn Account,
    pub locker: Option<&'a dyn AccountLocker>,
    pub exporter: Option<&'a dyn PrivateKeyProvider>,
}

impl<'a> AccountView<'a> {
    pub fn of(account: &'a dyn Account) -> Self {
        Self {
            account,
            locker: account.as_locker(),
            exporter: account.as_private_key_provider(),
        }
    }

    pub fn capabilities(&self) -> AccountCapabilities {
        AccountCapabilities {
            locker: self.locker.is_some(),
            private_key_export: self.exporter.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BareWallet;

    impl Wallet for BareWallet {
        fn id(&self) -> &str {
            "bare"
        }
        fn name(&self) -> &str {
            "Bare"
        }
        fn wallet_type(&self) -> &str {
            "non-deterministic"
        }
    }

    struct ExportOnlyAccount;

    struct FixedKey;

    impl KeyMaterial for FixedKey {
        fn marshal(&self) -> SecretBytes {
            SecretBytes::new(vec![7u8; 4])
        }
    }

    impl Account for ExportOnlyAccount {
        fn id(&self) -> &str {
            "acct"
        }
        fn name(&self) -> &str {
            "Export only"
        }
        fn as_private_key_provider(&self) -> Option<&dyn PrivateKeyProvider> {
            Some(self)
        }
    }

    #[async_trait]
    impl PrivateKeyProvider for ExportOnlyAccount {
        async fn private_key(&self) -> WalletResult<Box<dyn KeyMaterial>> {
            Ok(Box::new(FixedKey))
        }
    }

    #[test]
    fn test_wallet_without_capabilities() {
        let wallet = BareWallet;
        let view = WalletView::of(&wallet);
        assert_eq!(view.capabilities(), WalletCapabilities::default());
        assert!(view.locker.is_none());
        assert!(view.accounts.is_none());
    }

    #[tokio::test]
    async fn test_account_capabilities_reflect_accessors() {
        let account = ExportOnlyAccount;
        let view = AccountView::of(&account);
        assert_eq!(
            view.capabilities(),
            AccountCapabilities { locker: false, private_key_export: true }
        );

        let exporter = view.exporter.expect("exporter advertised");
        let key = exporter.private_key().await.expect("export should succeed");
        assert_eq!(&*key.marshal(), &[7u8; 4]);
    }

    #[test]
    fn test_capabilities_display() {
        let caps = AccountCapabilities { locker: true, private_key_export: false };
        assert_eq!(caps.to_string(), "locker=true private_key_export=false");
    }
}
