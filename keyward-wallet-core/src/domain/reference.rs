//! Resolution of qualified `wallet/account` names

use crate::shared::constants::ACCOUNT_SEPARATOR;
use crate::shared::error::{WalletError, WalletResult};
use crate::shared::types::AccountReference;

/// Maps a qualified account string to its wallet and account components
pub trait NameResolver: Send + Sync {
    fn resolve(&self, qualifier: &str) -> WalletResult<AccountReference>;
}

/// Splits on the first `/`.
///
/// Everything after the first separator is the account name, so derivation
/// paths such as `Wallet/m/44'/60'/0'/0/0` keep their own separators.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualifiedNameResolver;

impl QualifiedNameResolver {
    pub fn new() -> Self {
        Self
    }

    /// Wallet name alone; the account part may be absent
    pub fn wallet_name(qualifier: &str) -> WalletResult<String> {
        if qualifier.is_empty() {
            return Err(WalletError::invalid_reference("account reference is empty"));
        }
        match qualifier.find(ACCOUNT_SEPARATOR) {
            Some(0) => Err(WalletError::invalid_reference(format!(
                "account reference {:?} has no wallet name",
                qualifier
            ))),
            Some(index) => Ok(qualifier[..index].to_string()),
            None => Ok(qualifier.to_string()),
        }
    }
}

impl NameResolver for QualifiedNameResolver {
    fn resolve(&self, qualifier: &str) -> WalletResult<AccountReference> {
        let wallet_name = Self::wallet_name(qualifier)?;
        let account_name = qualifier
            .find(ACCOUNT_SEPARATOR)
            .map(|index| &qualifier[index + 1..])
            .unwrap_or("");

        if account_name.is_empty() {
            return Err(WalletError::invalid_reference(format!(
                "account reference {:?} has no account name",
                qualifier
            )));
        }

        Ok(AccountReference::new(wallet_name, account_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::ErrorKind;

    #[test]
    fn test_resolves_wallet_and_account() {
        let reference = QualifiedNameResolver
            .resolve("Personal wallet/Operations")
            .expect("well-formed reference");
        assert_eq!(reference.wallet_name, "Personal wallet");
        assert_eq!(reference.account_name, "Operations");
    }

    #[test]
    fn test_derivation_path_keeps_separators() {
        let reference = QualifiedNameResolver
            .resolve("HD/m/44'/60'/0'/0/3")
            .expect("path reference");
        assert_eq!(reference.wallet_name, "HD");
        assert_eq!(reference.account_name, "m/44'/60'/0'/0/3");
        assert!(reference.is_derivation_path());
    }

    #[test]
    fn test_malformed_references() {
        for qualifier in ["", "/account", "wallet", "wallet/"] {
            let err = QualifiedNameResolver
                .resolve(qualifier)
                .expect_err("reference should be rejected");
            assert_eq!(err.kind(), ErrorKind::InvalidReference, "qualifier {:?}", qualifier);
        }
    }

    #[test]
    fn test_wallet_name_without_account() {
        assert_eq!(QualifiedNameResolver::wallet_name("wallet").expect("valid"), "wallet");
        assert_eq!(QualifiedNameResolver::wallet_name("wallet/a").expect("valid"), "wallet");
        assert!(QualifiedNameResolver::wallet_name("/a").is_err());
    }
}
