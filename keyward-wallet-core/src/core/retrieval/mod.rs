//! Account private key retrieval
//!
//! Resolves an account inside an opened wallet, satisfies its unlock
//! requirements from the supplied secrets, exports the raw key and, when the
//! unlock was performed here, locks the account again.
//!
//! Every blocking call gets its own timeout window. Steps run strictly in
//! order: wallet unlock (derived HD accounts only), account lookup, account
//! unlock, export, relock.

pub mod deadline;
pub mod guard;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::core::secrets::SecretSource;
use crate::domain::capabilities::{
    Account, AccountLocker, AccountView, PrivateKeyProvider, Wallet, WalletView,
};
use crate::domain::reference::{NameResolver, QualifiedNameResolver};
use crate::shared::constants::{DEFAULT_OPERATION_TIMEOUT_SECS, HD_WALLET_TYPE};
use crate::shared::error::{ErrorKind, WalletError, WalletResult};
use crate::shared::types::{AccountReference, SecretBytes};

pub use deadline::bounded;
pub use guard::RelockGuard;

/// Result of one retrieval: a primary outcome plus an optional relock failure
#[must_use]
pub struct KeyRetrieval {
    pub outcome: WalletResult<SecretBytes>,
    pub relock_error: Option<WalletError>,
}

impl KeyRetrieval {
    fn failed(error: WalletError) -> Self {
        Self { outcome: Err(error), relock_error: None }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn into_parts(self) -> (WalletResult<SecretBytes>, Option<WalletError>) {
        (self.outcome, self.relock_error)
    }

    /// Primary outcome only; the relock advisory has already been logged
    pub fn into_result(self) -> WalletResult<SecretBytes> {
        self.outcome
    }
}

impl fmt::Debug for KeyRetrieval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match &self.outcome {
            Ok(key) => format!("Ok(<{} key bytes>)", key.len()),
            Err(e) => format!("Err({:?})", e),
        };
        f.debug_struct("KeyRetrieval")
            .field("outcome", &outcome)
            .field("relock_error", &self.relock_error)
            .finish()
    }
}

/// Runs the unlock-and-extract protocol against opened wallets
pub struct KeyRetriever<R = QualifiedNameResolver> {
    resolver: R,
    timeout: Duration,
}

impl KeyRetriever<QualifiedNameResolver> {
    pub fn new(timeout: Duration) -> Self {
        Self::with_resolver(QualifiedNameResolver, timeout)
    }
}

impl Default for KeyRetriever<QualifiedNameResolver> {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_OPERATION_TIMEOUT_SECS))
    }
}

impl<R: NameResolver> KeyRetriever<R> {
    pub fn with_resolver(resolver: R, timeout: Duration) -> Self {
        Self { resolver, timeout }
    }

    /// Obtain the raw private key of `qualifier` (`wallet/account`) from `wallet`.
    pub async fn retrieve_private_key(
        &self,
        wallet: &dyn Wallet,
        qualifier: &str,
        secrets: &dyn SecretSource,
    ) -> KeyRetrieval {
        let account = match self.materialize_account(wallet, qualifier, secrets).await {
            Ok(account) => account,
            Err(e) => {
                log::debug!("Key retrieval for {:?} stopped before unlock: {}", qualifier, e);
                return KeyRetrieval::failed(e);
            }
        };
        self.unlock_and_export(account.as_ref(), secrets).await
    }

    async fn materialize_account(
        &self,
        wallet: &dyn Wallet,
        qualifier: &str,
        secrets: &dyn SecretSource,
    ) -> WalletResult<Arc<dyn Account>> {
        let reference = self.resolver.resolve(qualifier)?;
        let view = WalletView::of(wallet);
        log::debug!(
            "Opened wallet {:?} of type {} ({})",
            wallet.name(),
            wallet.wallet_type(),
            view.capabilities()
        );
        if reference.wallet_name != wallet.name() {
            log::debug!(
                "Reference names wallet {:?} but handle is {:?}; using the handle",
                reference.wallet_name,
                wallet.name()
            );
        }

        if wallet.wallet_type() == HD_WALLET_TYPE && reference.is_derivation_path() {
            self.unlock_wallet(&view, &reference, secrets).await?;
        }

        let provider = view.accounts.ok_or_else(|| {
            WalletError::unsupported(format!(
                "wallet {:?} cannot obtain accounts by name",
                wallet.name()
            ))
        })?;

        bounded(
            "account lookup",
            self.timeout,
            provider.account_by_name(&reference.account_name),
        )
        .await
    }

    /// Unlock needed before a derived account can be materialized. The wallet
    /// stays unlocked afterwards.
    async fn unlock_wallet(
        &self,
        view: &WalletView<'_>,
        reference: &AccountReference,
        secrets: &dyn SecretSource,
    ) -> WalletResult<()> {
        let secret = secrets
            .wallet_secret()
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| {
                WalletError::missing_credential(format!(
                    "a wallet passphrase is required for dynamically derived account {:?}",
                    reference.account_name
                ))
            })?;

        let locker = view.locker.ok_or_else(|| {
            WalletError::unsupported(format!(
                "wallet {:?} cannot be unlocked to derive {:?}",
                view.wallet.name(),
                reference.account_name
            ))
        })?;

        bounded("wallet unlock", self.timeout, locker.unlock(&secret))
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::Timeout => e,
                _ => WalletError::unlock_failed(format!(
                    "failed to unlock wallet {:?}: {}",
                    view.wallet.name(),
                    e.detail()
                )),
            })?;

        log::info!("Unlocked wallet {:?} to derive {:?}", view.wallet.name(), reference.account_name);
        Ok(())
    }

    async fn unlock_and_export(&self, account: &dyn Account, secrets: &dyn SecretSource) -> KeyRetrieval {
        let view = AccountView::of(account);
        log::debug!("Obtained account {:?} ({})", account.name(), view.capabilities());

        let exporter = match view.exporter {
            Some(exporter) => exporter,
            None => {
                return KeyRetrieval::failed(WalletError::unsupported(format!(
                    "account {:?} does not provide its private key",
                    account.name()
                )))
            }
        };

        let guard = match view.locker {
            Some(locker) => match self.unlock_account(account.name(), locker, secrets).await {
                Ok(guard) => guard,
                Err(e) => return KeyRetrieval::failed(e),
            },
            None => None,
        };

        let export = self.export(exporter);
        match guard {
            Some(guard) => {
                let (outcome, relock_error) = guard.run(export).await;
                KeyRetrieval { outcome, relock_error }
            }
            None => KeyRetrieval { outcome: export.await, relock_error: None },
        }
    }

    /// Returns a guard only when this call moved the account from locked to
    /// unlocked.
    async fn unlock_account<'a>(
        &self,
        account_name: &str,
        locker: &'a dyn AccountLocker,
        secrets: &dyn SecretSource,
    ) -> WalletResult<Option<RelockGuard<'a>>> {
        let unlocked = bounded("account lock state query", self.timeout, locker.is_unlocked())
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::Timeout => e,
                _ => WalletError::unlock_failed(format!(
                    "failed to find out if account {:?} is locked: {}",
                    account_name,
                    e.detail()
                )),
            })?;
        if unlocked {
            log::debug!("Account {:?} already unlocked; lock state left as found", account_name);
            return Ok(None);
        }

        let candidates = secrets.account_candidates();
        for (index, candidate) in candidates.iter().enumerate() {
            match bounded("account unlock", self.timeout, locker.unlock(candidate)).await {
                Ok(()) => {
                    log::debug!(
                        "Unlocked account {:?} with passphrase {} of {}",
                        account_name,
                        index + 1,
                        candidates.len()
                    );
                    return Ok(Some(RelockGuard::acquired(locker, account_name, self.timeout)));
                }
                Err(e) if e.kind() == ErrorKind::Timeout => return Err(e),
                Err(e) => {
                    log::debug!("Passphrase {} rejected for account {:?}: {}", index + 1, account_name, e);
                }
            }
        }

        Err(WalletError::unlock_failed(format!(
            "none of the {} supplied passphrases unlocked account {:?}",
            candidates.len(),
            account_name
        )))
    }

    async fn export(&self, exporter: &dyn PrivateKeyProvider) -> WalletResult<SecretBytes> {
        let key = bounded("private key export", self.timeout, exporter.private_key())
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::Timeout | ErrorKind::ExportFailed => e,
                _ => WalletError::export_failed(e.detail().to_string()),
            })?;

        let bytes = key.marshal();
        if bytes.is_empty() {
            return Err(WalletError::export_failed("account returned empty key material"));
        }
        Ok(bytes)
    }
}
