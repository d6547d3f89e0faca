//! Scoped relock of an account unlocked for key export

use std::future::Future;
use std::time::Duration;

use crate::domain::capabilities::AccountLocker;
use crate::shared::error::WalletError;
use super::deadline::bounded;

/// Proof that this operation unlocked an account.
///
/// Only created after a successful unlock performed by the retriever, so an
/// account that was already unlocked never gets one and is never relocked.
pub struct RelockGuard<'a> {
    locker: Option<&'a dyn AccountLocker>,
    account_name: String,
    timeout: Duration,
}

impl<'a> RelockGuard<'a> {
    pub(crate) fn acquired(locker: &'a dyn AccountLocker, account_name: &str, timeout: Duration) -> Self {
        Self {
            locker: Some(locker),
            account_name: account_name.to_string(),
            timeout,
        }
    }

    /// Await `body`, then relock whatever its outcome.
    ///
    /// The relock failure, if any, is returned next to the body's output and
    /// never replaces it.
    pub async fn run<T, F>(mut self, body: F) -> (T, Option<WalletError>)
    where
        F: Future<Output = T>,
    {
        let output = body.await;
        let relock_error = self.release().await;
        (output, relock_error)
    }

    async fn release(&mut self) -> Option<WalletError> {
        let locker = self.locker.take()?;
        match bounded("account relock", self.timeout, locker.lock()).await {
            Ok(()) => {
                log::debug!("Relocked account {:?}", self.account_name);
                None
            }
            Err(e) => {
                log::warn!("Failed to relock account {:?}: {}", self.account_name, e);
                Some(WalletError::relock_failed(format!(
                    "account {:?}: {}",
                    self.account_name, e
                )))
            }
        }
    }
}

impl Drop for RelockGuard<'_> {
    fn drop(&mut self) {
        // Only reachable when the surrounding future was cancelled mid-export
        if self.locker.is_some() {
            log::warn!(
                "Key export for account {:?} was abandoned; the account may remain unlocked",
                self.account_name
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::{ErrorKind, WalletResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLocker {
        locks: AtomicUsize,
        fail_lock: bool,
    }

    impl CountingLocker {
        fn new(fail_lock: bool) -> Self {
            Self { locks: AtomicUsize::new(0), fail_lock }
        }
    }

    #[async_trait]
    impl AccountLocker for CountingLocker {
        async fn unlock(&self, _passphrase: &[u8]) -> WalletResult<()> {
            Ok(())
        }

        async fn lock(&self) -> WalletResult<()> {
            self.locks.fetch_add(1, Ordering::SeqCst);
            if self.fail_lock {
                Err(WalletError::storage("lock state not writable"))
            } else {
                Ok(())
            }
        }

        async fn is_unlocked(&self) -> WalletResult<bool> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_relocks_after_success() {
        let locker = CountingLocker::new(false);
        let guard = RelockGuard::acquired(&locker, "Operations", Duration::from_secs(1));
        let (output, relock_error) = guard.run(async { 42 }).await;
        assert_eq!(output, 42);
        assert!(relock_error.is_none());
        assert_eq!(locker.locks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_relocks_after_failure() {
        let locker = CountingLocker::new(false);
        let guard = RelockGuard::acquired(&locker, "Operations", Duration::from_secs(1));
        let (output, _) = guard
            .run(async { Err::<(), _>(WalletError::export_failed("no key")) })
            .await;
        assert!(output.is_err());
        assert_eq!(locker.locks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_relock_failure_is_advisory() {
        let locker = CountingLocker::new(true);
        let guard = RelockGuard::acquired(&locker, "Operations", Duration::from_secs(1));
        let (output, relock_error) = guard.run(async { "key" }).await;
        assert_eq!(output, "key");
        let relock_error = relock_error.expect("relock failure reported");
        assert_eq!(relock_error.kind(), ErrorKind::RelockFailed);
    }

    #[test]
    fn test_dropped_guard_does_not_relock() {
        let locker = CountingLocker::new(false);
        let guard = RelockGuard::acquired(&locker, "Operations", Duration::from_secs(1));
        drop(guard);
        assert_eq!(locker.locks.load(Ordering::SeqCst), 0);
    }
}
