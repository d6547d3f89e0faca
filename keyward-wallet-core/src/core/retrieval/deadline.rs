use std::future::Future;
use std::time::Duration;

use crate::shared::error::{WalletError, WalletResult};

/// Run `future` with its own `limit`; expiry becomes `WalletError::Timeout`.
pub async fn bounded<T, F>(operation: &str, limit: Duration, future: F) -> WalletResult<T>
where
    F: Future<Output = WalletResult<T>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(WalletError::timeout(format!(
            "{} did not complete within {:?}",
            operation, limit
        ))),
    }
}
