//! Deadline constants and the async deadline wrapper.

use std::future::Future;
use std::time::Duration;

use crate::error::{ProtocolError, Result};

/// How long a flushed batch may sit without any reply activity before the
/// verifier connection is forcibly aborted.
pub const WATCHDOG_TIMEOUT: Duration = Duration::from_secs(60);

/// Bound on one TCP connect attempt to the verifier.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Run a fallible future under a deadline, substituting `on_expiry` for
/// its result if the deadline passes first.
pub async fn with_deadline<T, F>(limit: Duration, on_expiry: ProtocolError, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(on_expiry),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_expiry_substitutes_the_given_error() {
        let result: Result<()> = with_deadline(
            Duration::from_secs(1),
            ProtocolError::WatchdogTimeout,
            std::future::pending(),
        )
        .await;
        assert!(matches!(result, Err(ProtocolError::WatchdogTimeout)));
    }

    #[tokio::test]
    async fn test_completion_wins_over_the_deadline() {
        let result = with_deadline(Duration::from_secs(1), ProtocolError::WatchdogTimeout, async {
            Ok(7)
        })
        .await;
        assert_eq!(result.unwrap(), 7);
    }
}
