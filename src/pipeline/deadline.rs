use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::Cancelled;

/// Run-scoped cancellation signal.
///
/// Fires when the timeout elapses or when the wrapped token is cancelled,
/// whichever comes first. Cloning shares the same signal. Time is read from
/// the tokio clock, so a paused runtime drives it in tests.
#[derive(Debug, Clone)]
pub struct Deadline {
    expires_at: Instant,
    token: CancellationToken,
}

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self::with_token(timeout, CancellationToken::new())
    }

    /// Deadline that also fires when `token` is cancelled by the caller.
    pub fn with_token(timeout: Duration, token: CancellationToken) -> Self {
        Self {
            expires_at: Instant::now() + timeout,
            token,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.token.is_cancelled() || Instant::now() >= self.expires_at
    }

    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_expired() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// Sleep for `duration` unless the deadline fires first.
    pub async fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        self.run(tokio::time::sleep(duration)).await
    }

    /// Drive `fut` to completion, abandoning it if the deadline fires first.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Cancelled> {
        self.check()?;
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Cancelled),
            _ = tokio::time::sleep_until(self.expires_at) => Err(Cancelled),
            out = fut => Ok(out),
        }
    }
}
