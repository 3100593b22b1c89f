//! Per-invocation context handed to confirm and execute.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Cancellation and timeout for one invocation.
#[derive(Debug, Clone)]
pub struct Context {
    cancel: CancellationToken,
    timeout: Duration,
}

impl Context {
    /// Context with the given request timeout and a fresh token.
    pub fn new(timeout: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            timeout,
        }
    }

    /// Context driven by an existing token.
    pub fn with_token(cancel: CancellationToken, timeout: Duration) -> Self {
        Self { cancel, timeout }
    }

    /// Token cancelled on Ctrl-C.
    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once cancellation is requested.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }

    /// Budget for network calls.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}
