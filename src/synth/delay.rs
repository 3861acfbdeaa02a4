//! Artificial latency before a synthesized reply resolves.

use async_trait::async_trait;
use std::time::Duration;

/// Default latency of a mock reply
pub const DEFAULT_RESPONSE_DELAY: Duration = Duration::from_millis(1500);

/// Suspends the caller for a while before the reply is returned
#[async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// Timer-backed delay on the tokio runtime
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Resolves immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Delay for NoDelay {
    async fn wait(&self, _duration: Duration) {}
}
