//! Runtime - attempt cancellation.

use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Cancellation handle for an in-flight send attempt. Clone it into the UI
/// side; the coordinator observes it at every suspension point.
#[derive(Clone)]
pub struct CancelToken {
    sender: broadcast::Sender<()>,
    triggered: Arc<RwLock<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender, triggered: Arc::new(RwLock::new(false)) }
    }

    /// Cancel the attempt. Idempotent.
    pub async fn cancel(&self) {
        let mut triggered = self.triggered.write().await;
        if !*triggered {
            *triggered = true;
            let _ = self.sender.send(());
        }
    }

    pub async fn is_cancelled(&self) -> bool {
        *self.triggered.read().await
    }

    /// Resolves once the token is cancelled. Cancel-safe; subscribes before
    /// checking the flag so a concurrent `cancel` is never missed.
    pub async fn cancelled(&self) {
        let mut rx = self.sender.subscribe();
        if *self.triggered.read().await {
            return;
        }
        let _ = rx.recv().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancelled_resolves_after_cancel() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled().await);

        let waiter = {
            let token = token.clone();
            tokio::spawn(async move { token.cancelled().await })
        };
        token.cancel().await;
        waiter.await.unwrap();
        assert!(token.is_cancelled().await);
    }

    #[tokio::test]
    async fn cancelled_returns_immediately_when_already_cancelled() {
        let token = CancelToken::new();
        token.cancel().await;
        token.cancel().await; // idempotent
        token.cancelled().await;
    }
}
