//! Cancellation of in-flight assistant calls.
//!
//! A screen that navigates away cancels its token; the pending call is
//! dropped at its next suspension point (its timer is freed with it) and
//! [`run_cancellable`] returns [`AssistantError::Cancelled`] instead of the
//! call's result.
//!
//! Streams need no token: dropping a `TextStream` stops production.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use blissful_core::{AssistantError, Result};
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cloneable cancellation flag shared between a caller and its calls.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel every call using this token. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Drive `fut` to completion unless `token` is cancelled first.
pub async fn run_cancellable<T, F>(token: &CancelToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if token.is_cancelled() {
        return Err(AssistantError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(AssistantError::Cancelled),
        result = fut => result,
    }
}
