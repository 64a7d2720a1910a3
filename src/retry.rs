//! Timeout and retry policy for backend calls.
//!
//! Every attempt runs under `tokio::time::timeout`. Retryable failures
//! ([`AssistantError::is_retryable`]: rate limits and timeouts) are retried
//! with exponential backoff; anything else is returned immediately.
//!
//! # Backoff
//!
//! `backoff_base × 2^(attempt-1)`, exponent capped at 5. A rate-limit error
//! carrying `retry_after` waits at least that long.

use std::future::Future;
use std::time::Duration;

use blissful_core::{AssistantError, Result};

use crate::config::BackendConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &BackendConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_base: config.backoff_base(),
            timeout: config.timeout(),
        }
    }

    /// Wait before attempt number `attempt` (1-based retry count).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base * (1u32 << (attempt.saturating_sub(1)).min(5))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&BackendConfig::default())
    }
}

/// Run `op` under `policy`, retrying transient failures.
///
/// `op` is called once per attempt and must build a fresh future each time.
pub async fn call_with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_err: Option<AssistantError> = None;

    for attempt in 0..=policy.max_retries {
        if attempt > 0 {
            let mut delay = policy.backoff(attempt);
            if let Some(AssistantError::RateLimited {
                retry_after: Some(after),
            }) = &last_err
            {
                delay = delay.max(*after);
            }
            tokio::time::sleep(delay).await;
        }

        let outcome = match tokio::time::timeout(policy.timeout, op()).await {
            Ok(result) => result,
            Err(_) => Err(AssistantError::Timeout(policy.timeout)),
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() => {
                tracing::warn!(attempt, error = %e, "backend call failed, will retry");
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_err.unwrap_or(AssistantError::Timeout(policy.timeout)))
}
