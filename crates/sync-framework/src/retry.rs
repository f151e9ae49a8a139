//! # Retry/Backoff Executor
//!
//! Wraps one logical fetch with bounded retries. Each attempt runs under its own
//! timeout; a failed attempt `n` (1-based) is followed by a pause of
//! `min(base_delay * 2^(n-1), max_delay)`. After `max_retries` attempts the last error
//! is returned. Cancellation is observed during attempts and during pauses.
//!
//! By default every non-fatal failure is retried the same way, including client
//! errors and `success: false` envelopes. [`RetryOn::Transient`] narrows that to
//! network-class failures. A missing or expired session is never retried.

use crate::config::{RetryOn, SyncConfig};
use crate::diagnostics::{NoopDiagnostics, SyncDiagnostics, SyncEvent};
use crate::error::SyncError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Retry limits and delays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub timeout: Duration,
    pub retry_on: RetryOn,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&SyncConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            timeout: Duration::from_millis(config.timeout_ms),
            retry_on: config.retry_on,
        }
    }

    /// Pause after failed attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    pub fn should_retry(&self, error: &SyncError) -> bool {
        if error.is_fatal() {
            return false;
        }
        match self.retry_on {
            RetryOn::Any => true,
            RetryOn::Transient => error.is_transient(),
        }
    }

    fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}

/// Runs calls under a [`RetryPolicy`].
#[derive(Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    diagnostics: Arc<dyn SyncDiagnostics>,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            diagnostics: Arc::new(NoopDiagnostics),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn SyncDiagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Attempts `call` until it succeeds, a fatal or non-retryable error occurs, the
    /// attempt budget runs out, or `token` is cancelled. `call` receives the 1-based
    /// attempt number.
    pub async fn execute<T, F, Fut>(&self, token: &CancellationToken, mut call: F) -> Result<T, SyncError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, SyncError>>,
    {
        let attempts = self.policy.attempts();
        let timeout_ms = self.policy.timeout.as_millis() as u64;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => return Err(SyncError::Cancelled),
                result = tokio::time::timeout(self.policy.timeout, call(attempt)) => {
                    result.unwrap_or(Err(SyncError::Timeout(timeout_ms)))
                }
            };

            let error = match outcome {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            if attempt >= attempts || !self.policy.should_retry(&error) {
                warn!(attempt, error = %error, "Giving up");
                return Err(error);
            }

            let delay = self.policy.delay_for(attempt);
            let delay_ms = delay.as_millis() as u64;
            warn!(attempt, delay_ms, error = %error, "Attempt failed, retrying");
            self.diagnostics
                .record(SyncEvent::RetryScheduled { attempt, delay_ms });

            tokio::select! {
                biased;
                _ = token.cancelled() => return Err(SyncError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::SyncCounters;
    use crate::transport::Envelope;
    use parking_lot::Mutex;
    use tokio::time::Instant;

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(5_000),
            timeout: Duration::from_millis(10_000),
            retry_on: RetryOn::Any,
        }
    }

    #[test]
    fn test_delay_schedule_is_capped() {
        let p = policy(10);
        let delays: Vec<u64> = (1..=6).map(|n| p.delay_for(n).as_millis() as u64).collect();
        assert_eq!(delays, vec![1_000, 2_000, 4_000, 5_000, 5_000, 5_000]);
        assert_eq!(p.delay_for(64), Duration::from_millis(5_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_call_uses_every_attempt() {
        let counters = Arc::new(SyncCounters::new());
        let executor = RetryExecutor::new(policy(5)).with_diagnostics(counters.clone());
        let starts = Arc::new(Mutex::new(Vec::new()));
        let token = CancellationToken::new();

        let recorded = starts.clone();
        let result: Result<(), SyncError> = executor
            .execute(&token, move |attempt| {
                recorded.lock().push(Instant::now());
                async move { Err(SyncError::Server(format!("failure {attempt}"))) }
            })
            .await;

        assert_eq!(result, Err(SyncError::Server("failure 5".into())));
        let starts = starts.lock();
        assert_eq!(starts.len(), 5);
        let gaps: Vec<u64> = starts
            .windows(2)
            .map(|w| (w[1] - w[0]).as_millis() as u64)
            .collect();
        assert_eq!(gaps, vec![1_000, 2_000, 4_000, 5_000]);
        assert_eq!(counters.retries(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_short_circuits() {
        let executor = RetryExecutor::new(policy(3));
        let calls = Arc::new(Mutex::new(0u32));
        let token = CancellationToken::new();

        let counted = calls.clone();
        let result = executor
            .execute(&token, move |attempt| {
                *counted.lock() += 1;
                async move {
                    if attempt == 1 {
                        Err(SyncError::Network("reset".into()))
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(2));
        assert_eq!(*calls.lock(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_attempt_times_out_and_retries() {
        let mut p = policy(2);
        p.timeout = Duration::from_millis(250);
        let executor = RetryExecutor::new(p);
        let token = CancellationToken::new();
        let start = Instant::now();

        let result: Result<(), SyncError> = executor
            .execute(&token, |_| std::future::pending())
            .await;

        assert_eq!(result, Err(SyncError::Timeout(250)));
        // two timeouts plus one backoff pause
        assert_eq!(start.elapsed(), Duration::from_millis(250 + 1_000 + 250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unauthenticated_is_not_retried() {
        let executor = RetryExecutor::new(policy(3));
        let calls = Arc::new(Mutex::new(0u32));
        let token = CancellationToken::new();

        let counted = calls.clone();
        let result: Result<(), SyncError> = executor
            .execute(&token, move |_| {
                *counted.lock() += 1;
                async { Err(SyncError::Unauthenticated) }
            })
            .await;

        assert_eq!(result, Err(SyncError::Unauthenticated));
        assert_eq!(*calls.lock(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_session_response_is_not_retried() {
        let executor = RetryExecutor::new(RetryPolicy::default());
        let calls = Arc::new(Mutex::new(0u32));
        let token = CancellationToken::new();
        let start = Instant::now();

        let counted = calls.clone();
        let result = executor
            .execute(&token, move |_| {
                *counted.lock() += 1;
                let body = serde_json::json!({ "success": false, "error": "jwt expired" });
                async move { Envelope::into_result(401, body.to_string().as_bytes()) }
            })
            .await;

        assert_eq!(result, Err(SyncError::Unauthenticated));
        assert_eq!(*calls.lock(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_only_policy_skips_client_errors() {
        let mut p = policy(3);
        p.retry_on = RetryOn::Transient;
        let executor = RetryExecutor::new(p);
        let calls = Arc::new(Mutex::new(0u32));
        let token = CancellationToken::new();

        let counted = calls.clone();
        let result: Result<(), SyncError> = executor
            .execute(&token, move |_| {
                *counted.lock() += 1;
                async {
                    Err(SyncError::Http {
                        status: 400,
                        message: "bad request".into(),
                    })
                }
            })
            .await;
        assert!(matches!(result, Err(SyncError::Http { status: 400, .. })));
        assert_eq!(*calls.lock(), 1);

        *calls.lock() = 0;
        let counted = calls.clone();
        let _: Result<(), SyncError> = executor
            .execute(&token, move |_| {
                *counted.lock() += 1;
                async {
                    Err(SyncError::Http {
                        status: 502,
                        message: "bad gateway".into(),
                    })
                }
            })
            .await;
        assert_eq!(*calls.lock(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff() {
        let executor = RetryExecutor::new(policy(3));
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            canceller.cancel();
        });

        let result: Result<(), SyncError> = executor
            .execute(&token, |_| async { Err(SyncError::Network("down".into())) })
            .await;
        assert_eq!(result, Err(SyncError::Cancelled));
    }
}
