//! Retry logic with backoff for page requests
//!
//! Page fetches go through [`with_backoff`], which re-runs the request until
//! it succeeds, the error is permanent, or the attempt budget from
//! [`RetryConfig`] is spent. Transport-level failures are classified by the
//! [`IsRetryable`] trait; non-success statuses are checked against the
//! policy's status set.

use crate::config::RetryConfig;
use crate::error::{Error, Result};
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Classification of errors into transient and permanent
///
/// Transient failures (timeouts, refused or reset connections, broken TLS
/// handshakes) are worth another attempt; everything else is not.
pub trait IsRetryable {
    /// Returns true if the failure is transient and the request may succeed
    /// when repeated
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            Error::Network(e) => e.is_timeout() || e.is_connect(),
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::Interrupted
            ),
            // Status-based retry is a policy decision, handled by
            // RetryConfig::should_retry so the status set stays configurable.
            Error::HttpStatus { .. } => false,
            _ => false,
        }
    }
}

impl RetryConfig {
    /// Whether `error` warrants another attempt under this policy
    pub fn should_retry(&self, error: &Error) -> bool {
        match error {
            Error::HttpStatus { status, .. } => self.retry_statuses.contains(status),
            other => other.is_retryable(),
        }
    }
}

/// Run `operation` until it succeeds or the policy gives up
///
/// The first run counts as attempt one; `config.max_attempts` is the total
/// number of runs, so a page that never succeeds is attempted exactly that
/// many times. Delays between attempts grow by `backoff_multiplier` up to
/// `max_delay`, with optional jitter. Returns the last error once the budget
/// is spent or immediately for a permanent error.
pub async fn with_backoff<F, Fut, T>(config: &RetryConfig, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 1;
    let mut delay = config.initial_delay;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!(attempt, "request succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) if attempt < config.max_attempts && config.should_retry(&error) => {
                tracing::warn!(
                    error = %error,
                    attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis(),
                    "request failed, retrying"
                );

                let wait = if config.jitter { jittered(delay) } else { delay };
                tokio::time::sleep(wait).await;

                delay = Duration::from_secs_f64(
                    (delay.as_secs_f64() * config.backoff_multiplier)
                        .min(config.max_delay.as_secs_f64()),
                );
                attempt += 1;
            }
            Err(error) => {
                tracing::error!(error = %error, attempt, "request failed permanently");
                return Err(error);
            }
        }
    }
}

/// Stretch a delay by a uniformly random factor in [1.0, 2.0]
fn jittered(delay: Duration) -> Duration {
    let factor: f64 = rand::thread_rng().gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + factor))
}
