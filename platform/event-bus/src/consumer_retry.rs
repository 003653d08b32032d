//! Consumer retry logic with fixed backoff
//!
//! Provides retry functionality for event consumers to handle transient failures
//! before events are sent to the Dead Letter Queue (DLQ).
//!
//! Backoff waits use `tokio::time::sleep`, so a retrying message suspends only
//! its own task.

use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, the first one included
    pub max_attempts: u32,
    /// Delay before every retry
    pub backoff: Duration,
}

impl Default for RetryConfig {
    /// Three attempts, two seconds apart
    fn default() -> Self {
        Self::fixed(3, Duration::from_secs(2))
    }
}

impl RetryConfig {
    pub fn fixed(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }
}

/// Returned when an operation did not succeed within its attempt budget
#[derive(Debug, Clone, PartialEq)]
pub struct RetryExhausted<E> {
    /// Attempts actually made
    pub attempts: u32,
    /// Error from the last attempt
    pub last_error: E,
    /// True when the loop stopped early on a non-retryable error
    pub gave_up: bool,
}

/// Retry a fallible async operation, retrying every error
///
/// The operation receives the 1-based attempt number.
///
/// # Example
/// ```rust
/// use event_bus::consumer_retry::{retry_with_backoff, RetryConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = RetryConfig::default();
/// let result = retry_with_backoff(
///     |_attempt| async { Ok::<_, String>(42) },
///     &config,
///     "example_operation",
/// )
/// .await;
/// assert_eq!(result.ok(), Some(42));
/// # Ok(())
/// # }
/// ```
pub async fn retry_with_backoff<F, Fut, T, E>(
    operation: F,
    config: &RetryConfig,
    context: &str,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    retry_if(operation, config, context, |_| true).await
}

/// Retry a fallible async operation while `is_retryable` accepts its error
///
/// A rejected error ends the loop immediately with `gave_up = true`.
pub async fn retry_if<F, Fut, T, E, P>(
    mut operation: F,
    config: &RetryConfig,
    context: &str,
    is_retryable: P,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation(attempt).await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(
                        context = %context,
                        attempt = attempt,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(e) if !is_retryable(&e) => {
                warn!(
                    context = %context,
                    attempt = attempt,
                    error = %e,
                    "Operation failed with non-retryable error"
                );
                return Err(RetryExhausted {
                    attempts: attempt,
                    last_error: e,
                    gave_up: true,
                });
            }
            Err(e) => {
                if attempt >= max_attempts {
                    warn!(
                        context = %context,
                        attempts = attempt,
                        error = %e,
                        "Operation failed after max retries"
                    );
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last_error: e,
                        gave_up: false,
                    });
                }

                let backoff = config.backoff;
                warn!(
                    context = %context,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %e,
                    "Operation failed, retrying with backoff"
                );

                sleep(backoff).await;
            }
        }
    }
}
