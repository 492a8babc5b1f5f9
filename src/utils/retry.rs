//! Retry with exponential backoff for gateway requests
//!
//! Only errors that report [`FetchError::is_recoverable`] are retried. The
//! default policy performs no retries at all; callers opt in through
//! `http.max_retries`.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::FetchError;

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first try
    pub max_retries: u32,

    /// Base delay in milliseconds for exponential backoff
    pub base_delay_ms: u64,

    /// Maximum delay in milliseconds (caps exponential growth)
    pub max_delay_ms: u64,

    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with custom max retries
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Create a retry configuration with custom delays
    pub fn with_delays(max_retries: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
            max_delay_ms,
            backoff_multiplier: 2.0,
        }
    }

    /// Calculate delay for a given attempt using exponential backoff
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let delay_ms = if attempt == 0 {
            0
        } else {
            let exponential =
                self.base_delay_ms as f64 * self.backoff_multiplier.powi((attempt - 1) as i32);
            (exponential as u64).min(self.max_delay_ms)
        };

        Duration::from_millis(delay_ms)
    }
}

/// Run `operation`, retrying recoverable failures with exponential backoff
///
/// Non-recoverable errors are returned immediately. When every attempt fails
/// with a recoverable error and at least one retry was made, the result is
/// [`FetchError::MaxRetriesExceeded`].
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, operation: F) -> Result<T, FetchError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut last_error = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let delay = config.calculate_delay(attempt);
            debug!(
                attempt = attempt,
                delay_ms = delay.as_millis(),
                "Retrying request after delay"
            );
            tokio::time::sleep(delay).await;
        }

        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(attempt = attempt, "Request succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if !e.is_recoverable() => return Err(e),
            Err(e) => {
                if config.max_retries > 0 {
                    warn!(
                        attempt = attempt,
                        max_retries = config.max_retries,
                        error = %e,
                        "Request failed, will retry"
                    );
                }
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if config.max_retries == 0 => Err(e),
        _ => Err(FetchError::MaxRetriesExceeded),
    }
}
