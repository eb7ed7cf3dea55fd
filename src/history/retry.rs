use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::config::RetryConfig;
use crate::core::error::{HistoryError, UpstreamError};
use crate::history::cancel::Cancellation;

/// Bounded exponential backoff: `max_attempts` calls in total, waiting
/// `initial_delay * multiplier^n` before retry `n`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub multiplier: u32,
    pub max_delay: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            multiplier: config.multiplier.max(1),
            max_delay: config.max_delay_ms.map(Duration::from_millis),
        }
    }
}

impl RetryPolicy {
    /// Wait before retry number `retry` (0-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.multiplier.checked_pow(retry).unwrap_or(u32::MAX);
        let delay = self.initial_delay.saturating_mul(factor);
        match self.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        }
    }

    /// Every wait the policy can produce, in order.
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_attempts.saturating_sub(1))
            .map(|retry| self.delay_for(retry))
            .collect()
    }

    /// Calls `operation` until it succeeds or the attempt budget is spent.
    /// The last upstream error is carried by `ExhaustedRetries`.
    pub async fn run<T, F, Fut>(
        &self,
        label: &str,
        cancel: &Cancellation,
        mut operation: F,
    ) -> Result<T, HistoryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, UpstreamError>>,
    {
        let mut attempt = 1u32;
        loop {
            let outcome = cancel
                .run(operation())
                .await
                .map_err(|_| HistoryError::Cancelled)?;

            match outcome {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(label, attempt, "succeeded after retrying");
                    }
                    return Ok(value);
                }
                Err(err) if attempt >= self.max_attempts => {
                    error!(label, attempts = attempt, error = %err, "retries exhausted");
                    return Err(HistoryError::ExhaustedRetries {
                        signature: label.to_string(),
                        attempts: attempt,
                        last: err,
                    });
                }
                Err(err) => {
                    let delay = self.delay_for(attempt - 1);
                    warn!(
                        label,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "fetch failed, retrying"
                    );
                    cancel
                        .sleep(delay)
                        .await
                        .map_err(|_| HistoryError::Cancelled)?;
                    attempt += 1;
                }
            }
        }
    }
}
