//! Bounded retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

use currency_types::ProviderError;
use tracing::warn;

/// Retry configuration for one logical upstream call.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Attempts in total, the first call included. Values below 1 act as 1.
    pub max_attempts: u32,
    /// Base of the backoff; the wait after attempt `n` is `base * 2^n`.
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_base: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Wait between attempt `attempt` (1-based) and the next one.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_base
            .checked_mul(2u32.saturating_pow(attempt))
            .unwrap_or(Duration::MAX)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Runs `op` until it succeeds, fails with a non-transient error, or the
    /// attempts are used up. `on_retry` sees every retry before its backoff.
    pub async fn run<T, F, Fut, R>(
        &self,
        provider: &str,
        mut op: F,
        mut on_retry: R,
    ) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
        R: FnMut(u32, &ProviderError),
    {
        let attempts = self.attempts();
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        provider,
                        attempt,
                        reason = %err,
                        delay_ms = delay.as_millis() as u64,
                        "Retry attempt {} due to: {}",
                        attempt,
                        err
                    );
                    on_retry(attempt, &err);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
