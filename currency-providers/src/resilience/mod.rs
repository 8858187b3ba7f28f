//! Fault tolerance for upstream calls.
//!
//! A [`Resilience`] instance belongs to exactly one provider. The circuit
//! breaker wraps the whole retry sequence, so one exhausted sequence counts
//! as one failed call.

pub mod circuit_breaker;
pub mod retry;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use currency_types::ProviderError;

pub use circuit_breaker::{CallPermit, CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use retry::RetryPolicy;

pub struct Resilience {
    provider: String,
    breaker: CircuitBreaker,
    retry: RetryPolicy,
    retries: AtomicU64,
}

impl Resilience {
    pub fn new(provider: impl Into<String>, retry: RetryPolicy, circuit: CircuitBreakerConfig) -> Self {
        let provider = provider.into();
        Self {
            breaker: CircuitBreaker::new(provider.clone(), circuit),
            provider,
            retry,
            retries: AtomicU64::new(0),
        }
    }

    /// Runs `op` behind the breaker and the retry policy.
    ///
    /// Only transient failures that survive every retry count against the
    /// breaker. Any other outcome means the upstream answered and counts as
    /// a healthy call.
    pub async fn execute<T, F, Fut>(&self, op: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let permit = self.breaker.try_acquire()?;

        let result = self
            .retry
            .run(&self.provider, op, |_, _| {
                self.retries.fetch_add(1, Ordering::Relaxed);
            })
            .await;

        match &result {
            Err(err) if err.is_transient() => permit.failure(),
            _ => permit.success(),
        }

        result
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }

    pub fn failure_count(&self) -> u32 {
        self.breaker.failure_count()
    }

    /// Retries performed since construction, across all calls.
    pub fn retry_count(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }
}
