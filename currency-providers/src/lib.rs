//! # Currency Providers
//!
//! Rate provider adapters implementing the `RateProvider` port:
//! - `frankfurter` - HTTP upstream with caching, retries and a circuit breaker
//! - `fixed` - offline reference table
//!
//! The `resilience` module holds the per-provider circuit breaker and retry
//! policy used by HTTP-backed providers.

pub mod fixed;
pub mod frankfurter;
pub mod resilience;
pub mod settings;

pub use fixed::{FIXED_PROVIDER_NAME, FixedRateProvider};
pub use frankfurter::FrankfurterProvider;
pub use resilience::{CircuitBreakerConfig, CircuitState, RetryPolicy};
pub use settings::ProviderSettings;
