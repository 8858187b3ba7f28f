//! Construction settings for HTTP-backed providers.

use std::time::Duration;

use crate::resilience::{CircuitBreakerConfig, RetryPolicy};

/// Settings for one upstream provider instance.
#[derive(Clone, Debug)]
pub struct ProviderSettings {
    /// Registry name, matched case-insensitively.
    pub name: String,
    /// Upstream root, without a trailing slash.
    pub base_url: String,
    pub cache_ttl: Duration,
    /// Prefix of every cache key this provider writes. Providers sharing a
    /// cache backend need distinct prefixes.
    pub cache_key_prefix: String,
    /// Timeout of a single HTTP attempt.
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    pub circuit: CircuitBreakerConfig,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            name: "FrankfurterAPI".to_string(),
            base_url: "https://api.frankfurter.app".to_string(),
            cache_ttl: Duration::from_secs(600),
            cache_key_prefix: "ExchangeRates_".to_string(),
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            circuit: CircuitBreakerConfig::default(),
        }
    }
}
