//! Configuration loading from environment.

use std::collections::BTreeSet;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use currency_hex::ServiceConfig;
use currency_providers::{CircuitBreakerConfig, ProviderSettings, RetryPolicy};
use currency_types::CurrencyCode;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub frankfurter_base_url: String,
    pub frankfurter_provider_name: String,
    /// `redis://...` selects the shared cache; unset selects process memory.
    pub cache_url: Option<String>,
    pub cache_ttl_secs: u64,
    pub cache_key_prefix: String,
    pub retry_max_attempts: u32,
    pub retry_backoff_base_ms: u64,
    pub circuit_failure_threshold: u32,
    pub circuit_cooldown_secs: u64,
    pub http_timeout_secs: u64,
    pub excluded_currencies: BTreeSet<CurrencyCode>,
    pub default_provider: String,
    pub enable_fixed_provider: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, falling back to defaults for
    /// unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let excluded_currencies = parse_currency_list(&string("EXCLUDED_CURRENCIES", "TRY,PLN,THB,MXN"))
            .context("Invalid EXCLUDED_CURRENCIES")?;

        Ok(Self {
            frankfurter_base_url: string("FRANKFURTER_BASE_URL", "https://api.frankfurter.app"),
            frankfurter_provider_name: string("FRANKFURTER_PROVIDER_NAME", "FrankfurterAPI"),
            cache_url: lookup("CACHE_URL").filter(|url| !url.trim().is_empty()),
            cache_ttl_secs: parsed(&lookup, "CACHE_TTL_SECS", 600)?,
            cache_key_prefix: string("CACHE_KEY_PREFIX", "ExchangeRates_"),
            retry_max_attempts: parsed(&lookup, "RETRY_MAX_ATTEMPTS", 5)?,
            retry_backoff_base_ms: parsed(&lookup, "RETRY_BACKOFF_BASE_MS", 1000)?,
            circuit_failure_threshold: parsed(&lookup, "CIRCUIT_FAILURE_THRESHOLD", 3)?,
            circuit_cooldown_secs: parsed(&lookup, "CIRCUIT_COOLDOWN_SECS", 30)?,
            http_timeout_secs: parsed(&lookup, "HTTP_TIMEOUT_SECS", 30)?,
            excluded_currencies,
            default_provider: string("DEFAULT_PROVIDER", "FrankfurterAPI"),
            enable_fixed_provider: parsed(&lookup, "ENABLE_FIXED_PROVIDER", false)?,
        })
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            name: self.frankfurter_provider_name.clone(),
            base_url: self.frankfurter_base_url.clone(),
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            cache_key_prefix: self.cache_key_prefix.clone(),
            request_timeout: Duration::from_secs(self.http_timeout_secs),
            retry: RetryPolicy {
                max_attempts: self.retry_max_attempts,
                backoff_base: Duration::from_millis(self.retry_backoff_base_ms),
            },
            circuit: CircuitBreakerConfig {
                failure_threshold: self.circuit_failure_threshold,
                cooldown: Duration::from_secs(self.circuit_cooldown_secs),
            },
        }
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            excluded_currencies: self.excluded_currencies.clone(),
        }
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

fn parse_currency_list(raw: &str) -> anyhow::Result<BTreeSet<CurrencyCode>> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(|code| CurrencyCode::new(&code.to_uppercase()).map_err(anyhow::Error::from))
        .collect()
}
