//! Error types for the currency conversion service.

/// Domain-level errors (invalid values and business rule violations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid currency code: {0:?} (expected three uppercase letters, e.g. USD)")]
    InvalidCurrencyCode(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Errors raised by a rate provider adapter.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The upstream answered but had no usable rates.
    #[error("{0}")]
    NotFound(String),

    /// The provider's circuit is open; the caller should retry later.
    #[error("Provider {provider} is temporarily unavailable")]
    Unavailable { provider: String },

    /// The upstream payload could not be parsed as the expected schema.
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    /// Non-2xx status (`status` set) or transport failure (`status` unset).
    #[error("Upstream error from {provider}: {message}")]
    Upstream {
        provider: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ProviderError {
    /// Whether this failure is presumed recoverable by retrying:
    /// request timeouts, 5xx statuses and connection failures.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Upstream { status: None, .. } => true,
            ProviderError::Upstream {
                status: Some(status),
                ..
            } => *status == 408 || (500..600).contains(status),
            _ => false,
        }
    }
}

/// Cache backend errors. Callers treat these as a miss.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Application-level errors returned across the service boundary.
///
/// Internal failures carry a user-safe message; the original cause is kept
/// as the error source for diagnostics and never shown verbatim.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl AppError {
    /// Wraps an unexpected failure behind a generic message.
    pub fn internal(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        AppError::Internal {
            message: message.into(),
            source: source.into(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::ValidationError(msg) => AppError::InvalidArgument(msg),
            e => AppError::InvalidArgument(e.to_string()),
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound(msg) => AppError::NotFound(msg),
            ProviderError::InvalidArgument(msg) => AppError::InvalidArgument(msg),
            ProviderError::Unavailable { provider } => AppError::Unavailable(format!(
                "{} is temporarily unavailable. Please try again later.",
                provider
            )),
            e @ (ProviderError::InvalidResponse { .. } | ProviderError::Upstream { .. }) => {
                AppError::internal(
                    "An error occurred while fetching exchange rates. Please try again later.",
                    e,
                )
            }
        }
    }
}
