//! # Currency Hex
//!
//! Application layer of the currency conversion service.
//!
//! ## Architecture
//!
//! - `registry` - Name to provider lookup, case-insensitive
//! - `service` - Application service (latest rates, conversion, paginated history)
//!
//! Providers are injected as `Arc<dyn RateProvider>`, so HTTP-backed,
//! offline and test providers can be registered side by side.

pub mod registry;
pub mod service;

#[cfg(test)]
mod service_tests;

pub use registry::ProviderRegistry;
pub use service::{CurrencyService, ServiceConfig};
