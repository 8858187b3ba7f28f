//! # Currency Types
//!
//! Domain types and port traits for the currency conversion service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (CurrencyCode, RateSnapshot, HistoricalSeries)
//! - `ports/` - Trait definitions that adapters must implement (RateProvider, Cache)
//! - `dto/` - Inbound request shapes with their defaults and validation rules
//! - `error/` - Domain, provider, cache and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    ConversionResult, CurrencyCode, HistoricalSeries, PagedHistoricalResult, RateSnapshot,
    RateTable,
};
pub use dto::*;
pub use error::{AppError, CacheError, DomainError, ProviderError};
pub use ports::{Cache, CacheExt, RateProvider};
