//! Provider registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use currency_types::{AppError, RateProvider};
use tracing::{debug, warn};

/// Case-insensitive map from provider name to instance.
///
/// Built once at startup. When two providers share a name (ignoring case),
/// the one registered last wins.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn RateProvider>>,
}

impl ProviderRegistry {
    pub fn new(providers: impl IntoIterator<Item = Arc<dyn RateProvider>>) -> Self {
        let mut map = BTreeMap::new();
        for provider in providers {
            let key = provider.name().to_lowercase();
            if map.insert(key, provider.clone()).is_some() {
                warn!(provider = provider.name(), "Duplicate provider name, replacing earlier registration");
            }
        }
        Self { providers: map }
    }

    /// Looks up a provider by name, ignoring case.
    pub fn get(&self, name: &str) -> Result<Arc<dyn RateProvider>, AppError> {
        match self.providers.get(&name.to_lowercase()) {
            Some(provider) => {
                debug!(provider = provider.name(), "Using {} for exchange rates.", provider.name());
                Ok(provider.clone())
            }
            None => Err(AppError::NotFound(format!("no provider found for {}", name))),
        }
    }

    /// Registered provider names, as the providers report them.
    pub fn names(&self) -> Vec<String> {
        self.providers
            .values()
            .map(|provider| provider.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
