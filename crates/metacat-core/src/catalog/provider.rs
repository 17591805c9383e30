//! Provider lookup by name.

use super::kv::{KvCatalog, KV_PROVIDER};
use super::memory::{MemoryCatalog, MEMORY_PROVIDER};
use super::operations::CatalogOperations;
use crate::codec::SerDeRegistry;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Builds a fresh, uninitialized provider instance.
pub type ProviderFactory = Arc<dyn Fn() -> Box<dyn CatalogOperations> + Send + Sync>;

/// Registry of catalog provider factories, keyed by provider name.
///
/// Names are matched case-insensitively after trimming.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `memory` and `kv` providers. The `kv` provider
    /// resolves its codec from `serdes`.
    pub fn with_defaults(serdes: Arc<SerDeRegistry>) -> Self {
        let mut registry = Self::new();
        registry.register(MEMORY_PROVIDER, || Box::new(MemoryCatalog::new()));
        registry.register(KV_PROVIDER, move || Box::new(KvCatalog::new(Arc::clone(&serdes))));
        registry
    }

    /// Register a factory, replacing any previous one with the same name.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn CatalogOperations> + Send + Sync + 'static,
    {
        let name = name.trim().to_ascii_lowercase();
        debug!(provider = %name, "registered catalog provider");
        self.factories.insert(name, Arc::new(factory));
    }

    /// Create a new instance of the named provider.
    pub fn create(&self, name: &str) -> Result<Box<dyn CatalogOperations>> {
        let key = name.trim().to_ascii_lowercase();
        let factory = self.factories.get(&key).ok_or_else(|| {
            Error::Config(format!(
                "unknown catalog provider `{}`, available: {}",
                name,
                self.providers().join(", ")
            ))
        })?;
        Ok(factory())
    }

    /// Registered provider names, sorted.
    pub fn providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories
            .contains_key(&name.trim().to_ascii_lowercase())
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::NameIdentifier;

    #[test]
    fn test_defaults() {
        let registry = ProviderRegistry::with_defaults(Arc::new(SerDeRegistry::with_defaults()));
        assert_eq!(registry.providers(), vec!["kv", "memory"]);
        assert_eq!(registry.create(" Memory ").unwrap().provider(), "memory");
    }

    #[test]
    fn test_unknown_provider() {
        let registry = ProviderRegistry::new();
        let err = registry.create("hive").err().expect("unknown provider");
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_each_create_is_fresh() {
        let registry = ProviderRegistry::with_defaults(Arc::new(SerDeRegistry::with_defaults()));
        let mut a = registry.create("memory").unwrap();
        let mut b = registry.create("memory").unwrap();
        a.initialize(&HashMap::new()).unwrap();
        b.initialize(&HashMap::new()).unwrap();

        let ident = NameIdentifier::parse("lake.mem.sales").unwrap();
        a.as_schemas()
            .unwrap()
            .create_schema(&ident, None, None)
            .unwrap();
        assert!(!b.as_schemas().unwrap().schema_exists(&ident).unwrap());
    }
}
