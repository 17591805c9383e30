//! Codec lookup by format name.

use super::{ArchiveEntitySerDe, EntitySerDe, ProtoEntitySerDe};
use crate::config::CoreConfig;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Registry of available entity codecs.
///
/// Built once at startup and shared read-only afterwards. Format names are
/// matched case-insensitively.
#[derive(Clone, Default)]
pub struct SerDeRegistry {
    codecs: HashMap<String, Arc<dyn EntitySerDe>>,
}

impl SerDeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in `proto` and `rkyv` codecs.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ProtoEntitySerDe::new()));
        registry.register(Arc::new(ArchiveEntitySerDe::new()));
        registry
    }

    /// Registry whose built-in codecs enforce the configured size limit.
    pub fn from_config(config: &CoreConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ProtoEntitySerDe::with_max_size(
            config.max_encoded_size,
        )));
        registry.register(Arc::new(ArchiveEntitySerDe::with_max_size(
            config.max_encoded_size,
        )));
        registry
    }

    /// Register a codec under its format name, replacing any previous one.
    pub fn register(&mut self, codec: Arc<dyn EntitySerDe>) {
        let format = codec.format().to_ascii_lowercase();
        debug!(format = %format, "registered entity codec");
        self.codecs.insert(format, codec);
    }

    /// Look up the codec for `format`.
    pub fn create_entity_serde(&self, format: &str) -> Result<Arc<dyn EntitySerDe>> {
        let key = format.trim().to_ascii_lowercase();
        self.codecs.get(&key).cloned().ok_or_else(|| {
            Error::Config(format!(
                "unknown entity serde `{}`, available: {}",
                format,
                self.formats().join(", ")
            ))
        })
    }

    /// Codec selected by the `metacat.entity.serde` setting.
    pub fn resolve(&self, config: &CoreConfig) -> Result<Arc<dyn EntitySerDe>> {
        self.create_entity_serde(&config.entity_serde_format)
    }

    /// Registered format names, sorted.
    pub fn formats(&self) -> Vec<String> {
        let mut formats: Vec<String> = self.codecs.keys().cloned().collect();
        formats.sort();
        formats
    }

    pub fn contains(&self, format: &str) -> bool {
        self.codecs.contains_key(&format.trim().to_ascii_lowercase())
    }
}

impl std::fmt::Debug for SerDeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerDeRegistry")
            .field("formats", &self.formats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{archive, proto};

    #[test]
    fn test_defaults() {
        let registry = SerDeRegistry::with_defaults();
        assert_eq!(registry.formats(), vec![archive::FORMAT, proto::FORMAT]);
        assert_eq!(
            registry.create_entity_serde("proto").unwrap().format(),
            proto::FORMAT
        );
    }

    #[test]
    fn test_lookup_ignores_case_and_whitespace() {
        let registry = SerDeRegistry::with_defaults();
        assert_eq!(
            registry.create_entity_serde(" PROTO ").unwrap().format(),
            "proto"
        );
        assert!(registry.contains("Rkyv"));
    }

    #[test]
    fn test_unknown_format() {
        let registry = SerDeRegistry::with_defaults();
        let err = registry.create_entity_serde("avro").err().expect("unknown format");
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("proto, rkyv"));
    }

    #[test]
    fn test_resolve_from_config() {
        let registry = SerDeRegistry::with_defaults();
        let config = CoreConfig::default().with_entity_serde("rkyv");
        assert_eq!(registry.resolve(&config).unwrap().format(), "rkyv");
    }
}
