//! Core configuration.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Key selecting the default entity codec.
pub const ENTITY_SERDE_KEY: &str = "metacat.entity.serde";

/// Key bounding the size of an encoded entity, in bytes.
pub const ENTITY_MAX_SIZE_KEY: &str = "metacat.entity.max-size";

/// Default entity codec.
pub const DEFAULT_ENTITY_SERDE: &str = "proto";

/// Default maximum encoded entity size (4 MB).
pub const DEFAULT_MAX_ENCODED_SIZE: usize = metacat_proto::MAX_ENTITY_SIZE;

/// Configuration for entity serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Format name of the default codec.
    pub entity_serde_format: String,

    /// Encoded entities larger than this are rejected.
    pub max_encoded_size: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            entity_serde_format: DEFAULT_ENTITY_SERDE.to_string(),
            max_encoded_size: DEFAULT_MAX_ENCODED_SIZE,
        }
    }
}

impl CoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default codec format.
    pub fn with_entity_serde(mut self, format: impl Into<String>) -> Self {
        self.entity_serde_format = format.into();
        self
    }

    /// Set the maximum encoded size.
    pub fn with_max_encoded_size(mut self, size: usize) -> Self {
        self.max_encoded_size = size;
        self
    }

    /// Read settings from a flat string map. Unknown keys are ignored.
    pub fn from_properties(properties: &HashMap<String, String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(format) = properties.get(ENTITY_SERDE_KEY) {
            let format = format.trim();
            if format.is_empty() {
                return Err(Error::Config(format!("`{}` must not be empty", ENTITY_SERDE_KEY)));
            }
            config.entity_serde_format = format.to_string();
        }

        if let Some(size) = properties.get(ENTITY_MAX_SIZE_KEY) {
            let size: usize = size.trim().parse().map_err(|_| {
                Error::Config(format!(
                    "`{}` must be a positive integer, got `{}`",
                    ENTITY_MAX_SIZE_KEY, size
                ))
            })?;
            if size == 0 {
                return Err(Error::Config(format!(
                    "`{}` must be greater than zero",
                    ENTITY_MAX_SIZE_KEY
                )));
            }
            config.max_encoded_size = size;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = CoreConfig::from_properties(&HashMap::new()).unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.entity_serde_format, "proto");
        assert_eq!(config.max_encoded_size, 4 * 1024 * 1024);
    }

    #[test]
    fn test_from_properties() {
        let config = CoreConfig::from_properties(&props(&[
            (ENTITY_SERDE_KEY, " rkyv "),
            (ENTITY_MAX_SIZE_KEY, "1024"),
            ("unrelated", "x"),
        ]))
        .unwrap();
        assert_eq!(config.entity_serde_format, "rkyv");
        assert_eq!(config.max_encoded_size, 1024);
    }

    #[test]
    fn test_bad_values() {
        let err = CoreConfig::from_properties(&props(&[(ENTITY_MAX_SIZE_KEY, "big")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        assert!(CoreConfig::from_properties(&props(&[(ENTITY_MAX_SIZE_KEY, "0")])).is_err());
        assert!(CoreConfig::from_properties(&props(&[(ENTITY_SERDE_KEY, "  ")])).is_err());
    }
}
