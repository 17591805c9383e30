//! Metalake entity - the root of the containment hierarchy.

use super::audit::{self, AuditInfo};
use super::{require, require_name, EntityKind, SchemaVersion};
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// A top-level namespace containing catalogs.
///
/// Built through [`MetalakeBuilder`]; there are no setters. Use
/// [`Metalake::to_builder`] to derive a modified copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metalake {
    pub(crate) id: u64,
    pub(crate) name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) properties: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) audit_info: Option<AuditInfo>,
    pub(crate) version: SchemaVersion,
}

impl Metalake {
    /// Start building a metalake.
    pub fn builder() -> MetalakeBuilder {
        MetalakeBuilder::default()
    }

    /// A builder pre-filled with this metalake's fields.
    pub fn to_builder(&self) -> MetalakeBuilder {
        MetalakeBuilder {
            id: Some(self.id),
            name: Some(self.name.clone()),
            comment: self.comment.clone(),
            properties: self.properties.clone(),
            audit_info: self.audit_info.clone(),
            version: Some(self.version),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn properties(&self) -> Option<&BTreeMap<String, String>> {
        self.properties.as_ref()
    }

    pub fn audit_info(&self) -> Option<&AuditInfo> {
        self.audit_info.as_ref()
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }
}

/// Builder for [`Metalake`].
#[derive(Debug, Clone, Default)]
pub struct MetalakeBuilder {
    id: Option<u64>,
    name: Option<String>,
    comment: Option<String>,
    properties: Option<BTreeMap<String, String>>,
    audit_info: Option<AuditInfo>,
    version: Option<SchemaVersion>,
}

impl MetalakeBuilder {
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Replace the property map. An empty iterator sets an empty map, which
    /// is distinct from never setting properties.
    pub fn with_properties<K, V>(mut self, properties: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.properties = Some(
            properties
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Add a single property, creating the map if needed.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_audit_info(mut self, audit_info: AuditInfo) -> Self {
        self.audit_info = Some(audit_info);
        self
    }

    pub fn with_version(mut self, version: SchemaVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// Validate required fields and build the metalake.
    pub fn build(self) -> Result<Metalake> {
        Ok(Metalake {
            id: require(self.id, EntityKind::Metalake, "id")?,
            name: require_name(self.name, EntityKind::Metalake)?,
            comment: self.comment,
            properties: self.properties,
            audit_info: audit::normalize(self.audit_info),
            version: require(self.version, EntityKind::Metalake, "version")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn base() -> MetalakeBuilder {
        Metalake::builder()
            .with_id(1)
            .with_name("ml1")
            .with_version(SchemaVersion::V0_1)
    }

    #[test]
    fn test_build_minimal() {
        let metalake = base().build().unwrap();
        assert_eq!(metalake.id(), 1);
        assert_eq!(metalake.name(), "ml1");
        assert_eq!(metalake.version(), SchemaVersion::V0_1);
        assert!(metalake.properties().is_none());
        assert!(metalake.audit_info().is_none());
    }

    #[test]
    fn test_missing_required_fields() {
        let err = Metalake::builder()
            .with_name("ml1")
            .with_version(SchemaVersion::V0_1)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Validation { field: "id", .. }));

        let err = Metalake::builder()
            .with_id(1)
            .with_version(SchemaVersion::V0_1)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Validation { field: "name", .. }));

        let err = Metalake::builder()
            .with_id(1)
            .with_name("ml1")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation {
                kind: EntityKind::Metalake,
                field: "version"
            }
        ));
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = base().with_name("").build().unwrap_err();
        assert!(matches!(err, Error::Validation { field: "name", .. }));
    }

    #[test]
    fn test_property_map_presence() {
        let absent = base().build().unwrap();
        let empty = base()
            .with_properties(Vec::<(String, String)>::new())
            .build()
            .unwrap();

        assert_eq!(absent.properties(), None);
        assert_eq!(empty.properties(), Some(&BTreeMap::new()));
        assert_ne!(absent, empty);
    }

    #[test]
    fn test_to_builder_produces_new_instance() {
        let original = base().with_property("k1", "v1").build().unwrap();
        let updated = original
            .to_builder()
            .with_property("k2", "v2")
            .build()
            .unwrap();

        assert_eq!(original.properties().unwrap().len(), 1);
        assert_eq!(updated.properties().unwrap().len(), 2);
        assert_eq!(updated.id(), original.id());
    }

    #[test]
    fn test_empty_audit_collapses_to_absent() {
        let metalake = base().with_audit_info(AuditInfo::new()).build().unwrap();
        assert!(metalake.audit_info().is_none());
        assert_eq!(metalake, base().build().unwrap());
    }
}
