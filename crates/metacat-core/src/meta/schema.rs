//! Schema entity - a namespace of tables inside a catalog.

use super::audit::{self, AuditInfo};
use super::{require, require_name, EntityKind};
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// A schema inside a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaEntity {
    pub(crate) id: u64,
    pub(crate) name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) audit_info: Option<AuditInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) properties: Option<BTreeMap<String, String>>,
}

impl SchemaEntity {
    pub fn builder() -> SchemaEntityBuilder {
        SchemaEntityBuilder::default()
    }

    pub fn to_builder(&self) -> SchemaEntityBuilder {
        SchemaEntityBuilder {
            id: Some(self.id),
            name: Some(self.name.clone()),
            comment: self.comment.clone(),
            audit_info: self.audit_info.clone(),
            properties: self.properties.clone(),
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

    pub fn audit_info(&self) -> Option<&AuditInfo> {
        self.audit_info.as_ref()
    }

    pub fn properties(&self) -> Option<&BTreeMap<String, String>> {
        self.properties.as_ref()
    }
}

/// Builder for [`SchemaEntity`].
#[derive(Debug, Clone, Default)]
pub struct SchemaEntityBuilder {
    id: Option<u64>,
    name: Option<String>,
    comment: Option<String>,
    audit_info: Option<AuditInfo>,
    properties: Option<BTreeMap<String, String>>,
}

impl SchemaEntityBuilder {
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

    /// Set or clear the comment.
    pub fn with_optional_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    pub fn with_audit_info(mut self, audit_info: AuditInfo) -> Self {
        self.audit_info = Some(audit_info);
        self
    }

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

    /// Set or clear the whole property map.
    pub fn with_optional_properties(mut self, properties: Option<BTreeMap<String, String>>) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Result<SchemaEntity> {
        Ok(SchemaEntity {
            id: require(self.id, EntityKind::Schema, "id")?,
            name: require_name(self.name, EntityKind::Schema)?,
            comment: self.comment,
            audit_info: audit::normalize(self.audit_info),
            properties: self.properties,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_build_schema() {
        let schema = SchemaEntity::builder()
            .with_id(1)
            .with_name("schema")
            .with_audit_info(AuditInfo::new().with_creator("creator"))
            .build()
            .unwrap();

        assert_eq!(schema.id(), 1);
        assert_eq!(schema.name(), "schema");
        assert_eq!(schema.audit_info().unwrap().creator(), Some("creator"));
        assert!(schema.comment().is_none());
    }

    #[test]
    fn test_missing_id() {
        let err = SchemaEntity::builder().with_name("schema").build().unwrap_err();
        assert!(matches!(
            err,
            Error::Validation {
                kind: EntityKind::Schema,
                field: "id"
            }
        ));
    }

    #[test]
    fn test_clear_optional_fields() {
        let schema = SchemaEntity::builder()
            .with_id(1)
            .with_name("schema")
            .with_comment("c")
            .with_property("k", "v")
            .build()
            .unwrap();

        let cleared = schema
            .to_builder()
            .with_optional_comment(None)
            .with_optional_properties(None)
            .build()
            .unwrap();
        assert!(cleared.comment().is_none());
        assert!(cleared.properties().is_none());
    }
}
