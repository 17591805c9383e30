//! Table entity - the leaf of the containment hierarchy.

use super::audit::{self, AuditInfo};
use super::{require, require_name, EntityKind};
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// A table inside a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableEntity {
    pub(crate) id: u64,
    pub(crate) name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) audit_info: Option<AuditInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) properties: Option<BTreeMap<String, String>>,
}

impl TableEntity {
    pub fn builder() -> TableEntityBuilder {
        TableEntityBuilder::default()
    }

    pub fn to_builder(&self) -> TableEntityBuilder {
        TableEntityBuilder {
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

/// Builder for [`TableEntity`].
#[derive(Debug, Clone, Default)]
pub struct TableEntityBuilder {
    id: Option<u64>,
    name: Option<String>,
    comment: Option<String>,
    audit_info: Option<AuditInfo>,
    properties: Option<BTreeMap<String, String>>,
}

impl TableEntityBuilder {
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

    pub fn build(self) -> Result<TableEntity> {
        Ok(TableEntity {
            id: require(self.id, EntityKind::Table, "id")?,
            name: require_name(self.name, EntityKind::Table)?,
            comment: self.comment,
            audit_info: audit::normalize(self.audit_info),
            properties: self.properties,
        })
    }
}
