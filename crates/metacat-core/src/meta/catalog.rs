//! Catalog entity - a named binding to one backend provider.

use super::audit::{self, AuditInfo};
use super::{require, require_name, EntityKind};
use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The family of backend a catalog fronts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogType {
    /// Relational tables (databases, lake table formats).
    Relational,
    /// File collections.
    Fileset,
    /// Message streams.
    Messaging,
}

impl CatalogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogType::Relational => "relational",
            CatalogType::Fileset => "fileset",
            CatalogType::Messaging => "messaging",
        }
    }
}

impl fmt::Display for CatalogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relational" => Ok(CatalogType::Relational),
            "fileset" => Ok(CatalogType::Fileset),
            "messaging" => Ok(CatalogType::Messaging),
            other => Err(Error::InvalidArgument(format!(
                "unknown catalog type: {}",
                other
            ))),
        }
    }
}

/// A catalog inside a metalake.
///
/// The owning metalake is found by name lookup; the entity holds no
/// reference to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntity {
    pub(crate) id: u64,
    pub(crate) name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) comment: Option<String>,
    #[serde(rename = "type")]
    pub(crate) catalog_type: CatalogType,
    pub(crate) provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) audit_info: Option<AuditInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) properties: Option<BTreeMap<String, String>>,
}

impl CatalogEntity {
    pub fn builder() -> CatalogEntityBuilder {
        CatalogEntityBuilder::default()
    }

    pub fn to_builder(&self) -> CatalogEntityBuilder {
        CatalogEntityBuilder {
            id: Some(self.id),
            name: Some(self.name.clone()),
            comment: self.comment.clone(),
            catalog_type: Some(self.catalog_type),
            provider: Some(self.provider.clone()),
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

    pub fn catalog_type(&self) -> CatalogType {
        self.catalog_type
    }

    /// Identifier of the backend implementation that operates this catalog.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn audit_info(&self) -> Option<&AuditInfo> {
        self.audit_info.as_ref()
    }

    pub fn properties(&self) -> Option<&BTreeMap<String, String>> {
        self.properties.as_ref()
    }
}

/// Builder for [`CatalogEntity`].
#[derive(Debug, Clone, Default)]
pub struct CatalogEntityBuilder {
    id: Option<u64>,
    name: Option<String>,
    comment: Option<String>,
    catalog_type: Option<CatalogType>,
    provider: Option<String>,
    audit_info: Option<AuditInfo>,
    properties: Option<BTreeMap<String, String>>,
}

impl CatalogEntityBuilder {
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

    pub fn with_type(mut self, catalog_type: CatalogType) -> Self {
        self.catalog_type = Some(catalog_type);
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
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

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Result<CatalogEntity> {
        let provider = require(self.provider, EntityKind::Catalog, "provider")?;
        if provider.is_empty() {
            return Err(Error::validation(EntityKind::Catalog, "provider"));
        }

        Ok(CatalogEntity {
            id: require(self.id, EntityKind::Catalog, "id")?,
            name: require_name(self.name, EntityKind::Catalog)?,
            comment: self.comment,
            catalog_type: require(self.catalog_type, EntityKind::Catalog, "type")?,
            provider,
            audit_info: audit::normalize(self.audit_info),
            properties: self.properties,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_catalog() {
        let catalog = CatalogEntity::builder()
            .with_id(1)
            .with_name("catalog")
            .with_comment("comment")
            .with_type(CatalogType::Relational)
            .with_provider("test")
            .with_audit_info(AuditInfo::new().with_creator("creator"))
            .build()
            .unwrap();

        assert_eq!(catalog.catalog_type(), CatalogType::Relational);
        assert_eq!(catalog.provider(), "test");
        assert_eq!(catalog.comment(), Some("comment"));
        assert!(catalog.properties().is_none());
    }

    #[test]
    fn test_type_and_provider_required() {
        let base = CatalogEntity::builder().with_id(1).with_name("catalog");

        let err = base.clone().with_provider("test").build().unwrap_err();
        assert!(matches!(err, Error::Validation { field: "type", .. }));

        let err = base
            .clone()
            .with_type(CatalogType::Fileset)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Validation { field: "provider", .. }));

        let err = base
            .with_type(CatalogType::Fileset)
            .with_provider("")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Validation { field: "provider", .. }));
    }

    #[test]
    fn test_catalog_type_parse() {
        assert_eq!("RELATIONAL".parse::<CatalogType>().unwrap(), CatalogType::Relational);
        assert_eq!(" fileset ".parse::<CatalogType>().unwrap(), CatalogType::Fileset);
        assert!("graph".parse::<CatalogType>().is_err());
    }
}
