//! rkyv entity codec.
//!
//! Entities are copied into plain archive records and written with rkyv. The
//! archive is validated with bytecheck on read, so corrupt input is rejected
//! rather than trusted.

use super::{check_kind, collect_properties, rebuilt, EntitySerDe};
use crate::error::{Error, Result};
use crate::meta::{
    AuditInfo, CatalogEntity, CatalogType, Entity, EntityKind, Metalake, SchemaEntity,
    SchemaVersion, TableEntity,
};
use chrono::{DateTime, Utc};
use rkyv::util::AlignedVec;
use rkyv::{Archive, Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Format identifier of the rkyv codec.
pub const FORMAT: &str = "rkyv";

#[derive(Debug, Clone, Copy, PartialEq, Archive, Serialize, Deserialize)]
struct TimestampRecord {
    seconds: i64,
    nanos: u32,
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
struct AuditRecord {
    creator: Option<String>,
    create_time: Option<TimestampRecord>,
    last_modifier: Option<String>,
    last_modified_time: Option<TimestampRecord>,
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
struct PropertyRecord {
    key: String,
    value: String,
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
struct MetalakeRecord {
    version_major: u32,
    version_minor: u32,
    id: u64,
    name: String,
    comment: Option<String>,
    properties: Option<Vec<PropertyRecord>>,
    audit_info: Option<AuditRecord>,
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
struct CatalogRecord {
    id: u64,
    name: String,
    comment: Option<String>,
    catalog_type: u8,
    provider: String,
    properties: Option<Vec<PropertyRecord>>,
    audit_info: Option<AuditRecord>,
}

/// Schema and table records share a layout.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
struct LeafRecord {
    id: u64,
    name: String,
    comment: Option<String>,
    properties: Option<Vec<PropertyRecord>>,
    audit_info: Option<AuditRecord>,
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
enum EntityRecord {
    AuditInfo(AuditRecord),
    Metalake(MetalakeRecord),
    Catalog(CatalogRecord),
    Schema(LeafRecord),
    Table(LeafRecord),
}

impl EntityRecord {
    fn kind(&self) -> EntityKind {
        match self {
            EntityRecord::AuditInfo(_) => EntityKind::AuditInfo,
            EntityRecord::Metalake(_) => EntityKind::Metalake,
            EntityRecord::Catalog(_) => EntityKind::Catalog,
            EntityRecord::Schema(_) => EntityKind::Schema,
            EntityRecord::Table(_) => EntityKind::Table,
        }
    }
}

/// rkyv implementation of [`EntitySerDe`].
#[derive(Debug, Clone)]
pub struct ArchiveEntitySerDe {
    max_size: usize,
}

impl ArchiveEntitySerDe {
    /// Create a codec with the same default limit as the protobuf envelope.
    pub fn new() -> Self {
        Self::with_max_size(metacat_proto::MAX_ENTITY_SIZE)
    }

    pub fn with_max_size(max_size: usize) -> Self {
        Self { max_size }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for ArchiveEntitySerDe {
    fn default() -> Self {
        Self::new()
    }
}

impl EntitySerDe for ArchiveEntitySerDe {
    fn format(&self) -> &'static str {
        FORMAT
    }

    fn serialize(&self, entity: &Entity) -> Result<Vec<u8>> {
        let kind = entity.kind();
        let record = to_record(entity);

        let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&record)
            .map(|v| v.to_vec())
            .map_err(|e| Error::serialization(kind, e.to_string()))?;
        if bytes.len() > self.max_size {
            return Err(Error::serialization(
                kind,
                format!("archive size {} exceeds maximum {}", bytes.len(), self.max_size),
            ));
        }

        debug!(kind = %kind, format = FORMAT, size = bytes.len(), "serialized entity");
        Ok(bytes)
    }

    fn deserialize(&self, bytes: &[u8], expected: EntityKind) -> Result<Entity> {
        if bytes.len() > self.max_size {
            return Err(Error::deserialization(
                expected,
                format!("archive size {} exceeds maximum {}", bytes.len(), self.max_size),
            ));
        }

        // Stored bytes carry no alignment guarantee; copy into an aligned buffer.
        let mut aligned = AlignedVec::<16>::with_capacity(bytes.len());
        aligned.extend_from_slice(bytes);

        let record = rkyv::from_bytes::<EntityRecord, rkyv::rancor::Error>(&aligned)
            .map_err(|e| Error::deserialization(expected, e.to_string()))?;
        check_kind(expected, record.kind())?;

        let entity = from_record(record)?;
        debug!(kind = %expected, format = FORMAT, size = bytes.len(), "deserialized entity");
        Ok(entity)
    }
}

fn to_record(entity: &Entity) -> EntityRecord {
    match entity {
        Entity::AuditInfo(audit) => EntityRecord::AuditInfo(audit_record(audit)),
        Entity::Metalake(m) => EntityRecord::Metalake(MetalakeRecord {
            version_major: m.version.major(),
            version_minor: m.version.minor(),
            id: m.id,
            name: m.name.clone(),
            comment: m.comment.clone(),
            properties: property_records(&m.properties),
            audit_info: m.audit_info.as_ref().map(audit_record),
        }),
        Entity::Catalog(c) => EntityRecord::Catalog(CatalogRecord {
            id: c.id,
            name: c.name.clone(),
            comment: c.comment.clone(),
            catalog_type: catalog_type_code(c.catalog_type),
            provider: c.provider.clone(),
            properties: property_records(&c.properties),
            audit_info: c.audit_info.as_ref().map(audit_record),
        }),
        Entity::Schema(s) => EntityRecord::Schema(LeafRecord {
            id: s.id,
            name: s.name.clone(),
            comment: s.comment.clone(),
            properties: property_records(&s.properties),
            audit_info: s.audit_info.as_ref().map(audit_record),
        }),
        Entity::Table(t) => EntityRecord::Table(LeafRecord {
            id: t.id,
            name: t.name.clone(),
            comment: t.comment.clone(),
            properties: property_records(&t.properties),
            audit_info: t.audit_info.as_ref().map(audit_record),
        }),
    }
}

fn from_record(record: EntityRecord) -> Result<Entity> {
    match record {
        EntityRecord::AuditInfo(audit) => Ok(Entity::AuditInfo(audit_from_record(
            EntityKind::AuditInfo,
            audit,
        )?)),
        EntityRecord::Metalake(m) => {
            let kind = EntityKind::Metalake;
            let version = SchemaVersion::from_parts(m.version_major, m.version_minor).ok_or(
                Error::UnsupportedVersion {
                    major: m.version_major,
                    minor: m.version_minor,
                },
            )?;
            let mut builder = Metalake::builder()
                .with_id(m.id)
                .with_name(m.name)
                .with_version(version);
            if let Some(comment) = m.comment {
                builder = builder.with_comment(comment);
            }
            if let Some(props) = m.properties {
                builder = builder.with_properties(properties_from_records(kind, props)?);
            }
            if let Some(audit) = m.audit_info {
                builder = builder.with_audit_info(audit_from_record(kind, audit)?);
            }
            Ok(Entity::Metalake(rebuilt(kind, builder.build())?))
        }
        EntityRecord::Catalog(c) => {
            let kind = EntityKind::Catalog;
            let mut builder = CatalogEntity::builder()
                .with_id(c.id)
                .with_name(c.name)
                .with_type(catalog_type_from_code(c.catalog_type)?)
                .with_provider(c.provider);
            if let Some(comment) = c.comment {
                builder = builder.with_comment(comment);
            }
            if let Some(props) = c.properties {
                builder = builder.with_properties(properties_from_records(kind, props)?);
            }
            if let Some(audit) = c.audit_info {
                builder = builder.with_audit_info(audit_from_record(kind, audit)?);
            }
            Ok(Entity::Catalog(rebuilt(kind, builder.build())?))
        }
        EntityRecord::Schema(s) => {
            let kind = EntityKind::Schema;
            let mut builder = SchemaEntity::builder()
                .with_id(s.id)
                .with_name(s.name)
                .with_optional_comment(s.comment)
                .with_optional_properties(
                    s.properties
                        .map(|p| properties_from_records(kind, p))
                        .transpose()?,
                );
            if let Some(audit) = s.audit_info {
                builder = builder.with_audit_info(audit_from_record(kind, audit)?);
            }
            Ok(Entity::Schema(rebuilt(kind, builder.build())?))
        }
        EntityRecord::Table(t) => {
            let kind = EntityKind::Table;
            let mut builder = TableEntity::builder()
                .with_id(t.id)
                .with_name(t.name)
                .with_optional_comment(t.comment)
                .with_optional_properties(
                    t.properties
                        .map(|p| properties_from_records(kind, p))
                        .transpose()?,
                );
            if let Some(audit) = t.audit_info {
                builder = builder.with_audit_info(audit_from_record(kind, audit)?);
            }
            Ok(Entity::Table(rebuilt(kind, builder.build())?))
        }
    }
}

fn timestamp_record(time: &DateTime<Utc>) -> TimestampRecord {
    TimestampRecord {
        seconds: time.timestamp(),
        nanos: time.timestamp_subsec_nanos(),
    }
}

fn audit_record(audit: &AuditInfo) -> AuditRecord {
    AuditRecord {
        creator: audit.creator.clone(),
        create_time: audit.create_time.as_ref().map(timestamp_record),
        last_modifier: audit.last_modifier.clone(),
        last_modified_time: audit.last_modified_time.as_ref().map(timestamp_record),
    }
}

fn audit_from_record(kind: EntityKind, record: AuditRecord) -> Result<AuditInfo> {
    let time = |ts: TimestampRecord| {
        DateTime::from_timestamp(ts.seconds, ts.nanos).ok_or_else(|| {
            Error::deserialization(kind, format!("timestamp out of range: {}s", ts.seconds))
        })
    };
    Ok(AuditInfo {
        creator: record.creator,
        create_time: record.create_time.map(time).transpose()?,
        last_modifier: record.last_modifier,
        last_modified_time: record.last_modified_time.map(time).transpose()?,
    })
}

fn property_records(properties: &Option<BTreeMap<String, String>>) -> Option<Vec<PropertyRecord>> {
    properties.as_ref().map(|map| {
        map.iter()
            .map(|(key, value)| PropertyRecord {
                key: key.clone(),
                value: value.clone(),
            })
            .collect()
    })
}

fn properties_from_records(
    kind: EntityKind,
    records: Vec<PropertyRecord>,
) -> Result<BTreeMap<String, String>> {
    collect_properties(kind, records.into_iter().map(|r| (r.key, r.value)))
}

fn catalog_type_code(catalog_type: CatalogType) -> u8 {
    match catalog_type {
        CatalogType::Relational => 1,
        CatalogType::Fileset => 2,
        CatalogType::Messaging => 3,
    }
}

fn catalog_type_from_code(code: u8) -> Result<CatalogType> {
    match code {
        1 => Ok(CatalogType::Relational),
        2 => Ok(CatalogType::Fileset),
        3 => Ok(CatalogType::Messaging),
        other => Err(Error::deserialization(
            EntityKind::Catalog,
            format!("unknown catalog type {}", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::EntitySerDeExt;

    fn raw_bytes(record: &EntityRecord) -> Vec<u8> {
        rkyv::to_bytes::<rkyv::rancor::Error>(record)
            .unwrap()
            .to_vec()
    }

    #[test]
    fn test_schema_roundtrip() {
        let serde = ArchiveEntitySerDe::new();
        let schema = SchemaEntity::builder()
            .with_id(5)
            .with_name("sales")
            .with_properties([("owner", "finance")])
            .build()
            .unwrap();

        let bytes = serde.serialize_entity(&schema).unwrap();
        let decoded: SchemaEntity = serde.deserialize_entity(&bytes).unwrap();
        assert_eq!(decoded, schema);
    }

    #[test]
    fn test_unknown_version_rejected() {
        let serde = ArchiveEntitySerDe::new();
        let bytes = raw_bytes(&EntityRecord::Metalake(MetalakeRecord {
            version_major: 3,
            version_minor: 0,
            id: 1,
            name: "ml".into(),
            comment: None,
            properties: None,
            audit_info: None,
        }));

        let err = serde.deserialize(&bytes, EntityKind::Metalake).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion { major: 3, minor: 0 }));
    }

    #[test]
    fn test_empty_name_record_rejected() {
        let serde = ArchiveEntitySerDe::new();
        let bytes = raw_bytes(&EntityRecord::Table(LeafRecord {
            id: 1,
            name: String::new(),
            comment: None,
            properties: None,
            audit_info: None,
        }));

        let err = serde.deserialize(&bytes, EntityKind::Table).unwrap_err();
        assert!(matches!(
            err,
            Error::Deserialization {
                kind: EntityKind::Table,
                ..
            }
        ));
    }

    #[test]
    fn test_default_limit_matches_proto() {
        assert_eq!(ArchiveEntitySerDe::new().max_size(), metacat_proto::MAX_ENTITY_SIZE);
        assert_eq!(
            ArchiveEntitySerDe::default().max_size(),
            crate::codec::proto::ProtoEntitySerDe::default().max_size()
        );
    }

    #[test]
    fn test_garbage_rejected() {
        let serde = ArchiveEntitySerDe::new();
        let err = serde.deserialize(&[1, 2, 3], EntityKind::Schema).unwrap_err();
        assert!(err.is_deserialization());
    }
}
