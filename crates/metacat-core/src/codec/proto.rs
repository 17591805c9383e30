//! Protobuf entity codec.
//!
//! Each entity kind maps to one wire message (see `metacat_proto::messages`),
//! carried inside an `EntityEnvelope` whose payload variant names the kind.
//!
//! Presence rules:
//! - unset optional fields are omitted and decode to `None`
//! - an absent property map has no `properties` sub-message; an empty map has
//!   a present sub-message with zero entries
//! - entities never carry an empty audit info (see [`AuditInfo`]), so an
//!   entity without provenance has no `audit_info` sub-message at all
//! - a standalone [`AuditInfo`] always has a payload, possibly zero-length

use super::{check_kind, collect_properties, rebuilt, EntitySerDe};
use crate::error::{Error, Result};
use crate::meta::{
    AuditInfo, CatalogEntity, CatalogType, Entity, EntityKind, Metalake, SchemaEntity,
    SchemaVersion, TableEntity,
};
use chrono::{DateTime, Utc};
use metacat_proto::{self as wire, Payload};
use std::collections::BTreeMap;
use tracing::debug;

/// Format identifier of the protobuf codec.
pub const FORMAT: &str = "proto";

/// Protobuf implementation of [`EntitySerDe`].
#[derive(Debug, Clone)]
pub struct ProtoEntitySerDe {
    max_size: usize,
}

impl ProtoEntitySerDe {
    /// Create a codec with the default envelope size limit.
    pub fn new() -> Self {
        Self::with_max_size(wire::MAX_ENTITY_SIZE)
    }

    /// Create a codec with a custom envelope size limit.
    pub fn with_max_size(max_size: usize) -> Self {
        Self { max_size }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for ProtoEntitySerDe {
    fn default() -> Self {
        Self::new()
    }
}

impl EntitySerDe for ProtoEntitySerDe {
    fn format(&self) -> &'static str {
        FORMAT
    }

    fn serialize(&self, entity: &Entity) -> Result<Vec<u8>> {
        let kind = entity.kind();
        let payload = match entity {
            Entity::AuditInfo(e) => Payload::AuditInfo(e.to_message()),
            Entity::Metalake(e) => Payload::Metalake(e.to_message()),
            Entity::Catalog(e) => Payload::Catalog(e.to_message()),
            Entity::Schema(e) => Payload::Schema(e.to_message()),
            Entity::Table(e) => Payload::Table(e.to_message()),
        };

        let bytes = wire::encode_envelope(payload, self.max_size)
            .map_err(|e| Error::serialization(kind, e.to_string()))?;

        debug!(kind = %kind, format = FORMAT, size = bytes.len(), "serialized entity");
        Ok(bytes)
    }

    fn deserialize(&self, bytes: &[u8], expected: EntityKind) -> Result<Entity> {
        let payload = wire::decode_envelope(bytes, self.max_size)
            .map_err(|e| Error::deserialization(expected, e.to_string()))?;
        check_kind(expected, payload_kind(&payload))?;

        let entity = match payload {
            Payload::AuditInfo(m) => Entity::AuditInfo(AuditInfo::from_message(m)?),
            Payload::Metalake(m) => Entity::Metalake(Metalake::from_message(m)?),
            Payload::Catalog(m) => Entity::Catalog(CatalogEntity::from_message(m)?),
            Payload::Schema(m) => Entity::Schema(SchemaEntity::from_message(m)?),
            Payload::Table(m) => Entity::Table(TableEntity::from_message(m)?),
        };

        debug!(kind = %expected, format = FORMAT, size = bytes.len(), "deserialized entity");
        Ok(entity)
    }
}

fn payload_kind(payload: &Payload) -> EntityKind {
    match payload {
        Payload::AuditInfo(_) => EntityKind::AuditInfo,
        Payload::Metalake(_) => EntityKind::Metalake,
        Payload::Catalog(_) => EntityKind::Catalog,
        Payload::Schema(_) => EntityKind::Schema,
        Payload::Table(_) => EntityKind::Table,
    }
}

/// Conversion between an entity type and its wire message.
trait ProtoMapping: Sized {
    type Message;

    fn to_message(&self) -> Self::Message;

    fn from_message(message: Self::Message) -> Result<Self>;
}

fn timestamp_to_message(time: &DateTime<Utc>) -> wire::Timestamp {
    wire::Timestamp {
        seconds: time.timestamp(),
        nanos: time.timestamp_subsec_nanos() as i32,
    }
}

fn timestamp_from_message(kind: EntityKind, ts: wire::Timestamp) -> Result<DateTime<Utc>> {
    let nanos = u32::try_from(ts.nanos)
        .map_err(|_| Error::deserialization(kind, format!("negative nanos {}", ts.nanos)))?;
    DateTime::from_timestamp(ts.seconds, nanos).ok_or_else(|| {
        Error::deserialization(
            kind,
            format!("timestamp out of range: {}s {}ns", ts.seconds, ts.nanos),
        )
    })
}

fn properties_to_message(properties: &Option<BTreeMap<String, String>>) -> Option<wire::Properties> {
    properties
        .as_ref()
        .map(|map| wire::Properties::from_sorted(map.iter()))
}

fn properties_from_message(
    kind: EntityKind,
    properties: wire::Properties,
) -> Result<BTreeMap<String, String>> {
    collect_properties(
        kind,
        properties.entries.into_iter().map(|e| (e.key, e.value)),
    )
}

fn audit_from_message(kind: EntityKind, message: wire::AuditInfo) -> Result<AuditInfo> {
    Ok(AuditInfo {
        creator: message.creator,
        create_time: message
            .create_time
            .map(|ts| timestamp_from_message(kind, ts))
            .transpose()?,
        last_modifier: message.last_modifier,
        last_modified_time: message
            .last_modified_time
            .map(|ts| timestamp_from_message(kind, ts))
            .transpose()?,
    })
}

fn catalog_type_to_message(catalog_type: CatalogType) -> wire::CatalogType {
    match catalog_type {
        CatalogType::Relational => wire::CatalogType::Relational,
        CatalogType::Fileset => wire::CatalogType::Fileset,
        CatalogType::Messaging => wire::CatalogType::Messaging,
    }
}

fn catalog_type_from_message(value: i32) -> Result<CatalogType> {
    match wire::CatalogType::try_from(value) {
        Ok(wire::CatalogType::Relational) => Ok(CatalogType::Relational),
        Ok(wire::CatalogType::Fileset) => Ok(CatalogType::Fileset),
        Ok(wire::CatalogType::Messaging) => Ok(CatalogType::Messaging),
        Ok(wire::CatalogType::Unspecified) => Err(Error::deserialization(
            EntityKind::Catalog,
            "missing required field `type`",
        )),
        Err(_) => Err(Error::deserialization(
            EntityKind::Catalog,
            format!("unknown catalog type {}", value),
        )),
    }
}

impl ProtoMapping for AuditInfo {
    type Message = wire::AuditInfo;

    fn to_message(&self) -> wire::AuditInfo {
        wire::AuditInfo {
            creator: self.creator.clone(),
            create_time: self.create_time.as_ref().map(timestamp_to_message),
            last_modifier: self.last_modifier.clone(),
            last_modified_time: self.last_modified_time.as_ref().map(timestamp_to_message),
        }
    }

    fn from_message(message: wire::AuditInfo) -> Result<Self> {
        audit_from_message(EntityKind::AuditInfo, message)
    }
}

impl ProtoMapping for Metalake {
    type Message = wire::Metalake;

    fn to_message(&self) -> wire::Metalake {
        wire::Metalake {
            id: Some(self.id),
            name: Some(self.name.clone()),
            comment: self.comment.clone(),
            properties: properties_to_message(&self.properties),
            audit_info: self.audit_info.as_ref().map(|a| a.to_message()),
            version: Some(wire::SchemaVersion {
                major_version: self.version.major(),
                minor_version: self.version.minor(),
            }),
        }
    }

    fn from_message(message: wire::Metalake) -> Result<Self> {
        let kind = EntityKind::Metalake;

        // The version decides how the rest of the record is read, so it is
        // checked before anything else.
        let version = message
            .version
            .ok_or_else(|| Error::deserialization(kind, "missing required field `version`"))?;
        let version = SchemaVersion::from_parts(version.major_version, version.minor_version)
            .ok_or(Error::UnsupportedVersion {
                major: version.major_version,
                minor: version.minor_version,
            })?;

        let mut builder = Metalake::builder().with_version(version);
        if let Some(id) = message.id {
            builder = builder.with_id(id);
        }
        if let Some(name) = message.name {
            builder = builder.with_name(name);
        }
        if let Some(comment) = message.comment {
            builder = builder.with_comment(comment);
        }
        if let Some(properties) = message.properties {
            builder = builder.with_properties(properties_from_message(kind, properties)?);
        }
        if let Some(audit) = message.audit_info {
            builder = builder.with_audit_info(audit_from_message(kind, audit)?);
        }
        rebuilt(kind, builder.build())
    }
}

impl ProtoMapping for CatalogEntity {
    type Message = wire::Catalog;

    fn to_message(&self) -> wire::Catalog {
        wire::Catalog {
            id: Some(self.id),
            name: Some(self.name.clone()),
            comment: self.comment.clone(),
            properties: properties_to_message(&self.properties),
            audit_info: self.audit_info.as_ref().map(|a| a.to_message()),
            catalog_type: catalog_type_to_message(self.catalog_type) as i32,
            provider: Some(self.provider.clone()),
        }
    }

    fn from_message(message: wire::Catalog) -> Result<Self> {
        let kind = EntityKind::Catalog;
        let mut builder =
            CatalogEntity::builder().with_type(catalog_type_from_message(message.catalog_type)?);
        if let Some(id) = message.id {
            builder = builder.with_id(id);
        }
        if let Some(name) = message.name {
            builder = builder.with_name(name);
        }
        if let Some(comment) = message.comment {
            builder = builder.with_comment(comment);
        }
        if let Some(provider) = message.provider {
            builder = builder.with_provider(provider);
        }
        if let Some(properties) = message.properties {
            builder = builder.with_properties(properties_from_message(kind, properties)?);
        }
        if let Some(audit) = message.audit_info {
            builder = builder.with_audit_info(audit_from_message(kind, audit)?);
        }
        rebuilt(kind, builder.build())
    }
}

macro_rules! leaf_mapping {
    ($entity:ty, $message:ty, $kind:expr) => {
        impl ProtoMapping for $entity {
            type Message = $message;

            fn to_message(&self) -> $message {
                <$message>::from_parts(
                    self.id,
                    self.name.clone(),
                    self.comment.clone(),
                    properties_to_message(&self.properties),
                    self.audit_info.as_ref().map(|a| a.to_message()),
                )
            }

            fn from_message(message: $message) -> Result<Self> {
                let kind = $kind;
                let mut builder = <$entity>::builder()
                    .with_optional_comment(message.comment)
                    .with_optional_properties(
                        message
                            .properties
                            .map(|p| properties_from_message(kind, p))
                            .transpose()?,
                    );
                if let Some(id) = message.id {
                    builder = builder.with_id(id);
                }
                if let Some(name) = message.name {
                    builder = builder.with_name(name);
                }
                if let Some(audit) = message.audit_info {
                    builder = builder.with_audit_info(audit_from_message(kind, audit)?);
                }
                rebuilt(kind, builder.build())
            }
        }
    };
}

/// Shared constructor for the schema and table messages, which have the
/// same field layout.
trait LeafMessage {
    fn from_parts(
        id: u64,
        name: String,
        comment: Option<String>,
        properties: Option<wire::Properties>,
        audit_info: Option<wire::AuditInfo>,
    ) -> Self;
}

impl LeafMessage for wire::Schema {
    fn from_parts(
        id: u64,
        name: String,
        comment: Option<String>,
        properties: Option<wire::Properties>,
        audit_info: Option<wire::AuditInfo>,
    ) -> Self {
        wire::Schema {
            id: Some(id),
            name: Some(name),
            comment,
            properties,
            audit_info,
        }
    }
}

impl LeafMessage for wire::Table {
    fn from_parts(
        id: u64,
        name: String,
        comment: Option<String>,
        properties: Option<wire::Properties>,
        audit_info: Option<wire::AuditInfo>,
    ) -> Self {
        wire::Table {
            id: Some(id),
            name: Some(name),
            comment,
            properties,
            audit_info,
        }
    }
}

leaf_mapping!(SchemaEntity, wire::Schema, EntityKind::Schema);
leaf_mapping!(TableEntity, wire::Table, EntityKind::Table);
