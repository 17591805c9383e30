//! Protobuf message definitions for catalog entities.
//!
//! Every optional field uses protobuf presence so that an unset value is
//! omitted from the encoding and decodes back to `None`. Identity fields are
//! presence-tracked as well, which lets decoders reject a message that lost
//! its `id` or `name` instead of reading back `0` or `""`.
//!
//! Field numbers are never reused; removed fields must be reserved.

/// A point in time, UTC.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Timestamp {
    /// Seconds since the Unix epoch.
    #[prost(int64, tag = "1")]
    pub seconds: i64,
    /// Sub-second nanoseconds, `0..1_000_000_000`.
    #[prost(int32, tag = "2")]
    pub nanos: i32,
}

/// Creation and modification provenance.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct AuditInfo {
    #[prost(string, optional, tag = "1")]
    pub creator: Option<String>,
    #[prost(message, optional, tag = "2")]
    pub create_time: Option<Timestamp>,
    #[prost(string, optional, tag = "3")]
    pub last_modifier: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub last_modified_time: Option<Timestamp>,
}

/// One key/value pair of a property map.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct PropertyEntry {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(string, tag = "2")]
    pub value: String,
}

/// A property map.
///
/// Wrapped in its own message so that an empty map (present, zero entries)
/// stays distinguishable from an absent one.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Properties {
    #[prost(message, repeated, tag = "1")]
    pub entries: Vec<PropertyEntry>,
}

/// Entity-model revision that produced a record.
#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message)]
pub struct SchemaVersion {
    #[prost(uint32, tag = "1")]
    pub major_version: u32,
    #[prost(uint32, tag = "2")]
    pub minor_version: u32,
}

/// Backend family a catalog fronts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum CatalogType {
    Unspecified = 0,
    Relational = 1,
    Fileset = 2,
    Messaging = 3,
}

/// Top-level namespace record.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Metalake {
    #[prost(uint64, optional, tag = "1")]
    pub id: Option<u64>,
    #[prost(string, optional, tag = "2")]
    pub name: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub comment: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub properties: Option<Properties>,
    #[prost(message, optional, tag = "5")]
    pub audit_info: Option<AuditInfo>,
    #[prost(message, optional, tag = "6")]
    pub version: Option<SchemaVersion>,
}

/// Catalog record.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Catalog {
    #[prost(uint64, optional, tag = "1")]
    pub id: Option<u64>,
    #[prost(string, optional, tag = "2")]
    pub name: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub comment: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub properties: Option<Properties>,
    #[prost(message, optional, tag = "5")]
    pub audit_info: Option<AuditInfo>,
    #[prost(enumeration = "CatalogType", tag = "6")]
    pub catalog_type: i32,
    #[prost(string, optional, tag = "7")]
    pub provider: Option<String>,
}

/// Schema record.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Schema {
    #[prost(uint64, optional, tag = "1")]
    pub id: Option<u64>,
    #[prost(string, optional, tag = "2")]
    pub name: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub comment: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub properties: Option<Properties>,
    #[prost(message, optional, tag = "5")]
    pub audit_info: Option<AuditInfo>,
}

/// Table record.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Table {
    #[prost(uint64, optional, tag = "1")]
    pub id: Option<u64>,
    #[prost(string, optional, tag = "2")]
    pub name: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub comment: Option<String>,
    #[prost(message, optional, tag = "4")]
    pub properties: Option<Properties>,
    #[prost(message, optional, tag = "5")]
    pub audit_info: Option<AuditInfo>,
}

/// Outer message written for every stored entity.
///
/// The `payload` variant names the entity kind, so a reader can tell which
/// record it holds before interpreting any field.
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct EntityEnvelope {
    #[prost(oneof = "entity_envelope::Payload", tags = "1, 2, 3, 4, 5")]
    pub payload: Option<entity_envelope::Payload>,
}

/// Nested types for [`EntityEnvelope`].
pub mod entity_envelope {
    /// The entity carried by an envelope.
    #[derive(Clone, PartialEq, Eq, ::prost::Oneof)]
    pub enum Payload {
        #[prost(message, tag = "1")]
        AuditInfo(super::AuditInfo),
        #[prost(message, tag = "2")]
        Metalake(super::Metalake),
        #[prost(message, tag = "3")]
        Catalog(super::Catalog),
        #[prost(message, tag = "4")]
        Schema(super::Schema),
        #[prost(message, tag = "5")]
        Table(super::Table),
    }

    impl Payload {
        /// Short name of the payload variant.
        pub fn type_name(&self) -> &'static str {
            match self {
                Payload::AuditInfo(_) => "audit_info",
                Payload::Metalake(_) => "metalake",
                Payload::Catalog(_) => "catalog",
                Payload::Schema(_) => "schema",
                Payload::Table(_) => "table",
            }
        }
    }
}

impl Properties {
    /// Build a property message from entries already in key order.
    pub fn from_sorted<'a>(entries: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, value)| PropertyEntry {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect(),
        }
    }
}
