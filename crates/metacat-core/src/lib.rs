//! metacat core - entity model, entity codecs and catalog operations.
//!
//! This crate provides the metadata core of metacat: immutable catalog
//! entities, pluggable binary codecs for storing them, and the lifecycle and
//! capability contract that catalog providers implement.

pub mod catalog;
pub mod codec;
pub mod config;
pub mod error;
pub mod meta;

pub use catalog::{
    CatalogOperations, IdGenerator, KvCatalog, KvConfig, LifecycleState, ManagedCatalog,
    MemoryCatalog, ProviderRegistry, SchemaChange, SequenceIdGenerator, SupportsSchemas,
    TableCatalog, TableChange,
};
pub use codec::{ArchiveEntitySerDe, EntitySerDe, EntitySerDeExt, ProtoEntitySerDe, SerDeRegistry};
pub use config::CoreConfig;
pub use error::{Error, Result};
pub use meta::{
    AuditInfo, Auditable, CatalogEntity, CatalogType, Entity, EntityKind, HasIdentifier,
    HasProperties, Metalake, NameIdentifier, Namespace, SchemaEntity, SchemaVersion, TableEntity,
};

/// Re-export wire message types.
pub use metacat_proto as proto;
