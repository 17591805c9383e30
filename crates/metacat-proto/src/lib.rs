//! Metacat wire protocol types.
//!
//! This crate defines the protobuf messages that catalog entities are encoded
//! into. The messages are declared with `prost` derives, so no `.proto`
//! compilation step is needed.
//!
//! # Modules
//!
//! - [`messages`] - Entity messages and the [`EntityEnvelope`]
//! - [`envelope`] - Size-limited envelope encoding/decoding
//! - [`error`] - Wire-level error types
//!
//! # Wire format guarantees
//!
//! - Optional fields are omitted when unset and decode back to `None`
//! - Field numbers are never reused
//! - Encoding is deterministic for a given message value

pub mod envelope;
pub mod error;
pub mod messages;

pub use envelope::{decode_envelope, encode_envelope, MAX_ENTITY_SIZE};
pub use error::Error;
pub use messages::{
    entity_envelope::Payload, AuditInfo, Catalog, CatalogType, EntityEnvelope, Metalake,
    Properties, PropertyEntry, Schema, SchemaVersion, Table, Timestamp,
};
