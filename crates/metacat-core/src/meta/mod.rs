//! Entity model for metacat.
//!
//! Entities are immutable value objects: metalakes contain catalogs, catalogs
//! contain schemas, schemas contain tables. Each is built through a builder
//! whose `build()` validates required fields.

mod audit;
mod catalog;
mod entity;
mod metalake;
mod name;
mod schema;
mod table;
mod version;

pub use audit::AuditInfo;
pub use catalog::{CatalogEntity, CatalogEntityBuilder, CatalogType};
pub use entity::{Auditable, Entity, EntityKind, HasIdentifier, HasProperties, TypedEntity};
pub use metalake::{Metalake, MetalakeBuilder};
pub(crate) use name::check_name_part;
pub use name::{NameIdentifier, Namespace, SCHEMA_NAMESPACE_LEVELS, TABLE_NAMESPACE_LEVELS};
pub use schema::{SchemaEntity, SchemaEntityBuilder};
pub use table::{TableEntity, TableEntityBuilder};
pub use version::SchemaVersion;

use crate::error::{Error, Result};

fn require<T>(value: Option<T>, kind: EntityKind, field: &'static str) -> Result<T> {
    value.ok_or(Error::Validation { kind, field })
}

fn require_name(name: Option<String>, kind: EntityKind) -> Result<String> {
    match name {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(Error::Validation {
            kind,
            field: "name",
        }),
    }
}
