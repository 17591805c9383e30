//! Catalog operations: the provider contract, lifecycle management and the
//! built-in providers.
//!
//! A [`CatalogEntity`](crate::meta::CatalogEntity) names a provider. The
//! [`ProviderRegistry`] turns that name into a fresh [`CatalogOperations`]
//! instance, and a [`ManagedCatalog`] drives it through its lifecycle.

mod change;
mod id;
mod kv;
mod managed;
mod memory;
mod operations;
mod provider;

pub use change::{SchemaChange, TableChange};
pub use id::{IdGenerator, SequenceIdGenerator};
pub use kv::{KvCatalog, KvConfig, KV_ENTITY_SERDE_KEY, KV_PATH_KEY, KV_PROVIDER, KV_TEMPORARY_KEY};
pub use managed::{LifecycleState, ManagedCatalog};
pub use memory::{MemoryCatalog, MEMORY_PROVIDER};
pub use operations::{CatalogOperations, SupportsSchemas, TableCatalog};
pub use provider::{ProviderFactory, ProviderRegistry};
