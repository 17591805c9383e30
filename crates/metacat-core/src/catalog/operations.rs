//! Provider capability traits.

use super::change::{SchemaChange, TableChange};
use crate::error::{Error, Result};
use crate::meta::{NameIdentifier, Namespace, SchemaEntity, TableEntity};
use std::collections::{BTreeMap, HashMap};

/// Lifecycle contract every catalog provider implements.
///
/// Schema and table operations are optional capabilities discovered through
/// [`as_schemas`](CatalogOperations::as_schemas) and
/// [`as_tables`](CatalogOperations::as_tables). Callers normally drive a
/// provider through [`ManagedCatalog`](super::ManagedCatalog), which enforces
/// the lifecycle.
pub trait CatalogOperations: Send + Sync {
    /// Name the provider is registered under.
    fn provider(&self) -> &str;

    /// Open the backend session. The configuration map is passed through
    /// from the catalog unmodified.
    fn initialize(&mut self, config: &HashMap<String, String>) -> Result<()>;

    /// Release the backend session.
    fn close(&mut self) -> Result<()>;

    fn as_schemas(&self) -> Option<&dyn SupportsSchemas> {
        None
    }

    fn as_tables(&self) -> Option<&dyn TableCatalog> {
        None
    }
}

/// Schema operations. Schema identifiers live under a
/// `[metalake, catalog]` namespace.
pub trait SupportsSchemas: Send + Sync {
    /// Identifiers of all schemas under `namespace`, ordered by name.
    fn list_schemas(&self, namespace: &Namespace) -> Result<Vec<NameIdentifier>>;

    /// Create a schema. Fails with `AlreadyExists` if the name is taken.
    fn create_schema(
        &self,
        ident: &NameIdentifier,
        comment: Option<&str>,
        properties: Option<BTreeMap<String, String>>,
    ) -> Result<SchemaEntity>;

    /// Load a schema. Fails with `NotFound` if it does not exist.
    fn load_schema(&self, ident: &NameIdentifier) -> Result<SchemaEntity>;

    fn schema_exists(&self, ident: &NameIdentifier) -> Result<bool> {
        match self.load_schema(ident) {
            Ok(_) => Ok(true),
            Err(Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Apply `changes` in order and return the altered schema.
    fn alter_schema(&self, ident: &NameIdentifier, changes: &[SchemaChange])
        -> Result<SchemaEntity>;

    /// Drop a schema. Returns `false` if it did not exist. Without `cascade`
    /// a schema that still holds tables is not dropped.
    fn drop_schema(&self, ident: &NameIdentifier, cascade: bool) -> Result<bool>;
}

/// Table operations. Table identifiers live under a
/// `[metalake, catalog, schema]` namespace.
pub trait TableCatalog: Send + Sync {
    fn list_tables(&self, namespace: &Namespace) -> Result<Vec<NameIdentifier>>;

    /// Create a table. The parent schema must exist.
    fn create_table(
        &self,
        ident: &NameIdentifier,
        comment: Option<&str>,
        properties: Option<BTreeMap<String, String>>,
    ) -> Result<TableEntity>;

    fn load_table(&self, ident: &NameIdentifier) -> Result<TableEntity>;

    fn table_exists(&self, ident: &NameIdentifier) -> Result<bool> {
        match self.load_table(ident) {
            Ok(_) => Ok(true),
            Err(Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn alter_table(&self, ident: &NameIdentifier, changes: &[TableChange]) -> Result<TableEntity>;

    /// Drop a table. Returns `false` if it did not exist.
    fn drop_table(&self, ident: &NameIdentifier) -> Result<bool>;
}
