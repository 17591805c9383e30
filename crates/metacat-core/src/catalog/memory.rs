//! In-process catalog provider.

use super::change::{apply_schema_changes, apply_table_changes, created, SchemaChange, TableChange};
use super::id::{IdGenerator, SequenceIdGenerator};
use super::managed::{require_initialized, LifecycleState};
use super::operations::{CatalogOperations, SupportsSchemas, TableCatalog};
use crate::error::{Error, Result};
use crate::meta::{
    EntityKind, NameIdentifier, Namespace, SchemaEntity, TableEntity, SCHEMA_NAMESPACE_LEVELS,
    TABLE_NAMESPACE_LEVELS,
};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Name the memory provider is registered under.
pub const MEMORY_PROVIDER: &str = "memory";

#[derive(Debug, Default)]
struct MemoryState {
    schemas: BTreeMap<String, SchemaEntity>,
    /// Keyed by (schema, table).
    tables: BTreeMap<(String, String), TableEntity>,
}

/// Catalog provider holding schemas and tables in ordered maps.
///
/// State lives only as long as the provider; `close` discards it. Operations
/// are rejected before `initialize` and after `close`.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    state: RwLock<MemoryState>,
    ids: SequenceIdGenerator,
    lifecycle: LifecycleState,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn ready(&self, operation: &'static str) -> Result<()> {
        require_initialized(self.lifecycle, operation)
    }
}

fn schema_name(ident: &NameIdentifier) -> Result<String> {
    ident.namespace().check_levels(SCHEMA_NAMESPACE_LEVELS)?;
    Ok(ident.name().to_string())
}

/// Split a table identifier into (schema, table).
fn table_key(ident: &NameIdentifier) -> Result<(String, String)> {
    let ns = ident.namespace();
    ns.check_levels(TABLE_NAMESPACE_LEVELS)?;
    let schema = ns.last().unwrap_or_default().to_string();
    Ok((schema, ident.name().to_string()))
}

fn not_found(kind: EntityKind, ident: &NameIdentifier) -> Error {
    Error::NotFound {
        kind,
        name: ident.to_string(),
    }
}

fn already_exists(kind: EntityKind, ident: &NameIdentifier) -> Error {
    Error::AlreadyExists {
        kind,
        name: ident.to_string(),
    }
}

impl CatalogOperations for MemoryCatalog {
    fn provider(&self) -> &str {
        MEMORY_PROVIDER
    }

    fn initialize(&mut self, config: &HashMap<String, String>) -> Result<()> {
        if self.lifecycle != LifecycleState::Uninitialized {
            return Err(Error::State {
                operation: "initialize",
                state: self.lifecycle,
            });
        }
        debug!(keys = config.len(), "memory catalog ignores configuration");
        self.lifecycle = LifecycleState::Initialized;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let state = self.state.get_mut();
        state.schemas.clear();
        state.tables.clear();
        self.lifecycle = LifecycleState::Closed;
        Ok(())
    }

    fn as_schemas(&self) -> Option<&dyn SupportsSchemas> {
        Some(self)
    }

    fn as_tables(&self) -> Option<&dyn TableCatalog> {
        Some(self)
    }
}

impl SupportsSchemas for MemoryCatalog {
    fn list_schemas(&self, namespace: &Namespace) -> Result<Vec<NameIdentifier>> {
        self.ready("list_schemas")?;
        namespace.check_levels(SCHEMA_NAMESPACE_LEVELS)?;
        let state = self.state.read();
        state
            .schemas
            .keys()
            .map(|name| NameIdentifier::new(namespace.clone(), name.clone()))
            .collect()
    }

    fn create_schema(
        &self,
        ident: &NameIdentifier,
        comment: Option<&str>,
        properties: Option<BTreeMap<String, String>>,
    ) -> Result<SchemaEntity> {
        self.ready("create_schema")?;
        let name = schema_name(ident)?;
        let mut state = self.state.write();
        if state.schemas.contains_key(&name) {
            return Err(already_exists(EntityKind::Schema, ident));
        }

        let schema = SchemaEntity::builder()
            .with_id(self.ids.next_id()?)
            .with_name(name.clone())
            .with_optional_comment(comment.map(str::to_string))
            .with_optional_properties(properties)
            .with_audit_info(created(Utc::now()))
            .build()?;
        state.schemas.insert(name, schema.clone());
        Ok(schema)
    }

    fn load_schema(&self, ident: &NameIdentifier) -> Result<SchemaEntity> {
        self.ready("load_schema")?;
        let name = schema_name(ident)?;
        self.state
            .read()
            .schemas
            .get(&name)
            .cloned()
            .ok_or_else(|| not_found(EntityKind::Schema, ident))
    }

    fn alter_schema(
        &self,
        ident: &NameIdentifier,
        changes: &[SchemaChange],
    ) -> Result<SchemaEntity> {
        self.ready("alter_schema")?;
        let name = schema_name(ident)?;
        let mut state = self.state.write();
        let current = state
            .schemas
            .get(&name)
            .ok_or_else(|| not_found(EntityKind::Schema, ident))?;

        let altered = apply_schema_changes(current, changes, Utc::now())?;
        state.schemas.insert(name, altered.clone());
        Ok(altered)
    }

    fn drop_schema(&self, ident: &NameIdentifier, cascade: bool) -> Result<bool> {
        self.ready("drop_schema")?;
        let name = schema_name(ident)?;
        let mut state = self.state.write();
        if !state.schemas.contains_key(&name) {
            return Ok(false);
        }

        let has_tables = state.tables.keys().any(|(schema, _)| *schema == name);
        if has_tables && !cascade {
            return Err(Error::NonEmpty {
                kind: EntityKind::Schema,
                name: ident.to_string(),
            });
        }

        state.tables.retain(|(schema, _), _| *schema != name);
        state.schemas.remove(&name);
        Ok(true)
    }
}

impl TableCatalog for MemoryCatalog {
    fn list_tables(&self, namespace: &Namespace) -> Result<Vec<NameIdentifier>> {
        self.ready("list_tables")?;
        namespace.check_levels(TABLE_NAMESPACE_LEVELS)?;
        let schema = namespace.last().unwrap_or_default();
        let state = self.state.read();
        state
            .tables
            .keys()
            .filter(|(s, _)| s == schema)
            .map(|(_, table)| NameIdentifier::new(namespace.clone(), table.clone()))
            .collect()
    }

    fn create_table(
        &self,
        ident: &NameIdentifier,
        comment: Option<&str>,
        properties: Option<BTreeMap<String, String>>,
    ) -> Result<TableEntity> {
        self.ready("create_table")?;
        let key = table_key(ident)?;
        let mut state = self.state.write();
        if !state.schemas.contains_key(&key.0) {
            return Err(Error::NotFound {
                kind: EntityKind::Schema,
                name: ident.namespace().to_string(),
            });
        }
        if state.tables.contains_key(&key) {
            return Err(already_exists(EntityKind::Table, ident));
        }

        let table = TableEntity::builder()
            .with_id(self.ids.next_id()?)
            .with_name(key.1.clone())
            .with_optional_comment(comment.map(str::to_string))
            .with_optional_properties(properties)
            .with_audit_info(created(Utc::now()))
            .build()?;
        state.tables.insert(key, table.clone());
        Ok(table)
    }

    fn load_table(&self, ident: &NameIdentifier) -> Result<TableEntity> {
        self.ready("load_table")?;
        let key = table_key(ident)?;
        self.state
            .read()
            .tables
            .get(&key)
            .cloned()
            .ok_or_else(|| not_found(EntityKind::Table, ident))
    }

    fn alter_table(&self, ident: &NameIdentifier, changes: &[TableChange]) -> Result<TableEntity> {
        self.ready("alter_table")?;
        let key = table_key(ident)?;
        let mut state = self.state.write();
        let current = state
            .tables
            .get(&key)
            .ok_or_else(|| not_found(EntityKind::Table, ident))?;

        let altered = apply_table_changes(current, changes, Utc::now())?;
        let new_key = (key.0.clone(), altered.name().to_string());
        if new_key != key {
            if state.tables.contains_key(&new_key) {
                return Err(already_exists(
                    EntityKind::Table,
                    &ident.with_name(altered.name())?,
                ));
            }
            state.tables.remove(&key);
        }
        state.tables.insert(new_key, altered.clone());
        Ok(altered)
    }

    fn drop_table(&self, ident: &NameIdentifier) -> Result<bool> {
        self.ready("drop_table")?;
        let key = table_key(ident)?;
        Ok(self.state.write().tables.remove(&key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(s: &str) -> NameIdentifier {
        NameIdentifier::parse(s).unwrap()
    }

    #[test]
    fn test_operations_before_initialize() {
        let catalog = MemoryCatalog::new();
        let err = catalog
            .create_schema(&ident("lake.mem.sales"), None, None)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::State {
                operation: "create_schema",
                state: LifecycleState::Uninitialized
            }
        ));
    }

    #[test]
    fn test_operations_after_close() {
        let mut catalog = MemoryCatalog::new();
        catalog.initialize(&HashMap::new()).unwrap();
        catalog
            .create_schema(&ident("lake.mem.sales"), None, None)
            .unwrap();
        catalog.close().unwrap();

        let err = catalog.load_schema(&ident("lake.mem.sales")).unwrap_err();
        assert_eq!(err.to_string(), "cannot load_schema: catalog is closed");
        let err = catalog
            .list_tables(&Namespace::of(["lake", "mem", "sales"]).unwrap())
            .unwrap_err();
        assert!(err.is_state());
        assert!(catalog.initialize(&HashMap::new()).unwrap_err().is_state());
    }

    #[test]
    fn test_initialize_twice_rejected() {
        let mut catalog = MemoryCatalog::new();
        catalog.initialize(&HashMap::new()).unwrap();
        let err = catalog.initialize(&HashMap::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::State {
                operation: "initialize",
                state: LifecycleState::Initialized
            }
        ));
    }
}
