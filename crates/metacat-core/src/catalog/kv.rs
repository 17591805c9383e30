//! Catalog provider backed by a sled tree.
//!
//! Schemas and tables are stored as encoded entities under
//! `schema/<name>` and `table/<schema>/<name>`. The codec is chosen from the
//! shared [`SerDeRegistry`] at initialize time.

use super::change::{apply_schema_changes, apply_table_changes, created, SchemaChange, TableChange};
use super::id::IdGenerator;
use super::managed::{require_initialized, LifecycleState};
use super::operations::{CatalogOperations, SupportsSchemas, TableCatalog};
use crate::codec::{EntitySerDe, EntitySerDeExt, SerDeRegistry};
use crate::config::DEFAULT_ENTITY_SERDE;
use crate::error::{Error, Result};
use crate::meta::{
    EntityKind, NameIdentifier, Namespace, SchemaEntity, TableEntity, SCHEMA_NAMESPACE_LEVELS,
    TABLE_NAMESPACE_LEVELS,
};
use chrono::Utc;
use parking_lot::Mutex;
use sled::{Db, Tree};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Name the kv provider is registered under.
pub const KV_PROVIDER: &str = "kv";

/// Directory of the store.
pub const KV_PATH_KEY: &str = "kv.path";

/// Use a temporary store removed on close.
pub const KV_TEMPORARY_KEY: &str = "kv.temporary";

/// Codec used for stored entities.
pub const KV_ENTITY_SERDE_KEY: &str = "kv.entity-serde";

/// Tree holding catalog entries.
const ENTITY_TREE: &str = "catalog:entities";

const SCHEMA_PREFIX: &str = "schema/";
const TABLE_PREFIX: &str = "table/";

/// Configuration of the kv provider, read from the initialize map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvConfig {
    /// Store directory. Required unless `temporary` is set.
    pub path: Option<PathBuf>,

    /// Temporary store (deleted on drop).
    pub temporary: bool,

    /// Codec format for stored entities.
    pub entity_serde: String,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            path: None,
            temporary: false,
            entity_serde: DEFAULT_ENTITY_SERDE.to_string(),
        }
    }
}

impl KvConfig {
    /// Create a configuration for a store at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Create a temporary configuration for testing.
    pub fn temporary() -> Self {
        Self {
            temporary: true,
            ..Default::default()
        }
    }

    pub fn with_entity_serde(mut self, format: impl Into<String>) -> Self {
        self.entity_serde = format.into();
        self
    }

    /// Parse the provider keys out of a catalog configuration map.
    pub fn from_map(config: &HashMap<String, String>) -> Result<Self> {
        let mut kv = Self::default();

        if let Some(value) = config.get(KV_TEMPORARY_KEY) {
            kv.temporary = value.trim().parse().map_err(|_| {
                Error::Config(format!(
                    "`{}` must be `true` or `false`, got `{}`",
                    KV_TEMPORARY_KEY, value
                ))
            })?;
        }
        if let Some(path) = config.get(KV_PATH_KEY) {
            if !path.trim().is_empty() {
                kv.path = Some(PathBuf::from(path.trim()));
            }
        }
        if let Some(format) = config.get(KV_ENTITY_SERDE_KEY) {
            kv.entity_serde = format.trim().to_string();
        }

        if kv.path.is_none() && !kv.temporary {
            return Err(Error::Config(format!(
                "`{}` is required unless `{}` is true",
                KV_PATH_KEY, KV_TEMPORARY_KEY
            )));
        }
        Ok(kv)
    }

    /// Convert to sled configuration.
    pub(crate) fn to_sled_config(&self) -> sled::Config {
        let config = sled::Config::new().use_compression(true);
        match (&self.path, self.temporary) {
            (_, true) => config.temporary(true),
            (Some(path), false) => config.path(path),
            (None, false) => config,
        }
    }
}

/// An open store.
struct KvSession {
    db: Db,
    tree: Tree,
    serde: Arc<dyn EntitySerDe>,
    /// Serializes writers, so read-modify-write sequences do not interleave.
    write_lock: Mutex<()>,
}

/// Catalog provider persisting entities in sled.
///
/// Operations are rejected before `initialize` and after `close`.
pub struct KvCatalog {
    serdes: Arc<SerDeRegistry>,
    session: Option<KvSession>,
    lifecycle: LifecycleState,
}

impl KvCatalog {
    pub fn new(serdes: Arc<SerDeRegistry>) -> Self {
        Self {
            serdes,
            session: None,
            lifecycle: LifecycleState::Uninitialized,
        }
    }

    fn session(&self, operation: &'static str) -> Result<&KvSession> {
        require_initialized(self.lifecycle, operation)?;
        self.session.as_ref().ok_or(Error::State {
            operation,
            state: self.lifecycle,
        })
    }

    fn open(&self, config: &HashMap<String, String>) -> Result<KvSession> {
        let kv = KvConfig::from_map(config)?;
        let serde = self.serdes.create_entity_serde(&kv.entity_serde)?;

        let db = kv
            .to_sled_config()
            .open()
            .map_err(|e| Error::backend(KV_PROVIDER, format!("failed to open store: {}", e)))?;
        let tree = db.open_tree(ENTITY_TREE)?;

        info!(
            path = ?kv.path,
            temporary = kv.temporary,
            format = serde.format(),
            "opened kv catalog store"
        );
        Ok(KvSession {
            db,
            tree,
            serde,
            write_lock: Mutex::new(()),
        })
    }
}

fn schema_key(schema: &str) -> Vec<u8> {
    format!("{}{}", SCHEMA_PREFIX, schema).into_bytes()
}

fn table_prefix(schema: &str) -> Vec<u8> {
    format!("{}{}/", TABLE_PREFIX, schema).into_bytes()
}

fn table_key(schema: &str, table: &str) -> Vec<u8> {
    format!("{}{}/{}", TABLE_PREFIX, schema, table).into_bytes()
}

fn schema_name(ident: &NameIdentifier) -> Result<&str> {
    ident.namespace().check_levels(SCHEMA_NAMESPACE_LEVELS)?;
    Ok(ident.name())
}

/// Split a table identifier into (schema, table).
fn table_parts(ident: &NameIdentifier) -> Result<(&str, &str)> {
    let ns = ident.namespace();
    ns.check_levels(TABLE_NAMESPACE_LEVELS)?;
    Ok((ns.last().unwrap_or_default(), ident.name()))
}

/// Name component after the last `/` of a stored key.
fn key_name(key: &[u8]) -> Result<String> {
    let key = std::str::from_utf8(key)
        .map_err(|e| Error::backend(KV_PROVIDER, format!("invalid key: {}", e)))?;
    Ok(key.rsplit('/').next().unwrap_or(key).to_string())
}

impl KvSession {
    fn insert_new(&self, key: &[u8], bytes: Vec<u8>) -> Result<bool> {
        let swapped = self
            .tree
            .compare_and_swap(key, None as Option<&[u8]>, Some(bytes))?;
        Ok(swapped.is_ok())
    }

    fn load<T: crate::meta::TypedEntity>(&self, key: &[u8]) -> Result<Option<T>> {
        match self.tree.get(key)? {
            Some(bytes) => Ok(Some(self.serde.deserialize_entity(&bytes)?)),
            None => Ok(None),
        }
    }

    fn has_prefix(&self, prefix: &[u8]) -> Result<bool> {
        Ok(self.tree.scan_prefix(prefix).next().transpose()?.is_some())
    }
}

impl CatalogOperations for KvCatalog {
    fn provider(&self) -> &str {
        KV_PROVIDER
    }

    fn initialize(&mut self, config: &HashMap<String, String>) -> Result<()> {
        if self.lifecycle != LifecycleState::Uninitialized {
            return Err(Error::State {
                operation: "initialize",
                state: self.lifecycle,
            });
        }

        match self.open(config) {
            Ok(session) => {
                self.session = Some(session);
                self.lifecycle = LifecycleState::Initialized;
                Ok(())
            }
            Err(e) => {
                self.lifecycle = LifecycleState::Failed;
                Err(e)
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.lifecycle = LifecycleState::Closed;
        if let Some(session) = self.session.take() {
            session.tree.flush()?;
            session.db.flush()?;
            debug!("flushed kv catalog store");
        }
        Ok(())
    }

    fn as_schemas(&self) -> Option<&dyn SupportsSchemas> {
        Some(self)
    }

    fn as_tables(&self) -> Option<&dyn TableCatalog> {
        Some(self)
    }
}

impl SupportsSchemas for KvCatalog {
    fn list_schemas(&self, namespace: &Namespace) -> Result<Vec<NameIdentifier>> {
        namespace.check_levels(SCHEMA_NAMESPACE_LEVELS)?;
        let session = self.session("list_schemas")?;

        let mut idents = Vec::new();
        for item in session.tree.scan_prefix(SCHEMA_PREFIX) {
            let (key, _) = item?;
            idents.push(NameIdentifier::new(namespace.clone(), key_name(&key)?)?);
        }
        Ok(idents)
    }

    fn create_schema(
        &self,
        ident: &NameIdentifier,
        comment: Option<&str>,
        properties: Option<BTreeMap<String, String>>,
    ) -> Result<SchemaEntity> {
        let name = schema_name(ident)?;
        let session = self.session("create_schema")?;
        let _guard = session.write_lock.lock();

        let schema = SchemaEntity::builder()
            .with_id(session.db.next_id()?)
            .with_name(name)
            .with_optional_comment(comment.map(str::to_string))
            .with_optional_properties(properties)
            .with_audit_info(created(Utc::now()))
            .build()?;

        let bytes = session.serde.serialize_entity(&schema)?;
        if !session.insert_new(&schema_key(name), bytes)? {
            return Err(Error::AlreadyExists {
                kind: EntityKind::Schema,
                name: ident.to_string(),
            });
        }
        debug!(schema = name, id = schema.id(), "created schema");
        Ok(schema)
    }

    fn load_schema(&self, ident: &NameIdentifier) -> Result<SchemaEntity> {
        let name = schema_name(ident)?;
        self.session("load_schema")?
            .load(&schema_key(name))?
            .ok_or_else(|| Error::NotFound {
                kind: EntityKind::Schema,
                name: ident.to_string(),
            })
    }

    fn alter_schema(
        &self,
        ident: &NameIdentifier,
        changes: &[SchemaChange],
    ) -> Result<SchemaEntity> {
        let name = schema_name(ident)?;
        let session = self.session("alter_schema")?;
        let _guard = session.write_lock.lock();
        let current: SchemaEntity =
            session
                .load(&schema_key(name))?
                .ok_or_else(|| Error::NotFound {
                    kind: EntityKind::Schema,
                    name: ident.to_string(),
                })?;

        let altered = apply_schema_changes(&current, changes, Utc::now())?;
        let bytes = session.serde.serialize_entity(&altered)?;
        session.tree.insert(schema_key(name), bytes)?;
        Ok(altered)
    }

    fn drop_schema(&self, ident: &NameIdentifier, cascade: bool) -> Result<bool> {
        let name = schema_name(ident)?;
        let session = self.session("drop_schema")?;
        let _guard = session.write_lock.lock();
        if !session.tree.contains_key(schema_key(name))? {
            return Ok(false);
        }

        let prefix = table_prefix(name);
        if !cascade && session.has_prefix(&prefix)? {
            return Err(Error::NonEmpty {
                kind: EntityKind::Schema,
                name: ident.to_string(),
            });
        }

        let mut batch = sled::Batch::default();
        for item in session.tree.scan_prefix(&prefix) {
            let (key, _) = item?;
            batch.remove(key);
        }
        batch.remove(schema_key(name));
        session.tree.apply_batch(batch)?;
        Ok(true)
    }
}

impl TableCatalog for KvCatalog {
    fn list_tables(&self, namespace: &Namespace) -> Result<Vec<NameIdentifier>> {
        namespace.check_levels(TABLE_NAMESPACE_LEVELS)?;
        let schema = namespace.last().unwrap_or_default();
        let session = self.session("list_tables")?;

        let mut idents = Vec::new();
        for item in session.tree.scan_prefix(table_prefix(schema)) {
            let (key, _) = item?;
            idents.push(NameIdentifier::new(namespace.clone(), key_name(&key)?)?);
        }
        Ok(idents)
    }

    fn create_table(
        &self,
        ident: &NameIdentifier,
        comment: Option<&str>,
        properties: Option<BTreeMap<String, String>>,
    ) -> Result<TableEntity> {
        let (schema, name) = table_parts(ident)?;
        let session = self.session("create_table")?;
        let _guard = session.write_lock.lock();
        if !session.tree.contains_key(schema_key(schema))? {
            return Err(Error::NotFound {
                kind: EntityKind::Schema,
                name: ident.namespace().to_string(),
            });
        }

        let table = TableEntity::builder()
            .with_id(session.db.next_id()?)
            .with_name(name)
            .with_optional_comment(comment.map(str::to_string))
            .with_optional_properties(properties)
            .with_audit_info(created(Utc::now()))
            .build()?;

        let bytes = session.serde.serialize_entity(&table)?;
        if !session.insert_new(&table_key(schema, name), bytes)? {
            return Err(Error::AlreadyExists {
                kind: EntityKind::Table,
                name: ident.to_string(),
            });
        }
        debug!(schema, table = name, id = table.id(), "created table");
        Ok(table)
    }

    fn load_table(&self, ident: &NameIdentifier) -> Result<TableEntity> {
        let (schema, name) = table_parts(ident)?;
        self.session("load_table")?
            .load(&table_key(schema, name))?
            .ok_or_else(|| Error::NotFound {
                kind: EntityKind::Table,
                name: ident.to_string(),
            })
    }

    fn alter_table(&self, ident: &NameIdentifier, changes: &[TableChange]) -> Result<TableEntity> {
        let (schema, name) = table_parts(ident)?;
        let session = self.session("alter_table")?;
        let _guard = session.write_lock.lock();
        let key = table_key(schema, name);
        let current: TableEntity = session.load(&key)?.ok_or_else(|| Error::NotFound {
            kind: EntityKind::Table,
            name: ident.to_string(),
        })?;

        let altered = apply_table_changes(&current, changes, Utc::now())?;
        let bytes = session.serde.serialize_entity(&altered)?;

        let new_key = table_key(schema, altered.name());
        if new_key == key {
            session.tree.insert(key, bytes)?;
        } else {
            if session.tree.contains_key(&new_key)? {
                return Err(Error::AlreadyExists {
                    kind: EntityKind::Table,
                    name: ident.with_name(altered.name())?.to_string(),
                });
            }
            // Applied atomically: the table is visible under exactly one name.
            let mut batch = sled::Batch::default();
            batch.insert(new_key, bytes);
            batch.remove(key);
            session.tree.apply_batch(batch)?;
            debug!(schema, from = name, to = altered.name(), "renamed table");
        }
        Ok(altered)
    }

    fn drop_table(&self, ident: &NameIdentifier) -> Result<bool> {
        let (schema, name) = table_parts(ident)?;
        let session = self.session("drop_table")?;
        let _guard = session.write_lock.lock();
        Ok(session.tree.remove(table_key(schema, name))?.is_some())
    }
}
