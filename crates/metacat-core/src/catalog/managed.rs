//! Lifecycle enforcement around a provider instance.

use super::change::{SchemaChange, TableChange};
use super::operations::{CatalogOperations, SupportsSchemas, TableCatalog};
use super::provider::ProviderRegistry;
use crate::error::{Error, Result};
use crate::meta::{CatalogEntity, NameIdentifier, Namespace, SchemaEntity, TableEntity};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{info, warn};

/// Where a managed catalog is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Created, `initialize` not yet called.
    #[default]
    Uninitialized,
    /// Ready for capability operations.
    Initialized,
    /// `initialize` failed. Only `close` is allowed.
    Failed,
    /// Closed. Terminal.
    Closed,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::Initialized => "initialized",
            LifecycleState::Failed => "failed",
            LifecycleState::Closed => "closed",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fail with a state error naming `operation` unless `state` is `Initialized`.
pub(crate) fn require_initialized(state: LifecycleState, operation: &'static str) -> Result<()> {
    if state != LifecycleState::Initialized {
        return Err(Error::State { operation, state });
    }
    Ok(())
}

/// A provider instance driven through `Uninitialized -> Initialized -> Closed`.
///
/// Capability operations are rejected with a state error unless the catalog
/// is initialized, and with an unsupported error when the provider lacks the
/// capability. Dropping a managed catalog closes it.
pub struct ManagedCatalog {
    name: String,
    ops: Box<dyn CatalogOperations>,
    state: LifecycleState,
}

impl ManagedCatalog {
    /// Wrap an uninitialized provider instance.
    pub fn new(name: impl Into<String>, ops: Box<dyn CatalogOperations>) -> Self {
        Self {
            name: name.into(),
            ops,
            state: LifecycleState::Uninitialized,
        }
    }

    /// Instantiate the provider named by `entity`.
    pub fn for_entity(entity: &CatalogEntity, providers: &ProviderRegistry) -> Result<Self> {
        let ops = providers.create(entity.provider())?;
        Ok(Self::new(entity.name(), ops))
    }

    /// Catalog name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provider(&self) -> &str {
        self.ops.provider()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn supports_schemas(&self) -> bool {
        self.ops.as_schemas().is_some()
    }

    pub fn supports_tables(&self) -> bool {
        self.ops.as_tables().is_some()
    }

    /// Open the provider's backend session.
    ///
    /// Valid only once, from `Uninitialized`. On failure the catalog becomes
    /// `Failed` and the provider's error is returned.
    pub fn initialize(&mut self, config: &HashMap<String, String>) -> Result<()> {
        if self.state != LifecycleState::Uninitialized {
            return Err(Error::State {
                operation: "initialize",
                state: self.state,
            });
        }

        match self.ops.initialize(config) {
            Ok(()) => {
                self.state = LifecycleState::Initialized;
                info!(catalog = %self.name, provider = self.ops.provider(), "catalog initialized");
                Ok(())
            }
            Err(e) => {
                self.state = LifecycleState::Failed;
                warn!(
                    catalog = %self.name,
                    provider = self.ops.provider(),
                    error = %e,
                    "catalog initialization failed"
                );
                Err(e)
            }
        }
    }

    /// Close the catalog. Idempotent.
    ///
    /// A provider close failure is logged; the catalog is closed regardless.
    pub fn close(&mut self) {
        match self.state {
            LifecycleState::Closed => return,
            LifecycleState::Uninitialized => {}
            LifecycleState::Initialized | LifecycleState::Failed => {
                if let Err(e) = self.ops.close() {
                    warn!(
                        catalog = %self.name,
                        provider = self.ops.provider(),
                        error = %e,
                        "provider close failed"
                    );
                }
            }
        }
        self.state = LifecycleState::Closed;
        info!(catalog = %self.name, provider = self.ops.provider(), "catalog closed");
    }

    fn schemas(&self, operation: &'static str) -> Result<&dyn SupportsSchemas> {
        require_initialized(self.state, operation)?;
        self.ops.as_schemas().ok_or_else(|| Error::Unsupported {
            provider: self.ops.provider().to_string(),
            capability: "schemas",
        })
    }

    fn tables(&self, operation: &'static str) -> Result<&dyn TableCatalog> {
        require_initialized(self.state, operation)?;
        self.ops.as_tables().ok_or_else(|| Error::Unsupported {
            provider: self.ops.provider().to_string(),
            capability: "tables",
        })
    }

    pub fn list_schemas(&self, namespace: &Namespace) -> Result<Vec<NameIdentifier>> {
        self.schemas("list_schemas")?.list_schemas(namespace)
    }

    pub fn create_schema(
        &self,
        ident: &NameIdentifier,
        comment: Option<&str>,
        properties: Option<BTreeMap<String, String>>,
    ) -> Result<SchemaEntity> {
        self.schemas("create_schema")?
            .create_schema(ident, comment, properties)
    }

    pub fn load_schema(&self, ident: &NameIdentifier) -> Result<SchemaEntity> {
        self.schemas("load_schema")?.load_schema(ident)
    }

    pub fn schema_exists(&self, ident: &NameIdentifier) -> Result<bool> {
        self.schemas("schema_exists")?.schema_exists(ident)
    }

    pub fn alter_schema(
        &self,
        ident: &NameIdentifier,
        changes: &[SchemaChange],
    ) -> Result<SchemaEntity> {
        self.schemas("alter_schema")?.alter_schema(ident, changes)
    }

    pub fn drop_schema(&self, ident: &NameIdentifier, cascade: bool) -> Result<bool> {
        self.schemas("drop_schema")?.drop_schema(ident, cascade)
    }

    pub fn list_tables(&self, namespace: &Namespace) -> Result<Vec<NameIdentifier>> {
        self.tables("list_tables")?.list_tables(namespace)
    }

    pub fn create_table(
        &self,
        ident: &NameIdentifier,
        comment: Option<&str>,
        properties: Option<BTreeMap<String, String>>,
    ) -> Result<TableEntity> {
        self.tables("create_table")?
            .create_table(ident, comment, properties)
    }

    pub fn load_table(&self, ident: &NameIdentifier) -> Result<TableEntity> {
        self.tables("load_table")?.load_table(ident)
    }

    pub fn table_exists(&self, ident: &NameIdentifier) -> Result<bool> {
        self.tables("table_exists")?.table_exists(ident)
    }

    pub fn alter_table(&self, ident: &NameIdentifier, changes: &[TableChange]) -> Result<TableEntity> {
        self.tables("alter_table")?.alter_table(ident, changes)
    }

    pub fn drop_table(&self, ident: &NameIdentifier) -> Result<bool> {
        self.tables("drop_table")?.drop_table(ident)
    }
}

impl Drop for ManagedCatalog {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for ManagedCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedCatalog")
            .field("name", &self.name)
            .field("provider", &self.ops.provider())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Provider that counts close calls and can be told to fail.
    struct Scripted {
        closes: Arc<AtomicUsize>,
        fail_init: bool,
        fail_close: bool,
    }

    impl CatalogOperations for Scripted {
        fn provider(&self) -> &str {
            "scripted"
        }

        fn initialize(&mut self, _config: &HashMap<String, String>) -> Result<()> {
            if self.fail_init {
                return Err(Error::backend("scripted", "connection refused"));
            }
            Ok(())
        }

        fn close(&mut self) -> Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            if self.fail_close {
                return Err(Error::backend("scripted", "close failed"));
            }
            Ok(())
        }
    }

    fn scripted(fail_init: bool, fail_close: bool) -> (ManagedCatalog, Arc<AtomicUsize>) {
        let closes = Arc::new(AtomicUsize::new(0));
        let ops = Scripted {
            closes: Arc::clone(&closes),
            fail_init,
            fail_close,
        };
        (ManagedCatalog::new("scripted_catalog", Box::new(ops)), closes)
    }

    #[test]
    fn test_state_display() {
        assert_eq!(LifecycleState::Uninitialized.to_string(), "uninitialized");
        assert_eq!(LifecycleState::Failed.to_string(), "failed");
    }

    #[test]
    fn test_close_is_idempotent() {
        let (mut catalog, closes) = scripted(false, false);
        catalog.initialize(&HashMap::new()).unwrap();
        catalog.close();
        catalog.close();
        drop(catalog);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_close_without_initialize() {
        let (mut catalog, closes) = scripted(false, false);
        catalog.close();
        assert_eq!(catalog.state(), LifecycleState::Closed);
        assert_eq!(closes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failed_initialize() {
        let (mut catalog, closes) = scripted(true, false);
        let err = catalog.initialize(&HashMap::new()).unwrap_err();
        assert!(matches!(err, Error::Backend { .. }));
        assert_eq!(catalog.state(), LifecycleState::Failed);

        let err = catalog.initialize(&HashMap::new()).unwrap_err();
        assert!(err.is_state());

        catalog.close();
        assert_eq!(catalog.state(), LifecycleState::Closed);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_close_failure_still_closes() {
        let (mut catalog, _) = scripted(false, true);
        catalog.initialize(&HashMap::new()).unwrap();
        catalog.close();
        assert_eq!(catalog.state(), LifecycleState::Closed);
    }

    #[test]
    fn test_missing_capability() {
        let (mut catalog, _) = scripted(false, false);
        catalog.initialize(&HashMap::new()).unwrap();
        assert!(!catalog.supports_schemas());

        let ns = Namespace::of(["lake", "scripted"]).unwrap();
        let err = catalog.list_schemas(&ns).unwrap_err();
        assert!(matches!(
            err,
            Error::Unsupported {
                capability: "schemas",
                ..
            }
        ));
    }

    #[test]
    fn test_operation_named_in_state_error() {
        let catalog = ManagedCatalog::new("mem", Box::new(MemoryCatalog::new()));
        let ident = NameIdentifier::parse("lake.mem.sales.orders").unwrap();
        let err = catalog.drop_table(&ident).unwrap_err();
        assert_eq!(err.to_string(), "cannot drop_table: catalog is uninitialized");
    }
}
