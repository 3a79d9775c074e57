//! Shared tree store handle.
//!
//! This is the central component of the storage layer. It wraps one
//! `rusqlite::Connection` behind a mutex and runs every multi-step operation
//! as a single transaction while holding it, so a replace never interleaves
//! with another replace and a recursive delete never races an insert.

use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{Connection, TransactionBehavior};

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::schema;
use crate::storage::table::NodeTable;
use crate::storage::types::{NodeId, NodeName, StoreLocation};
use crate::tree::{assemble_forest, NewTreeItem, TreeItem, TreeNode};

/// The tree store.
///
/// Clone this to share across threads - it uses Arc internally.
#[derive(Clone)]
pub struct TreeStore {
    inner: Arc<TreeStoreInner>,
}

struct TreeStoreInner {
    conn: Mutex<Connection>,
    location: StoreLocation,
}

impl TreeStore {
    /// Open the store, creating the database and table if missing.
    pub fn open(location: StoreLocation) -> StorageResult<Self> {
        Self::open_with_reset(location, false)
    }

    /// Open the store. With `reset`, the table is dropped and recreated first.
    pub fn open_with_reset(location: StoreLocation, reset: bool) -> StorageResult<Self> {
        let conn = match &location {
            StoreLocation::Memory => Connection::open_in_memory()?,
            StoreLocation::File(path) => {
                if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                    std::fs::create_dir_all(dir)?;
                }
                Connection::open(path).map_err(|source| StorageError::Open {
                    path: path.clone(),
                    source,
                })?
            }
        };

        schema::configure(&conn, location.path().is_some())?;
        if reset {
            tracing::warn!(%location, "resetting tree_items schema");
            schema::reset(&conn)?;
        } else {
            schema::create(&conn)?;
        }

        Ok(Self {
            inner: Arc::new(TreeStoreInner {
                conn: Mutex::new(conn),
                location,
            }),
        })
    }

    /// Create a private in-memory store (for testing).
    pub fn in_memory() -> StorageResult<Self> {
        Self::open(StoreLocation::Memory)
    }

    pub fn location(&self) -> &StoreLocation {
        &self.inner.location
    }

    /// Execute a function with read access to the table.
    fn with_table<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&NodeTable<'_>) -> StorageResult<T>,
    {
        let conn = self.inner.conn.lock();
        f(&NodeTable::new(&conn))
    }

    /// Execute a function inside one transaction.
    ///
    /// If the function returns Ok, the transaction is committed; on Err it is
    /// rolled back when dropped.
    fn with_transaction<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&NodeTable<'_>) -> StorageResult<T>,
    {
        let mut conn = self.inner.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let result = f(&NodeTable::new(&tx))?;
        tx.commit()?;
        Ok(result)
    }

    // ==================== Primitives ====================

    /// Insert a single row and return its id.
    pub fn insert_node(
        &self,
        name: &NodeName,
        data: Option<&str>,
        parent: Option<NodeId>,
    ) -> StorageResult<NodeId> {
        self.with_table(|table| table.insert(name, data, parent))
    }

    /// Insert `item` and all its descendants under `parent`, pre-order.
    /// Returns the id assigned to `item`.
    pub fn insert_subtree(
        &self,
        item: &NewTreeItem,
        parent: Option<NodeId>,
    ) -> StorageResult<NodeId> {
        self.with_transaction(|table| table.insert_subtree(item, parent))
    }

    /// Delete every row. Returns how many were removed.
    pub fn clear_all(&self) -> StorageResult<usize> {
        self.with_table(|table| table.clear())
    }

    /// Ids of all root nodes, ascending.
    pub fn root_ids(&self) -> StorageResult<Vec<NodeId>> {
        self.with_table(|table| table.root_ids())
    }

    /// Ids of the direct children of `id`, ascending.
    pub fn child_ids(&self, id: NodeId) -> StorageResult<Vec<NodeId>> {
        self.with_table(|table| table.child_ids(id))
    }

    pub fn fetch_node(&self, id: NodeId) -> StorageResult<Option<TreeNode>> {
        self.with_table(|table| table.get(id))
    }

    /// Every row, ordered by id.
    pub fn fetch_all(&self) -> StorageResult<Vec<TreeNode>> {
        self.with_table(|table| table.all())
    }

    /// Overwrite the payload of `id`. Fails with `NodeNotFound` if missing.
    pub fn update_data(&self, id: NodeId, data: &str) -> StorageResult<()> {
        self.with_transaction(|table| table.set_data(id, data))
    }

    /// Delete `id` and all its descendants, children first.
    /// Fails with `NodeNotFound` if missing; returns the number of rows removed.
    pub fn delete_subtree(&self, id: NodeId) -> StorageResult<usize> {
        self.with_transaction(|table| table.delete_subtree(id))
    }

    // ==================== Tree Operations ====================

    /// Clear the table and insert `item` as the only tree.
    pub fn replace_tree(&self, item: &NewTreeItem) -> StorageResult<NodeId> {
        self.with_transaction(|table| {
            let removed = table.clear()?;
            let root = table.insert_subtree(item, None)?;
            tracing::debug!(removed, inserted = item.node_count(), %root, "tree replaced");
            Ok(root)
        })
    }

    /// Materialize the subtree rooted at `id`, one query per node.
    pub fn materialize_subtree(&self, id: NodeId) -> StorageResult<Option<TreeItem>> {
        self.with_table(|table| table.materialize(id))
    }

    /// Materialize every root from one bulk read.
    pub fn materialize_forest(&self) -> StorageResult<Vec<TreeItem>> {
        let rows = self.fetch_all()?;
        Ok(assemble_forest(rows))
    }
}

impl std::fmt::Debug for TreeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeStore")
            .field("location", &self.inner.location)
            .finish()
    }
}
