//! Row-level operations on `tree_items`.
//!
//! [`NodeTable`] borrows a connection (or a transaction, which derefs to one)
//! so the primitives compose inside a single transaction. It does no locking
//! of its own; [`crate::storage::TreeStore`] owns that.

use std::collections::HashSet;

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::{NodeId, NodeName};
use crate::tree::{NewTreeItem, TreeItem, TreeNode};

const SELECT_NODE: &str = "SELECT id, name, data, parent_id FROM tree_items WHERE id = ?1";
const SELECT_ALL: &str = "SELECT id, name, data, parent_id FROM tree_items ORDER BY id";
const SELECT_ROOT_IDS: &str = "SELECT id FROM tree_items WHERE parent_id IS NULL ORDER BY id";
const SELECT_CHILD_IDS: &str = "SELECT id FROM tree_items WHERE parent_id = ?1 ORDER BY id";

fn read_node(row: &Row<'_>) -> rusqlite::Result<TreeNode> {
    Ok(TreeNode {
        id: row.get(0)?,
        name: row.get(1)?,
        data: row.get(2)?,
        parent_id: row.get(3)?,
    })
}

/// Primitive and recursive operations over one connection.
pub(crate) struct NodeTable<'c> {
    conn: &'c Connection,
}

impl<'c> NodeTable<'c> {
    pub(crate) fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub(crate) fn exists(&self, id: NodeId) -> StorageResult<bool> {
        let found = self
            .conn
            .prepare_cached("SELECT 1 FROM tree_items WHERE id = ?1")?
            .query_row([id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn ensure_exists(&self, id: NodeId) -> StorageResult<()> {
        if self.exists(id)? {
            Ok(())
        } else {
            Err(StorageError::NodeNotFound(id))
        }
    }

    /// Insert one row. The parent, if any, must already exist.
    pub(crate) fn insert(
        &self,
        name: &NodeName,
        data: Option<&str>,
        parent: Option<NodeId>,
    ) -> StorageResult<NodeId> {
        if let Some(parent) = parent {
            if !self.exists(parent)? {
                return Err(StorageError::ParentNotFound(parent));
            }
        }
        self.conn
            .prepare_cached("INSERT INTO tree_items (name, data, parent_id) VALUES (?1, ?2, ?3)")?
            .execute(params![name.as_str(), data, parent])?;
        Ok(NodeId::new(self.conn.last_insert_rowid()))
    }

    /// Insert `item` and its descendants, parent before children.
    /// Returns the id assigned to `item`.
    pub(crate) fn insert_subtree(
        &self,
        item: &NewTreeItem,
        parent: Option<NodeId>,
    ) -> StorageResult<NodeId> {
        let id = self.insert(&item.name, item.data.as_deref(), parent)?;
        for child in item.children() {
            self.insert_subtree(child, Some(id))?;
        }
        Ok(id)
    }

    /// Delete every row. Returns the number of rows removed.
    pub(crate) fn clear(&self) -> StorageResult<usize> {
        Ok(self.conn.execute("DELETE FROM tree_items", [])?)
    }

    pub(crate) fn get(&self, id: NodeId) -> StorageResult<Option<TreeNode>> {
        let node = self
            .conn
            .prepare_cached(SELECT_NODE)?
            .query_row([id], read_node)
            .optional()?;
        Ok(node)
    }

    pub(crate) fn all(&self) -> StorageResult<Vec<TreeNode>> {
        let mut stmt = self.conn.prepare_cached(SELECT_ALL)?;
        let rows = stmt.query_map([], read_node)?.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub(crate) fn root_ids(&self) -> StorageResult<Vec<NodeId>> {
        let mut stmt = self.conn.prepare_cached(SELECT_ROOT_IDS)?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    pub(crate) fn child_ids(&self, parent: NodeId) -> StorageResult<Vec<NodeId>> {
        let mut stmt = self.conn.prepare_cached(SELECT_CHILD_IDS)?;
        let ids = stmt
            .query_map([parent], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    /// Overwrite `data` of an existing node.
    pub(crate) fn set_data(&self, id: NodeId, data: &str) -> StorageResult<()> {
        self.ensure_exists(id)?;
        self.conn
            .prepare_cached("UPDATE tree_items SET data = ?1 WHERE id = ?2")?
            .execute(params![data, id])?;
        Ok(())
    }

    /// Delete `id` and all its descendants. Returns the number of rows removed.
    pub(crate) fn delete_subtree(&self, id: NodeId) -> StorageResult<usize> {
        self.ensure_exists(id)?;
        let mut visited = HashSet::new();
        self.delete_recursive(id, &mut visited)
    }

    // post-order: a parent is never deleted while a child still points at it
    fn delete_recursive(&self, id: NodeId, visited: &mut HashSet<NodeId>) -> StorageResult<usize> {
        if !visited.insert(id) {
            return Err(StorageError::CycleDetected(id));
        }
        let mut deleted = 0;
        for child in self.child_ids(id)? {
            deleted += self.delete_recursive(child, visited)?;
        }
        deleted += self
            .conn
            .prepare_cached("DELETE FROM tree_items WHERE id = ?1")?
            .execute([id])?;
        Ok(deleted)
    }

    /// Materialize the subtree rooted at `id` with one query per node.
    pub(crate) fn materialize(&self, id: NodeId) -> StorageResult<Option<TreeItem>> {
        let mut visited = HashSet::new();
        self.materialize_recursive(id, &mut visited)
    }

    fn materialize_recursive(
        &self,
        id: NodeId,
        visited: &mut HashSet<NodeId>,
    ) -> StorageResult<Option<TreeItem>> {
        if !visited.insert(id) {
            return Err(StorageError::CycleDetected(id));
        }
        let Some(node) = self.get(id)? else {
            return Ok(None);
        };
        let mut children = Vec::new();
        for child in self.child_ids(id)? {
            if let Some(item) = self.materialize_recursive(child, visited)? {
                children.push(item);
            }
        }
        Ok(Some(TreeItem::from_node(node, children)))
    }
}
