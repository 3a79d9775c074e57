//! storage layer for treedb
//!
//! This module owns the single `tree_items` parent-pointer table. The upper
//! layers (service, HTTP) use [`TreeStore`] and never touch rusqlite directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        TreeStore                            │
//! │   (shared handle: connection lock, one transaction per op)  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!               ┌──────────────┴──────────────┐
//!               ▼                             ▼
//!        ┌─────────────┐               ┌─────────────┐
//!        │  NodeTable  │               │   schema    │
//!        │ (row + rec. │               │ (DDL, reset │
//!        │  operations)│               │  pragmas)   │
//!        └─────────────┘               └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use treedb::storage::{NodeName, TreeStore};
//! use treedb::tree::NewTreeItem;
//!
//! let store = TreeStore::in_memory()?;
//!
//! let tree = NewTreeItem::new(NodeName::new("root")?)
//!     .with_child(NewTreeItem::new(NodeName::new("leaf")?));
//! let root = store.replace_tree(&tree)?;
//!
//! let forest = store.materialize_forest()?;
//! store.delete_subtree(root)?;
//! ```

mod error;
mod schema;
mod store;
mod table;
mod types;

pub use error::{StorageError, StorageResult};
pub use schema::TABLE_NAME;
pub use store::TreeStore;
pub use types::{InvalidNameError, NodeId, NodeName, StoreLocation};
