//! treedb - a forest of named nodes over a parent-pointer table
//!
//! This crate stores a tree of named nodes, each with an opaque string
//! payload, in one self-referencing SQLite table and serves it over HTTP.
//! Clients replace the whole tree, read it back nested, update one node's
//! payload, or delete a node together with its descendants.
//!
//! # Example
//!
//! ```no_run
//! use treedb::service::TreeService;
//! use treedb::storage::NodeName;
//! use treedb::tree::NewTreeItem;
//!
//! let service = TreeService::in_memory().unwrap();
//! let tree = NewTreeItem::new(NodeName::new("root").unwrap())
//!     .with_child(NewTreeItem::new(NodeName::new("leaf").unwrap()).with_data("x"));
//! let root = service.replace_tree(&tree).unwrap();
//! assert_eq!(service.get_tree().unwrap()[0].id, root);
//! ```

pub mod http;
pub mod service;
pub mod storage;
pub mod tree;
