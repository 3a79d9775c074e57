//! Storage layer error types
//!
//! All errors that can occur during tree store operations are defined here.

use std::path::PathBuf;

use thiserror::Error;

use crate::storage::types::NodeId;

/// the main error type for storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// error from the underlying SQLite library
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// the requested node was not found
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// an insert referenced a parent that does not exist
    #[error("parent node not found: {0}")]
    ParentNotFound(NodeId),

    /// the parent pointers revisit a node, so the rows are not a forest
    #[error("cycle detected in tree_items at node {0}")]
    CycleDetected(NodeId),

    /// the database file could not be opened or created
    #[error("cannot open store at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// I/O error (filesystem level)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// check if this error indicates the node doesn't exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NodeNotFound(_))
    }

    /// check if the stored rows violate the forest invariant
    pub fn is_corrupted(&self) -> bool {
        matches!(self, StorageError::CycleDetected(_))
    }
}

/// result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let not_found = StorageError::NodeNotFound(NodeId::new(3));
        assert!(not_found.is_not_found());
        assert!(!not_found.is_corrupted());

        let parent = StorageError::ParentNotFound(NodeId::new(3));
        assert!(!parent.is_not_found());

        let cycle = StorageError::CycleDetected(NodeId::new(1));
        assert!(cycle.is_corrupted());
        assert_eq!(cycle.to_string(), "cycle detected in tree_items at node 1");
    }
}
