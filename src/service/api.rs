//! Tree service - the request-level API over the tree store.

use thiserror::Error;

use crate::service::config::ServiceConfig;
use crate::storage::{NodeId, StorageError, TreeStore};
use crate::tree::{NewTreeItem, TreeItem, TreeNode, TreeTooDeepError};

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service errors.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The requested node does not exist.
    #[error("item not found: {0}")]
    NotFound(NodeId),

    /// The request was rejected before reaching the store.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(StorageError),

    /// A blocking store task panicked or was cancelled.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NodeNotFound(id) => ServiceError::NotFound(id),
            other => ServiceError::Storage(other),
        }
    }
}

impl From<TreeTooDeepError> for ServiceError {
    fn from(err: TreeTooDeepError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

impl ServiceError {
    /// check if this error indicates the node doesn't exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }

    /// check if the caller is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServiceError::NotFound(_) | ServiceError::Validation(_))
    }
}

/// The service handle injected into request handlers.
///
/// Stateless apart from the store handle; clone freely.
#[derive(Debug, Clone)]
pub struct TreeService {
    store: TreeStore,
}

impl TreeService {
    pub fn new(store: TreeStore) -> Self {
        Self { store }
    }

    /// Open the configured store, resetting the schema in development.
    pub fn open(config: &ServiceConfig) -> ServiceResult<Self> {
        let reset = config.environment.resets_schema();
        let store = TreeStore::open_with_reset(config.store.clone(), reset)?;
        tracing::info!(store = %store.location(), reset, "tree store opened");
        Ok(Self::new(store))
    }

    /// Service over a private in-memory store (for testing).
    pub fn in_memory() -> ServiceResult<Self> {
        Ok(Self::new(TreeStore::in_memory()?))
    }

    /// Replace the whole forest with `input`. Returns the new root id.
    ///
    /// Trees deeper than [`crate::tree::MAX_TREE_DEPTH`] are rejected and the
    /// current forest is left in place.
    pub fn replace_tree(&self, input: &NewTreeItem) -> ServiceResult<NodeId> {
        input.check_depth()?;
        let root = self.store.replace_tree(input)?;
        tracing::info!(%root, nodes = input.node_count(), "tree replaced");
        Ok(root)
    }

    /// Every root with its descendants; empty when the store is empty.
    pub fn get_tree(&self) -> ServiceResult<Vec<TreeItem>> {
        Ok(self.store.materialize_forest()?)
    }

    /// The subtree rooted at `id`.
    pub fn get_subtree(&self, id: NodeId) -> ServiceResult<TreeItem> {
        self.store
            .materialize_subtree(id)?
            .ok_or(ServiceError::NotFound(id))
    }

    /// Every row, flat, ordered by id.
    pub fn get_flat_items(&self) -> ServiceResult<Vec<TreeNode>> {
        Ok(self.store.fetch_all()?)
    }

    /// Overwrite the payload of one node.
    pub fn update_node_data(&self, id: NodeId, data: &str) -> ServiceResult<()> {
        self.store.update_data(id, data)?;
        tracing::debug!(%id, "node data updated");
        Ok(())
    }

    /// Delete one node and its descendants. Returns the number of rows removed.
    pub fn delete_node(&self, id: NodeId) -> ServiceResult<usize> {
        let deleted = self.store.delete_subtree(id)?;
        tracing::info!(%id, deleted, "subtree deleted");
        Ok(deleted)
    }
}
