//! Tree data shapes: the flat persisted row, the nested input accepted on
//! replace, and the nested output returned on read.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::{NodeId, NodeName};

/// Deepest tree accepted on replace. The root is level 1.
pub const MAX_TREE_DEPTH: usize = 50;

/// A submitted tree is nested deeper than [`MAX_TREE_DEPTH`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("tree is nested deeper than {max} levels")]
pub struct TreeTooDeepError {
    pub max: usize,
}

/// One row of the `tree_items` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: NodeId,
    pub name: String,
    pub data: Option<String>,
    /// `None` means root.
    pub parent_id: Option<NodeId>,
}

/// A nested node as submitted by a client when replacing the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTreeItem {
    pub name: NodeName,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub children: Option<Vec<NewTreeItem>>,
}

impl NewTreeItem {
    /// Leaf node without payload.
    pub fn new(name: NodeName) -> Self {
        Self {
            name,
            data: None,
            children: None,
        }
    }

    /// Set the payload.
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Append a child, keeping insertion order.
    pub fn with_child(mut self, child: NewTreeItem) -> Self {
        self.children.get_or_insert_with(Vec::new).push(child);
        self
    }

    /// Children in submission order; absent and empty are the same.
    pub fn children(&self) -> &[NewTreeItem] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Number of nodes in this subtree, including itself.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(NewTreeItem::node_count).sum::<usize>()
    }

    /// Number of levels in this subtree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(NewTreeItem::depth).max().unwrap_or(0)
    }

    pub fn check_depth(&self) -> Result<(), TreeTooDeepError> {
        if self.depth() > MAX_TREE_DEPTH {
            return Err(TreeTooDeepError {
                max: MAX_TREE_DEPTH,
            });
        }
        Ok(())
    }
}

/// A materialized node with its descendants, as returned on read.
///
/// `children` is `None` for leaves, never an empty vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeItem {
    pub id: NodeId,
    pub name: String,
    pub data: Option<String>,
    pub parent_id: Option<NodeId>,
    pub children: Option<Vec<TreeItem>>,
}

impl TreeItem {
    /// Attach already materialized children to a row.
    pub fn from_node(node: TreeNode, children: Vec<TreeItem>) -> Self {
        Self {
            id: node.id,
            name: node.name,
            data: node.data,
            parent_id: node.parent_id,
            children: if children.is_empty() { None } else { Some(children) },
        }
    }

    pub fn children(&self) -> &[TreeItem] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Ids of this subtree in pre-order.
    pub fn ids(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_ids(&mut out);
        out
    }

    fn collect_ids(&self, out: &mut Vec<NodeId>) {
        out.push(self.id);
        for child in self.children() {
            child.collect_ids(out);
        }
    }
}
