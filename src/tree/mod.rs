//! Tree shapes and the pure row-to-tree assembly.

mod assemble;
mod model;

pub use assemble::assemble_forest;
pub use model::{NewTreeItem, TreeItem, TreeNode, TreeTooDeepError, MAX_TREE_DEPTH};
