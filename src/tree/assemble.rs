//! In-memory forest assembly.
//!
//! Groups flat rows by `parent_id` into an adjacency list and walks it from
//! the roots. The result has the same shape and ordering as materializing
//! each root with one query per node: siblings in ascending id order, leaves
//! with `children: None`.

use std::collections::BTreeMap;

use crate::storage::NodeId;
use crate::tree::model::{TreeItem, TreeNode};

/// Children grouped by parent, each group sorted by id.
struct Adjacency {
    by_parent: BTreeMap<Option<NodeId>, Vec<TreeNode>>,
}

impl Adjacency {
    fn new(rows: impl IntoIterator<Item = TreeNode>) -> Self {
        let mut by_parent: BTreeMap<Option<NodeId>, Vec<TreeNode>> = BTreeMap::new();
        for row in rows {
            by_parent.entry(row.parent_id).or_default().push(row);
        }
        for group in by_parent.values_mut() {
            group.sort_by_key(|row| row.id);
        }
        Self { by_parent }
    }

    fn take_children(&mut self, parent: Option<NodeId>) -> Vec<TreeNode> {
        self.by_parent.remove(&parent).unwrap_or_default()
    }

    fn build(&mut self, node: TreeNode) -> TreeItem {
        let children = self
            .take_children(Some(node.id))
            .into_iter()
            .map(|child| self.build(child))
            .collect();
        TreeItem::from_node(node, children)
    }
}

/// Assemble every root and its descendants from a flat row set.
///
/// Rows whose parent is missing from the set are unreachable from any root
/// and are left out. Each group is removed once it is walked, so every row
/// is emitted at most once even if the parent pointers are corrupt.
pub fn assemble_forest(rows: impl IntoIterator<Item = TreeNode>) -> Vec<TreeItem> {
    let mut adjacency = Adjacency::new(rows);
    adjacency
        .take_children(None)
        .into_iter()
        .map(|root| adjacency.build(root))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, name: &str, parent: Option<i64>) -> TreeNode {
        TreeNode {
            id: NodeId::new(id),
            name: name.to_string(),
            data: None,
            parent_id: parent.map(NodeId::new),
        }
    }

    fn names(items: &[TreeItem]) -> Vec<&str> {
        items.iter().map(|item| item.name.as_str()).collect()
    }

    #[test]
    fn test_empty_rows() {
        assert!(assemble_forest(Vec::new()).is_empty());
    }

    #[test]
    fn test_nested_shape() {
        let rows = vec![
            row(1, "root", None),
            row(2, "a", Some(1)),
            row(3, "b", Some(1)),
            row(4, "c", Some(3)),
        ];
        let forest = assemble_forest(rows);

        assert_eq!(forest.len(), 1);
        let root = &forest[0];
        assert_eq!(names(root.children()), vec!["a", "b"]);
        assert!(root.children()[0].children.is_none());
        assert_eq!(names(root.children()[1].children()), vec!["c"]);
        assert_eq!(root.children()[1].children()[0].parent_id, Some(NodeId::new(3)));
    }

    #[test]
    fn test_order_independent_of_input_order() {
        let rows = vec![
            row(4, "c", Some(1)),
            row(5, "second-root", None),
            row(2, "a", Some(1)),
            row(1, "root", None),
            row(3, "b", Some(1)),
        ];
        let forest = assemble_forest(rows);

        assert_eq!(names(&forest), vec!["root", "second-root"]);
        assert_eq!(names(forest[0].children()), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_orphans_and_cycles_are_skipped() {
        let rows = vec![
            row(1, "root", None),
            row(2, "orphan", Some(99)),
            row(3, "loop-a", Some(4)),
            row(4, "loop-b", Some(3)),
        ];
        let forest = assemble_forest(rows);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].ids(), vec![NodeId::new(1)]);
    }
}
