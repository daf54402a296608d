//! Cayley tree generation.
//!
//! The tree is a perfect 4-ary tree: every internal node has exactly
//! [`BRANCHING`] children and all leaves sit at the same depth. Node ids encode
//! the root-to-node path (`root`, `root-0`, `root-0-3`, ...), so the same depth
//! always yields the same ids and hover/selection can follow a node across
//! layout passes.

use serde::Serialize;

/// Children per internal node.
pub const BRANCHING: usize = 4;

/// Id of the tree root.
pub const ROOT_ID: &str = "root";

/// Separator between path components in a node id. Path components are the
/// root label and decimal child indices, neither of which contains it.
pub const ID_DELIMITER: char = '-';

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub id: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Total number of nodes in this subtree, including self.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
    }

    /// Number of parent-child links in this subtree.
    pub fn edge_count(&self) -> usize {
        self.node_count() - 1
    }

    /// Height of this subtree (0 for a leaf).
    pub fn depth(&self) -> u32 {
        self.children
            .iter()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Pre-order walk over the subtree.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a TreeNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Build a Cayley tree of the given depth rooted at [`ROOT_ID`].
pub fn build_tree(depth: u32) -> TreeNode {
    build_subtree(depth, ROOT_ID.to_string())
}

fn build_subtree(depth: u32, id: String) -> TreeNode {
    if depth == 0 {
        return TreeNode { id, children: Vec::new() };
    }

    let children = (0..BRANCHING)
        .map(|i| build_subtree(depth - 1, format!("{id}{ID_DELIMITER}{i}")))
        .collect();

    TreeNode { id, children }
}

/// Number of nodes in a Cayley tree of the given depth: (4^(d+1) - 1) / 3.
pub fn expected_node_count(depth: u32) -> usize {
    (BRANCHING.pow(depth + 1) - 1) / (BRANCHING - 1)
}
