// Flat arena view of a TreeNode.
//
// Layout algorithms work on indices rather than the recursive tree: index 0 is
// the root and indices follow pre-order, so parents always come before their
// children and a forward scan is a valid top-down traversal.

use super::{edge_id, PositionedEdge, PositionedGraph, PositionedNode};
use crate::tree::TreeNode;

#[derive(Debug, Clone)]
pub struct HierarchyNode<'a> {
    pub id: &'a str,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub depth: u32,
    /// Position among siblings (0 for the root).
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct Hierarchy<'a> {
    pub nodes: Vec<HierarchyNode<'a>>,
    pub max_depth: u32,
}

impl<'a> Hierarchy<'a> {
    pub fn from_tree(root: &'a TreeNode) -> Self {
        fn visit<'a>(
            node: &'a TreeNode,
            parent: Option<usize>,
            depth: u32,
            index: usize,
            out: &mut Vec<HierarchyNode<'a>>,
        ) -> usize {
            let slot = out.len();
            out.push(HierarchyNode {
                id: &node.id,
                parent,
                children: Vec::with_capacity(node.children.len()),
                depth,
                index,
            });
            for (i, child) in node.children.iter().enumerate() {
                let c = visit(child, Some(slot), depth + 1, i, out);
                out[slot].children.push(c);
            }
            slot
        }

        let mut nodes = Vec::new();
        visit(root, None, 0, 0, &mut nodes);
        let max_depth = nodes.iter().map(|n| n.depth).max().unwrap_or(0);
        Hierarchy { nodes, max_depth }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children before parents.
    pub fn post_order(&self) -> Vec<usize> {
        fn dfs(h: &Hierarchy<'_>, v: usize, out: &mut Vec<usize>) {
            for &c in &h.nodes[v].children {
                dfs(h, c, out);
            }
            out.push(v);
        }
        let mut out = Vec::with_capacity(self.len());
        if !self.is_empty() {
            dfs(self, 0, &mut out);
        }
        out
    }

    /// Parent-child pairs in pre-order of the child.
    pub fn links(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.parent.map(|p| (p, i)))
    }

    pub fn same_parent(&self, a: usize, b: usize) -> bool {
        self.nodes[a].parent.is_some() && self.nodes[a].parent == self.nodes[b].parent
    }

    /// Assemble the output graph from per-index coordinates.
    pub fn to_graph(&self, positions: &[(f64, f64)]) -> PositionedGraph {
        let nodes: Vec<PositionedNode> = self
            .nodes
            .iter()
            .zip(positions)
            .map(|(n, &(x, y))| PositionedNode { id: n.id.to_string(), x, y })
            .collect();

        let edges = self
            .links()
            .map(|(p, c)| PositionedEdge {
                id: edge_id(self.nodes[p].id, self.nodes[c].id),
                source: nodes[p].clone(),
                target: nodes[c].clone(),
            })
            .collect();

        PositionedGraph { nodes, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::build_tree;

    #[test]
    fn test_pre_order_indices() {
        let tree = build_tree(2);
        let h = Hierarchy::from_tree(&tree);
        assert_eq!(h.len(), 21);
        assert!(!h.is_empty());
        assert_eq!(h.max_depth, 2);
        assert_eq!(h.nodes[0].id, "root");
        assert_eq!(h.nodes[1].id, "root-0");
        assert_eq!(h.nodes[2].id, "root-0-0");
        assert_eq!(h.nodes[6].id, "root-1");
        assert_eq!(h.nodes[6].index, 1);
        for (i, n) in h.nodes.iter().enumerate() {
            if let Some(p) = n.parent {
                assert!(p < i);
                assert_eq!(h.nodes[p].depth + 1, n.depth);
            }
        }
    }

    #[test]
    fn test_post_order_visits_children_first() {
        let tree = build_tree(1);
        let h = Hierarchy::from_tree(&tree);
        assert_eq!(h.post_order(), vec![1, 2, 3, 4, 0]);
    }

    #[test]
    fn test_same_parent() {
        let tree = build_tree(2);
        let h = Hierarchy::from_tree(&tree);
        assert!(h.same_parent(2, 3));
        assert!(!h.same_parent(5, 7));
        assert!(!h.same_parent(0, 0));
    }
}
