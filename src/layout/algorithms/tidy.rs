//! Layered tidy tree layout.
//!
//! Buchheim, Jünger & Leipert's linear-time version of Walker's algorithm:
//! a bottom-up first walk assigns preliminary x offsets by merging subtree
//! contours (threads keep contour traversal O(1) amortized), and a top-down
//! second walk accumulates modifiers into final positions. Adjacent siblings
//! are kept 1 unit apart and adjacent non-siblings 2 units.
//!
//! The unit coordinates are then scaled so the leftmost and rightmost nodes,
//! plus half a separation on each side, span the bounds width, and depth is
//! spread over the bounds height. Finally the whole drawing is shifted so the
//! root lands on the bounds center. This strategy centers on the root's own
//! post-layout position, unlike the radial and force strategies which center on
//! the bounds directly.

use crate::error::Result;
use crate::layout::{Bounds, Hierarchy, LayoutStrategy, PositionedGraph};
use crate::tree::TreeNode;

/// Top-down layered tree layout.
pub struct TidyTreeLayout;

impl LayoutStrategy for TidyTreeLayout {
    fn layout(&self, root: &TreeNode, bounds: Bounds) -> Result<PositionedGraph> {
        bounds.validate()?;
        let hierarchy = Hierarchy::from_tree(root);
        let positions = tidy_positions(&hierarchy, bounds);
        Ok(hierarchy.to_graph(&positions))
    }
}

/// Working state for one node. Slot 0 is a virtual parent of the real root,
/// slot `i + 1` mirrors hierarchy index `i`.
#[derive(Debug, Clone)]
struct TidyNode {
    parent: Option<usize>,
    children: Vec<usize>,
    /// Sibling index.
    number: usize,
    /// Preliminary x.
    prelim: f64,
    modifier: f64,
    shift: f64,
    change: f64,
    thread: Option<usize>,
    ancestor: usize,
    /// Default ancestor carried between apportion calls of one sibling set.
    default_ancestor: Option<usize>,
}

struct Tidy {
    nodes: Vec<TidyNode>,
}

impl Tidy {
    fn new(h: &Hierarchy<'_>) -> Self {
        let mut nodes = Vec::with_capacity(h.len() + 1);
        nodes.push(TidyNode {
            parent: None,
            children: vec![1],
            number: 0,
            prelim: 0.0,
            modifier: 0.0,
            shift: 0.0,
            change: 0.0,
            thread: None,
            ancestor: 0,
            default_ancestor: None,
        });
        for (i, n) in h.nodes.iter().enumerate() {
            let slot = i + 1;
            nodes.push(TidyNode {
                parent: Some(n.parent.map_or(0, |p| p + 1)),
                children: n.children.iter().map(|c| c + 1).collect(),
                number: n.index,
                prelim: 0.0,
                modifier: 0.0,
                shift: 0.0,
                change: 0.0,
                thread: None,
                ancestor: slot,
                default_ancestor: None,
            });
        }
        Tidy { nodes }
    }

    fn separation(&self, a: usize, b: usize) -> f64 {
        if self.nodes[a].parent == self.nodes[b].parent { 1.0 } else { 2.0 }
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        self.nodes[v].children.first().copied().or(self.nodes[v].thread)
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        self.nodes[v].children.last().copied().or(self.nodes[v].thread)
    }

    fn first_walk(&mut self, v: usize) {
        let Some(parent) = self.nodes[v].parent else { return };
        let number = self.nodes[v].number;
        let first_sibling = self.nodes[parent].children[0];
        let left_sibling = (number > 0).then(|| self.nodes[parent].children[number - 1]);

        if !self.nodes[v].children.is_empty() {
            self.execute_shifts(v);
            let children = &self.nodes[v].children;
            let first = children[0];
            let last = children[children.len() - 1];
            let midpoint = (self.nodes[first].prelim + self.nodes[last].prelim) / 2.0;
            match left_sibling {
                Some(w) => {
                    self.nodes[v].prelim = self.nodes[w].prelim + self.separation(v, w);
                    self.nodes[v].modifier = self.nodes[v].prelim - midpoint;
                }
                None => self.nodes[v].prelim = midpoint,
            }
        } else if let Some(w) = left_sibling {
            self.nodes[v].prelim = self.nodes[w].prelim + self.separation(v, w);
        }

        let ancestor = self.nodes[parent].default_ancestor.unwrap_or(first_sibling);
        let ancestor = self.apportion(v, left_sibling, ancestor);
        self.nodes[parent].default_ancestor = Some(ancestor);
    }

    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0;
        let mut change = 0.0;
        for i in (0..self.nodes[v].children.len()).rev() {
            let w = self.nodes[v].children[i];
            let node = &mut self.nodes[w];
            node.prelim += shift;
            node.modifier += shift;
            change += node.change;
            shift += node.shift + change;
        }
    }

    fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
        let subtrees = (self.nodes[wp].number - self.nodes[wm].number) as f64;
        let change = shift / subtrees;
        self.nodes[wp].change -= change;
        self.nodes[wp].shift += shift;
        self.nodes[wm].change += change;
        self.nodes[wp].prelim += shift;
        self.nodes[wp].modifier += shift;
    }

    fn next_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
        let candidate = self.nodes[vim].ancestor;
        if self.nodes[candidate].parent == self.nodes[v].parent {
            candidate
        } else {
            ancestor
        }
    }

    fn apportion(&mut self, v: usize, left_sibling: Option<usize>, mut ancestor: usize) -> usize {
        let Some(w) = left_sibling else { return ancestor };
        let Some(parent) = self.nodes[v].parent else { return ancestor };

        // inner/outer contours on the right (p) and left (m) side of the gap
        let mut vip = v;
        let mut vop = v;
        let mut vim = w;
        let mut vom = self.nodes[parent].children[0];
        let mut sip = self.nodes[vip].modifier;
        let mut sop = self.nodes[vop].modifier;
        let mut sim = self.nodes[vim].modifier;
        let mut som = self.nodes[vom].modifier;

        let mut next_im = self.next_right(vim);
        let mut next_ip = self.next_left(vip);
        while let (Some(im), Some(ip)) = (next_im, next_ip) {
            vim = im;
            vip = ip;
            let (Some(om), Some(op)) = (self.next_left(vom), self.next_right(vop)) else {
                break;
            };
            vom = om;
            vop = op;
            self.nodes[vop].ancestor = v;

            let shift = self.nodes[vim].prelim + sim - self.nodes[vip].prelim - sip
                + self.separation(vim, vip);
            if shift > 0.0 {
                let wm = self.next_ancestor(vim, v, ancestor);
                self.move_subtree(wm, v, shift);
                sip += shift;
                sop += shift;
            }

            sim += self.nodes[vim].modifier;
            sip += self.nodes[vip].modifier;
            som += self.nodes[vom].modifier;
            sop += self.nodes[vop].modifier;

            next_im = self.next_right(vim);
            next_ip = self.next_left(vip);
        }

        if let Some(im) = next_im {
            if self.next_right(vop).is_none() {
                self.nodes[vop].thread = Some(im);
                self.nodes[vop].modifier += sim - sop;
            }
        }
        if let Some(ip) = next_ip {
            if self.next_left(vom).is_none() {
                self.nodes[vom].thread = Some(ip);
                self.nodes[vom].modifier += sip - som;
                ancestor = v;
            }
        }
        ancestor
    }
}

/// Unit-space x for every hierarchy index.
fn unit_x(h: &Hierarchy<'_>) -> Vec<f64> {
    let mut tidy = Tidy::new(h);

    for v in h.post_order() {
        tidy.first_walk(v + 1);
    }
    tidy.nodes[0].modifier = -tidy.nodes[1].prelim;

    // Pre-order: parents are finalized before their children.
    let mut xs = vec![0.0; h.len()];
    for (i, node) in h.nodes.iter().enumerate() {
        let slot = i + 1;
        let parent_slot = node.parent.map_or(0, |p| p + 1);
        let parent_mod = tidy.nodes[parent_slot].modifier;
        xs[i] = tidy.nodes[slot].prelim + parent_mod;
        tidy.nodes[slot].modifier += parent_mod;
    }
    xs
}

fn tidy_positions(h: &Hierarchy<'_>, bounds: Bounds) -> Vec<(f64, f64)> {
    let xs = unit_x(h);

    let mut left = 0;
    let mut right = 0;
    for i in 0..h.len() {
        if xs[i] < xs[left] {
            left = i;
        }
        if xs[i] > xs[right] {
            right = i;
        }
    }
    let margin = if left == right {
        1.0
    } else if h.same_parent(left, right) {
        0.5
    } else {
        1.0
    };
    let tx = margin - xs[left];
    let kx = bounds.width / (xs[right] + margin + tx);
    let ky = bounds.height / f64::from(h.max_depth.max(1));

    let scaled: Vec<(f64, f64)> = h
        .nodes
        .iter()
        .zip(&xs)
        .map(|(n, &x)| ((x + tx) * kx, f64::from(n.depth) * ky))
        .collect();

    let (cx, cy) = bounds.center();
    let (root_x, root_y) = scaled[0];
    let (dx, dy) = (cx - root_x, cy - root_y);
    scaled.into_iter().map(|(x, y)| (x + dx, y + dy)).collect()
}
