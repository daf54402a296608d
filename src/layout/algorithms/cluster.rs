//! Radial cluster layout.
//!
//! Leaves are laid out left to right with a separation of 1 between siblings and
//! 2 between leaves of different parents, divided by the leaf depth. Internal
//! nodes sit at the mean of their children. The resulting range (padded by half
//! a separation at each end so the first and last leaf don't meet) is wrapped
//! onto `[0, 2π)`.
//!
//! Depth maps to radius: depth `k` of `D` sits at `radius_max * k / D` where
//! `radius_max = min(width, height) / 2 - margin`. Angle 0 points up.

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::error::Result;
use crate::layout::{Bounds, Hierarchy, LayoutStrategy, PositionedGraph};
use crate::tree::TreeNode;

pub struct RadialClusterLayout {
    /// Gap between the outer ring and the bounds.
    pub margin: f64,
}

impl LayoutStrategy for RadialClusterLayout {
    fn layout(&self, root: &TreeNode, bounds: Bounds) -> Result<PositionedGraph> {
        bounds.validate()?;
        let hierarchy = Hierarchy::from_tree(root);
        let (cx, cy) = bounds.center();
        let radius_max = self.radius_max(bounds);

        let positions = cluster_polar(&hierarchy, radius_max)
            .into_iter()
            .map(|(angle, r)| polar_to_cartesian(angle, r, cx, cy))
            .collect::<Vec<_>>();

        Ok(hierarchy.to_graph(&positions))
    }
}

impl RadialClusterLayout {
    pub fn radius_max(&self, bounds: Bounds) -> f64 {
        (bounds.width.min(bounds.height) / 2.0 - self.margin).max(0.0)
    }
}

/// Angle measured from "up", clockwise in screen coordinates.
pub fn polar_to_cartesian(angle: f64, radius: f64, cx: f64, cy: f64) -> (f64, f64) {
    let a = angle - FRAC_PI_2;
    (cx + radius * a.cos(), cy + radius * a.sin())
}

fn separation(h: &Hierarchy<'_>, a: usize, b: usize) -> f64 {
    let base = if h.same_parent(a, b) { 1.0 } else { 2.0 };
    base / f64::from(h.nodes[a].depth.max(1))
}

/// `(angle, radius)` for every hierarchy index.
fn cluster_polar(h: &Hierarchy<'_>, radius_max: f64) -> Vec<(f64, f64)> {
    if h.len() <= 1 {
        return vec![(0.0, 0.0); h.len()];
    }

    let mut xs = vec![0.0; h.len()];
    let mut previous_leaf: Option<usize> = None;
    let mut cursor = 0.0;
    for v in h.post_order() {
        let children = &h.nodes[v].children;
        if children.is_empty() {
            if let Some(prev) = previous_leaf {
                cursor += separation(h, v, prev);
            }
            xs[v] = cursor;
            previous_leaf = Some(v);
        } else {
            xs[v] = children.iter().map(|&c| xs[c]).sum::<f64>() / children.len() as f64;
        }
    }

    let left = leaf_edge(h, |c| c.first().copied());
    let right = leaf_edge(h, |c| c.last().copied());
    let x0 = xs[left] - separation(h, left, right) / 2.0;
    let x1 = xs[right] + separation(h, right, left) / 2.0;
    let span = x1 - x0;
    let max_depth = f64::from(h.max_depth.max(1));

    h.nodes
        .iter()
        .zip(&xs)
        .map(|(n, &x)| {
            let angle = (x - x0) / span * TAU;
            let radius = radius_max * f64::from(n.depth) / max_depth;
            (angle, radius)
        })
        .collect()
}

fn leaf_edge(h: &Hierarchy<'_>, pick: impl Fn(&[usize]) -> Option<usize>) -> usize {
    let mut v = 0;
    while let Some(c) = pick(&h.nodes[v].children) {
        v = c;
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::build_tree;

    const BOUNDS: Bounds = Bounds { width: 800.0, height: 600.0 };

    fn radial() -> RadialClusterLayout {
        RadialClusterLayout { margin: 40.0 }
    }

    fn depth_of(id: &str) -> u32 {
        id.matches('-').count() as u32
    }

    #[test]
    fn test_root_at_center() {
        let graph = radial().layout(&build_tree(3), BOUNDS).unwrap();
        let root = graph.node("root").unwrap();
        assert_eq!((root.x, root.y), (400.0, 300.0));
    }

    #[test]
    fn test_radius_proportional_to_depth() {
        let layout = radial();
        let radius_max = layout.radius_max(BOUNDS);
        assert_eq!(radius_max, 260.0);
        let graph = layout.layout(&build_tree(3), BOUNDS).unwrap();
        for n in &graph.nodes {
            let r = (n.x - 400.0).hypot(n.y - 300.0);
            let expected = radius_max * f64::from(depth_of(&n.id)) / 3.0;
            assert!((r - expected).abs() < 1e-9, "{}: r={r} expected={expected}", n.id);
        }
    }

    #[test]
    fn test_first_leaf_in_upper_right_quadrant() {
        // Four leaves with half a gap of padding each side: the first one sits
        // at an eighth of a turn clockwise from straight up.
        let graph = radial().layout(&build_tree(1), BOUNDS).unwrap();
        let first = graph.node("root-0").unwrap();
        let r = RadialClusterLayout { margin: 40.0 }.radius_max(BOUNDS);
        let offset = r * std::f64::consts::FRAC_1_SQRT_2;
        assert!((first.x - (400.0 + offset)).abs() < 1e-9);
        assert!((first.y - (300.0 - offset)).abs() < 1e-9);
    }

    #[test]
    fn test_leaves_evenly_spaced_within_family() {
        let h_tree = build_tree(2);
        let h = Hierarchy::from_tree(&h_tree);
        let polar = cluster_polar(&h, 100.0);
        let angle = |id: &str| polar[h.nodes.iter().position(|n| n.id == id).unwrap()].0;
        let sibling_gap = angle("root-0-1") - angle("root-0-0");
        let cousin_gap = angle("root-1-0") - angle("root-0-3");
        assert!(sibling_gap > 0.0);
        assert!((cousin_gap - 2.0 * sibling_gap).abs() < 1e-12);
        // parent at the centroid of its children
        let mean = (0..4).map(|i| angle(&format!("root-2-{i}"))).sum::<f64>() / 4.0;
        assert!((angle("root-2") - mean).abs() < 1e-12);
    }

    #[test]
    fn test_angles_stay_within_circle() {
        let tree = build_tree(3);
        let h = Hierarchy::from_tree(&tree);
        for (angle, _) in cluster_polar(&h, 1.0) {
            assert!((0.0..TAU).contains(&angle));
        }
    }

    #[test]
    fn test_single_node_at_center() {
        let graph = radial().layout(&build_tree(0), BOUNDS).unwrap();
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!((graph.nodes[0].x, graph.nodes[0].y), (400.0, 300.0));
    }

    #[test]
    fn test_margin_larger_than_disc_collapses_to_center() {
        let layout = RadialClusterLayout { margin: 1000.0 };
        let graph = layout.layout(&build_tree(2), BOUNDS).unwrap();
        assert!(graph.nodes.iter().all(|n| n.x == 400.0 && n.y == 300.0));
    }

    #[test]
    fn test_deterministic() {
        let tree = build_tree(3);
        assert_eq!(
            radial().layout(&tree, BOUNDS).unwrap(),
            radial().layout(&tree, BOUNDS).unwrap()
        );
    }
}
