// Layout engine for Cayley trees.
//
// Every strategy maps the same abstract tree to layout-space coordinates and
// hands back a PositionedGraph. Nothing here knows about the view transform;
// pan/zoom is applied by whoever draws the graph.
//
// Submodules:
// - hierarchy: flat arena view of the tree (parents, depths, sibling index)
// - algorithms: one file per strategy (tidy tree, radial cluster, force)
//
// Output:
// - PositionedGraph with one node per tree node and one edge per parent-child link.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CayleyError, Result};
use crate::simulation::ForceConfig;
use crate::tree::TreeNode;

mod hierarchy;
pub mod algorithms;

pub(crate) use hierarchy::Hierarchy;
pub use algorithms::{ForceLayout, RadialClusterLayout, TidyTreeLayout};

/// Largest accepted width or height. Keeps every coordinate sum the force
/// simulation forms well inside f64 range.
pub const MAX_EXTENT: f64 = 1e6;

/// Drawing area the layout is fitted to.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Result<Self> {
        let bounds = Bounds { width, height };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<()> {
        let ok = |v: f64| v.is_finite() && v > 0.0 && v <= MAX_EXTENT;
        if ok(self.width) && ok(self.height) {
            Ok(())
        } else {
            Err(CayleyError::InvalidBounds {
                width: self.width,
                height: self.height,
            })
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds { width: 800.0, height: 600.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedEdge {
    /// `"<parentId>-><childId>"`
    pub id: String,
    pub source: PositionedNode,
    pub target: PositionedNode,
}

/// The only artifact a layout pass produces. Rebuilt wholesale every pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PositionedGraph {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<PositionedEdge>,
}

impl PositionedGraph {
    pub fn node(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&PositionedEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// True if `id` names a node or an edge of this graph.
    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some() || self.edge(id).is_some()
    }
}

pub fn edge_id(parent: &str, child: &str) -> String {
    format!("{parent}->{child}")
}

/// Available layout strategies. `name()` is the one mapping to and from
/// strategy names; serde and `FromStr` both go through it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum LayoutKind {
    #[default]
    Tree,
    Radial,
    Force,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 3] = [LayoutKind::Tree, LayoutKind::Radial, LayoutKind::Force];

    pub fn name(&self) -> &'static str {
        match self {
            LayoutKind::Tree => "tree",
            LayoutKind::Radial => "radial",
            LayoutKind::Force => "force",
        }
    }
}

impl std::str::FromStr for LayoutKind {
    type Err = CayleyError;

    fn from_str(s: &str) -> Result<Self> {
        LayoutKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| CayleyError::parameter("strategy", format!("unknown layout strategy '{s}'")))
    }
}

impl From<LayoutKind> for &'static str {
    fn from(kind: LayoutKind) -> Self {
        kind.name()
    }
}

impl TryFrom<String> for LayoutKind {
    type Error = CayleyError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Gap between the outermost ring and the edge of the bounds (radial only).
    pub radial_margin: f64,
    pub force: ForceConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            radial_margin: 40.0,
            force: ForceConfig::default(),
        }
    }
}

/// A pure mapping from tree to coordinates.
pub trait LayoutStrategy {
    fn layout(&self, root: &TreeNode, bounds: Bounds) -> Result<PositionedGraph>;
}

impl LayoutKind {
    pub fn strategy(&self, cfg: &LayoutConfig) -> Box<dyn LayoutStrategy> {
        match self {
            LayoutKind::Tree => Box::new(TidyTreeLayout),
            LayoutKind::Radial => Box::new(RadialClusterLayout { margin: cfg.radial_margin }),
            LayoutKind::Force => Box::new(ForceLayout { config: cfg.force.clone() }),
        }
    }
}

/// Lay out `root` with the given strategy.
pub fn layout_tree(
    root: &TreeNode,
    bounds: Bounds,
    kind: LayoutKind,
    cfg: &LayoutConfig,
) -> Result<PositionedGraph> {
    bounds.validate()?;
    let graph = kind.strategy(cfg).layout(root, bounds)?;
    debug!(
        strategy = kind.name(),
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "layout pass"
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::build_tree;

    #[test]
    fn test_bounds_validation() {
        assert!(Bounds::new(800.0, 600.0).is_ok());
        assert!(matches!(Bounds::new(0.0, 600.0), Err(CayleyError::InvalidBounds { .. })));
        assert!(Bounds::new(800.0, -1.0).is_err());
        assert!(Bounds::new(f64::NAN, 600.0).is_err());
        assert!(Bounds::new(f64::INFINITY, 600.0).is_err());
    }

    #[test]
    fn test_bounds_upper_limit() {
        assert!(Bounds::new(MAX_EXTENT, MAX_EXTENT).is_ok());
        assert!(matches!(
            Bounds::new(1e307, 1e307),
            Err(CayleyError::InvalidBounds { .. })
        ));
        let tree = build_tree(3);
        let huge = Bounds { width: 1e307, height: 1e307 };
        assert!(layout_tree(&tree, huge, LayoutKind::Force, &LayoutConfig::default()).is_err());
    }

    #[test]
    fn test_largest_bounds_stay_finite() {
        let tree = build_tree(3);
        let bounds = Bounds::new(MAX_EXTENT, MAX_EXTENT).unwrap();
        for kind in LayoutKind::ALL {
            let graph = layout_tree(&tree, bounds, kind, &LayoutConfig::default()).unwrap();
            assert!(
                graph.nodes.iter().all(|n| n.x.is_finite() && n.y.is_finite()),
                "{}",
                kind.name()
            );
        }
    }

    #[test]
    fn test_every_strategy_rejects_bad_bounds() {
        let tree = build_tree(1);
        let bad = Bounds { width: 800.0, height: 0.0 };
        for kind in LayoutKind::ALL {
            let err = kind.strategy(&LayoutConfig::default()).layout(&tree, bad);
            assert!(err.is_err(), "{}", kind.name());
            assert!(layout_tree(&tree, bad, kind, &LayoutConfig::default()).is_err());
        }
    }

    #[test]
    fn test_single_node_under_every_strategy() {
        let tree = build_tree(0);
        for kind in LayoutKind::ALL {
            let graph = layout_tree(&tree, Bounds::default(), kind, &LayoutConfig::default()).unwrap();
            assert_eq!(graph.nodes.len(), 1, "{}", kind.name());
            assert!(graph.edges.is_empty());
            assert_eq!(graph.nodes[0].id, "root");
            assert!(graph.nodes[0].x.is_finite() && graph.nodes[0].y.is_finite());
        }
    }

    #[test]
    fn test_edges_reference_node_coordinates() {
        let tree = build_tree(2);
        for kind in LayoutKind::ALL {
            let graph = layout_tree(&tree, Bounds::default(), kind, &LayoutConfig::default()).unwrap();
            assert_eq!(graph.nodes.len(), 21);
            assert_eq!(graph.edges.len(), 20);
            for edge in &graph.edges {
                assert_eq!(edge.id, edge_id(&edge.source.id, &edge.target.id));
                assert_eq!(graph.node(&edge.source.id), Some(&edge.source));
                assert_eq!(graph.node(&edge.target.id), Some(&edge.target));
            }
        }
    }

    #[test]
    fn test_contains_nodes_and_edges() {
        let graph = layout_tree(&build_tree(1), Bounds::default(), LayoutKind::Tree, &LayoutConfig::default()).unwrap();
        assert!(graph.contains("root-3"));
        assert!(graph.contains("root->root-0"));
        assert!(!graph.contains("root-4"));
    }

    #[test]
    fn test_layout_kind_from_str() {
        assert_eq!("radial".parse::<LayoutKind>().unwrap(), LayoutKind::Radial);
        assert!("spiral".parse::<LayoutKind>().is_err());
        assert!("Tree".parse::<LayoutKind>().is_err());
    }

    #[test]
    fn test_layout_kind_names_agree_with_serde() {
        for kind in LayoutKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.name());
            assert_eq!(kind.name().parse::<LayoutKind>().unwrap(), kind);
            let back: LayoutKind = serde_json::from_value(json).unwrap();
            assert_eq!(back, kind);
        }
        assert!(serde_json::from_str::<LayoutKind>(r#""spiral""#).is_err());
    }
}
