//! Cayley tree layout engine.
//!
//! Builds a complete 4-ary tree to a chosen depth and positions it with one of
//! three interchangeable strategies: a layered tidy tree, a radial cluster, or
//! an animated force simulation. The renderer receives plain positioned
//! nodes and edges plus hover/selection flags and a pan/zoom transform, and
//! forwards pointer events back.

pub mod config;
pub mod error;
pub mod interaction;
pub mod layout;
pub mod output;
pub mod scene;
pub mod simulation;
pub mod tree;
pub mod view;

#[cfg(target_arch = "wasm32")]
mod wasm;

pub use config::{EngineConfig, MAX_CHARGE_STRENGTH, MAX_DEPTH, MAX_FORCE_DEPTH, MAX_LINK_DISTANCE};
pub use error::{CayleyError, Result};
pub use interaction::InteractionState;
pub use layout::{
    layout_tree, Bounds, LayoutConfig, LayoutKind, LayoutStrategy, PositionedEdge, PositionedGraph,
    PositionedNode, MAX_EXTENT,
};
pub use output::SceneOutput;
pub use scene::{CayleyView, PointerEvent, PointerEventKind};
pub use simulation::{ForceConfig, Simulation, SimulationClock, Subscription, TickOutcome};
pub use tree::{build_tree, TreeNode};
pub use view::{PanZoomDelta, ViewPoint, ViewTransform};
