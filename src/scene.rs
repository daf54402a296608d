//! Composition root.
//!
//! [`CayleyView`] owns one tree and everything derived from it: the current
//! positioned graph, the simulation clock (force strategy only), the view
//! transform and the hover/selection state. Each piece has exactly one writer:
//! layout passes and clock ticks write the graph, gestures write the
//! transform, pointer enter/leave/click write the interaction state.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use serde::Deserialize;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::interaction::InteractionState;
use crate::layout::{layout_tree, Bounds, LayoutKind, PositionedGraph};
use crate::output::{EdgeOutput, NodeOutput, SceneOutput};
use crate::simulation::{self, SimulationClock, Subscription, TickOutcome};
use crate::tree::{build_tree, TreeNode};
use crate::view::{PanZoomDelta, ViewTransform};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerEventKind {
    Enter,
    Leave,
    Click,
}

/// Raw pointer input forwarded by the renderer. Drags and wheel gestures carry
/// a `pointerDelta`; enter/leave/click carry the id under the pointer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PointerEvent {
    pub target_id: Option<String>,
    pub event_kind: Option<PointerEventKind>,
    pub pointer_delta: Option<PanZoomDelta>,
}

impl PointerEvent {
    pub fn on(kind: PointerEventKind, id: impl Into<String>) -> Self {
        PointerEvent {
            target_id: Some(id.into()),
            event_kind: Some(kind),
            pointer_delta: None,
        }
    }

    pub fn gesture(delta: PanZoomDelta) -> Self {
        PointerEvent {
            pointer_delta: Some(delta),
            ..Default::default()
        }
    }
}

pub struct CayleyView {
    config: EngineConfig,
    tree: TreeNode,
    /// Shared with the clock callback, which swaps in each new snapshot.
    graph: Rc<RefCell<PositionedGraph>>,
    clock: SimulationClock,
    subscription: Option<Subscription>,
    transform: ViewTransform,
    interaction: InteractionState,
}

impl CayleyView {
    /// Build the tree and run the first layout pass.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let tree = build_tree(config.tree_depth()?);
        let mut view = CayleyView {
            config,
            tree,
            graph: Rc::new(RefCell::new(PositionedGraph::default())),
            clock: SimulationClock::new(),
            subscription: None,
            transform: ViewTransform::default(),
            interaction: InteractionState::new(),
        };
        view.relayout()?;
        Ok(view)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::new(EngineConfig::from_json(json)?)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tree(&self) -> &TreeNode {
        &self.tree
    }

    pub fn graph(&self) -> Ref<'_, PositionedGraph> {
        self.graph.borrow()
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn is_animating(&self) -> bool {
        self.clock.is_running()
    }

    /// Apply a new configuration. The tree is rebuilt only if the depth
    /// changed; the layout is always recomputed. Nothing changes on error.
    pub fn reconfigure(&mut self, config: EngineConfig) -> Result<()> {
        config.validate()?;
        let depth = config.tree_depth()?;
        if depth != self.config.tree_depth()? {
            self.tree = build_tree(depth);
        }
        self.config = config;
        self.relayout()
    }

    pub fn set_strategy(&mut self, strategy: LayoutKind) -> Result<()> {
        self.reconfigure(EngineConfig { strategy, ..self.config.clone() })
    }

    pub fn set_bounds(&mut self, bounds: Bounds) -> Result<()> {
        self.reconfigure(EngineConfig { bounds, ..self.config.clone() })
    }

    pub fn set_depth(&mut self, depth: u32) -> Result<()> {
        self.reconfigure(EngineConfig { depth: i64::from(depth), ..self.config.clone() })
    }

    /// Recompute the graph with the current strategy. Any running simulation
    /// is cancelled before the new pass starts.
    fn relayout(&mut self) -> Result<()> {
        if let Some(sub) = self.subscription.take() {
            sub.cancel();
        }
        self.clock.stop();

        let cfg = self.config.layout_config();
        let bounds = self.config.bounds;
        match self.config.strategy {
            LayoutKind::Force => {
                let (particles, links) = simulation::seed_from_tree(&self.tree, bounds);
                *self.graph.borrow_mut() = simulation::snapshot(&particles, &links);
                let slot = Rc::clone(&self.graph);
                let sub = self.clock.start(particles, links, bounds, cfg.force, move |snapshot| {
                    *slot.borrow_mut() = snapshot;
                })?;
                self.subscription = Some(sub);
            }
            kind => {
                let graph = layout_tree(&self.tree, bounds, kind, &cfg)?;
                *self.graph.borrow_mut() = graph;
            }
        }

        let graph = self.graph.borrow();
        self.interaction.retain(|id| graph.contains(id));
        debug!(strategy = self.config.strategy.name(), "relayout");
        Ok(())
    }

    /// Advance the force simulation by one step. A no-op for the static
    /// strategies.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.clock.tick();
        if !outcome.is_running() {
            self.subscription = None;
        }
        outcome
    }

    /// Tick until the current simulation ends. Returns the number of steps.
    pub fn settle(&mut self) -> usize {
        let steps = self.clock.run_to_end();
        self.subscription = None;
        steps
    }

    /// Route one pointer event. Gesture deltas move the view; enter/leave/click
    /// update hover and selection. Ids missing from the current graph are
    /// ignored.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<()> {
        if let Some(delta) = event.pointer_delta {
            self.transform.on_pan_zoom(delta)?;
        }

        let (Some(kind), Some(id)) = (event.event_kind, event.target_id.as_deref()) else {
            return Ok(());
        };
        if !self.graph.borrow().contains(id) {
            debug!(id, "pointer event for unknown id ignored");
            return Ok(());
        }

        match kind {
            PointerEventKind::Enter => {
                self.interaction.set_hover(Some(id));
            }
            // a late leave from a previous target must not clear the new hover
            PointerEventKind::Leave if self.interaction.is_hovered(id) => {
                self.interaction.set_hover(None);
            }
            PointerEventKind::Leave => {}
            PointerEventKind::Click => self.interaction.toggle_select(id),
        }
        Ok(())
    }

    pub fn pan_zoom(&mut self, delta: PanZoomDelta) -> Result<()> {
        self.transform.on_pan_zoom(delta)
    }

    pub fn reset_view(&mut self) {
        self.transform.reset();
    }

    /// Snapshot of everything the renderer draws.
    pub fn scene(&self) -> SceneOutput {
        let graph = self.graph.borrow();
        let flags = |id: &str| (self.interaction.is_hovered(id), self.interaction.is_selected(id));

        let nodes = graph
            .nodes
            .iter()
            .map(|n| {
                let (hovered, selected) = flags(&n.id);
                NodeOutput { id: n.id.clone(), x: n.x, y: n.y, hovered, selected }
            })
            .collect();
        let edges = graph
            .edges
            .iter()
            .map(|e| {
                let (hovered, selected) = flags(&e.id);
                EdgeOutput {
                    id: e.id.clone(),
                    source_x: e.source.x,
                    source_y: e.source.y,
                    target_x: e.target.x,
                    target_y: e.target.y,
                    hovered,
                    selected,
                }
            })
            .collect();

        SceneOutput {
            strategy: self.config.strategy,
            nodes,
            edges,
            hovered_id: self.interaction.hovered_id().map(str::to_owned),
            selected_id: self.interaction.selected_id().map(str::to_owned),
            transform: self.transform,
            animating: self.is_animating(),
            error: None,
        }
    }
}

impl Drop for CayleyView {
    fn drop(&mut self) {
        self.clock.stop();
    }
}
