// Force-directed layout, run to settlement in one call.
//
// The animated variant steps the same simulation through a SimulationClock;
// this one is for callers that only want the final positions.

use crate::error::Result;
use crate::layout::{Bounds, LayoutStrategy, PositionedGraph};
use crate::simulation::{ForceConfig, Simulation};
use crate::tree::TreeNode;

#[derive(Debug, Clone, Default)]
pub struct ForceLayout {
    pub config: ForceConfig,
}

impl LayoutStrategy for ForceLayout {
    fn layout(&self, root: &TreeNode, bounds: Bounds) -> Result<PositionedGraph> {
        bounds.validate()?;
        let mut sim = Simulation::from_tree(root, bounds, self.config.clone())?;
        sim.run();
        Ok(sim.snapshot())
    }
}
