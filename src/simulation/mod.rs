//! Force-directed simulation.
//!
//! Particles live in a flat arena owned by [`Simulation`]; links refer to them
//! by index. One [`Simulation::step`] cools alpha, applies the link, charge and
//! centering forces, then integrates velocity into position. Callers only ever
//! see immutable [`PositionedGraph`] snapshots taken between steps.
//!
//! Time-stepping against a scheduler, with cancellation, is the job of
//! [`SimulationClock`].

use std::f64::consts::PI;

use tracing::{debug, warn};

use crate::error::{CayleyError, Result};
use crate::layout::{edge_id, Bounds, Hierarchy, PositionedEdge, PositionedGraph, PositionedNode};
use crate::tree::TreeNode;

mod clock;
mod forces;

pub use clock::{SimulationClock, Subscription, TickOutcome};

use forces::{Jiggle, LinkSpring};

/// Tuning for the force strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceConfig {
    /// Rest length of every parent-child spring.
    pub link_distance: f64,
    /// Pairwise charge; negative repels.
    pub charge_strength: f64,
    /// How strongly the centroid is pulled onto the bounds center (1 = fully).
    pub center_strength: f64,
    /// Fraction of velocity lost per step.
    pub velocity_decay: f64,
    /// The simulation counts as settled once alpha falls below this.
    pub alpha_min: f64,
    pub alpha_decay: f64,
    /// Hard step budget.
    pub max_steps: usize,
}

impl Default for ForceConfig {
    fn default() -> Self {
        let alpha_min: f64 = 0.001;
        Self {
            link_distance: 100.0,
            charge_strength: -200.0,
            center_strength: 1.0,
            velocity_decay: 0.4,
            alpha_min,
            // reach alpha_min in ~300 steps
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            max_steps: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParticle {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub(crate) vx: f64,
    pub(crate) vy: f64,
}

impl SimulationParticle {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            vx: 0.0,
            vy: 0.0,
        }
    }
}

/// A parent-child spring between two particle indices.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationLink {
    pub id: String,
    pub source: usize,
    pub target: usize,
}

/// Particles and links for a tree, placed on a phyllotaxis spiral around the
/// bounds center so the starting state is deterministic and overlap-free.
pub fn seed_from_tree(root: &TreeNode, bounds: Bounds) -> (Vec<SimulationParticle>, Vec<SimulationLink>) {
    const INITIAL_RADIUS: f64 = 10.0;
    let initial_angle = PI * (3.0 - 5f64.sqrt());

    let hierarchy = Hierarchy::from_tree(root);
    let (cx, cy) = bounds.center();

    let particles = hierarchy
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| {
            let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
            let angle = i as f64 * initial_angle;
            SimulationParticle::new(n.id, cx + radius * angle.cos(), cy + radius * angle.sin())
        })
        .collect();

    let links = hierarchy
        .links()
        .map(|(p, c)| SimulationLink {
            id: edge_id(hierarchy.nodes[p].id, hierarchy.nodes[c].id),
            source: p,
            target: c,
        })
        .collect();

    (particles, links)
}

/// Build a graph snapshot from particle positions.
pub fn snapshot(particles: &[SimulationParticle], links: &[SimulationLink]) -> PositionedGraph {
    let nodes: Vec<PositionedNode> = particles
        .iter()
        .map(|p| PositionedNode { id: p.id.clone(), x: p.x, y: p.y })
        .collect();
    let edges = links
        .iter()
        .map(|l| PositionedEdge {
            id: l.id.clone(),
            source: nodes[l.source].clone(),
            target: nodes[l.target].clone(),
        })
        .collect();
    PositionedGraph { nodes, edges }
}

/// Owned simulation state.
#[derive(Debug, Clone)]
pub struct Simulation {
    particles: Vec<SimulationParticle>,
    links: Vec<SimulationLink>,
    springs: Vec<LinkSpring>,
    center: (f64, f64),
    config: ForceConfig,
    alpha: f64,
    steps: usize,
    last_displacement: f64,
    jiggle: Jiggle,
}

impl Simulation {
    /// Start a simulation from the given particles. Velocities are zeroed and
    /// alpha starts at 1.
    pub fn new(
        mut particles: Vec<SimulationParticle>,
        links: Vec<SimulationLink>,
        bounds: Bounds,
        config: ForceConfig,
    ) -> Result<Self> {
        bounds.validate()?;
        for link in &links {
            if link.source >= particles.len() || link.target >= particles.len() {
                return Err(CayleyError::parameter(
                    "links",
                    format!("link '{}' refers to a particle that does not exist", link.id),
                ));
            }
        }
        if let Some(p) = particles.iter().find(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(CayleyError::parameter(
                "particles",
                format!("particle '{}' has a non-finite position", p.id),
            ));
        }

        for p in &mut particles {
            p.vx = 0.0;
            p.vy = 0.0;
        }
        let springs = forces::springs(particles.len(), &links, config.link_distance);

        debug!(
            particles = particles.len(),
            links = links.len(),
            "simulation started"
        );

        Ok(Self {
            particles,
            links,
            springs,
            center: bounds.center(),
            config,
            alpha: 1.0,
            steps: 0,
            last_displacement: 0.0,
            jiggle: Jiggle::default(),
        })
    }

    pub fn from_tree(root: &TreeNode, bounds: Bounds, config: ForceConfig) -> Result<Self> {
        let (particles, links) = seed_from_tree(root, bounds);
        Self::new(particles, links, bounds, config)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn config(&self) -> &ForceConfig {
        &self.config
    }

    /// Largest distance any particle moved during the last step.
    pub fn last_displacement(&self) -> f64 {
        self.last_displacement
    }

    pub fn is_settled(&self) -> bool {
        self.alpha < self.config.alpha_min
    }

    /// Advance one step.
    pub fn step(&mut self) {
        self.alpha += (0.0 - self.alpha) * self.config.alpha_decay;
        let alpha = self.alpha;

        let before: Vec<(f64, f64)> = self.particles.iter().map(|p| (p.x, p.y)).collect();

        forces::apply_links(&mut self.particles, &self.springs, alpha, &mut self.jiggle);
        forces::apply_charge(&mut self.particles, self.config.charge_strength, alpha, &mut self.jiggle);
        forces::apply_centering(&mut self.particles, self.center, self.config.center_strength);

        let keep = 1.0 - self.config.velocity_decay;
        for p in &mut self.particles {
            p.vx *= keep;
            p.vy *= keep;
            p.x += p.vx;
            p.y += p.vy;
        }

        self.last_displacement = self
            .particles
            .iter()
            .zip(&before)
            .map(|(p, &(x, y))| (p.x - x).hypot(p.y - y))
            .fold(0.0, f64::max);
        self.steps += 1;
    }

    /// Step until settled or the step budget runs out. Returns the number of
    /// steps taken by this call.
    pub fn run(&mut self) -> usize {
        let start = self.steps;
        while !self.is_settled() && self.steps < self.config.max_steps {
            self.step();
        }
        if !self.is_settled() {
            warn!(steps = self.steps, alpha = self.alpha, "simulation hit its step budget before settling");
        }
        self.steps - start
    }

    pub fn snapshot(&self) -> PositionedGraph {
        snapshot(&self.particles, &self.links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::build_tree;

    const BOUNDS: Bounds = Bounds { width: 800.0, height: 600.0 };

    #[test]
    fn test_seed_is_deterministic_and_distinct() {
        let tree = build_tree(3);
        let (a, links) = seed_from_tree(&tree, BOUNDS);
        let (b, _) = seed_from_tree(&tree, BOUNDS);
        assert_eq!(a, b);
        assert_eq!(a.len(), 85);
        assert_eq!(links.len(), 84);
        for i in 0..a.len() {
            for j in (i + 1)..a.len() {
                assert!((a[i].x, a[i].y) != (a[j].x, a[j].y));
            }
        }
    }

    #[test]
    fn test_alpha_decays_monotonically() {
        let mut sim = Simulation::from_tree(&build_tree(2), BOUNDS, ForceConfig::default()).unwrap();
        let mut last = sim.alpha();
        assert_eq!(last, 1.0);
        for _ in 0..50 {
            sim.step();
            assert!(sim.alpha() < last);
            last = sim.alpha();
        }
    }

    #[test]
    fn test_settles_with_small_motion() {
        let mut sim = Simulation::from_tree(&build_tree(3), BOUNDS, ForceConfig::default()).unwrap();
        let steps = sim.run();
        assert!(sim.is_settled());
        assert!(steps <= 310, "took {steps} steps");
        assert!(sim.last_displacement() < 0.05, "still moving {}", sim.last_displacement());
        let graph = sim.snapshot();
        assert!(graph.nodes.iter().all(|n| n.x.is_finite() && n.y.is_finite()));
    }

    #[test]
    fn test_centroid_tracks_bounds_center() {
        let mut sim = Simulation::from_tree(&build_tree(2), BOUNDS, ForceConfig::default()).unwrap();
        sim.run();
        let graph = sim.snapshot();
        let n = graph.nodes.len() as f64;
        let cx = graph.nodes.iter().map(|p| p.x).sum::<f64>() / n;
        let cy = graph.nodes.iter().map(|p| p.y).sum::<f64>() / n;
        assert!((cx - 400.0).abs() < 1.0, "cx = {cx}");
        assert!((cy - 300.0).abs() < 1.0, "cy = {cy}");
    }

    #[test]
    fn test_links_pull_toward_rest_length() {
        let mut sim = Simulation::from_tree(&build_tree(1), BOUNDS, ForceConfig::default()).unwrap();
        sim.run();
        let graph = sim.snapshot();
        for edge in &graph.edges {
            let len = (edge.source.x - edge.target.x).hypot(edge.source.y - edge.target.y);
            assert!(len > 50.0 && len < 200.0, "{} has length {len}", edge.id);
        }
    }

    #[test]
    fn test_coincident_particles_stay_finite() {
        let particles = vec![
            SimulationParticle::new("a", 10.0, 10.0),
            SimulationParticle::new("b", 10.0, 10.0),
            SimulationParticle::new("c", 10.0, 10.0),
        ];
        let links = vec![SimulationLink { id: "a->b".into(), source: 0, target: 1 }];
        let mut sim = Simulation::new(particles, links, BOUNDS, ForceConfig::default()).unwrap();
        sim.run();
        let graph = sim.snapshot();
        assert!(graph.nodes.iter().all(|n| n.x.is_finite() && n.y.is_finite()));
        assert!(graph.nodes[0].x != graph.nodes[2].x || graph.nodes[0].y != graph.nodes[2].y);
    }

    #[test]
    fn test_single_particle() {
        let mut sim = Simulation::from_tree(&build_tree(0), BOUNDS, ForceConfig::default()).unwrap();
        sim.run();
        let graph = sim.snapshot();
        assert_eq!(graph.nodes.len(), 1);
        assert!((graph.nodes[0].x - 400.0).abs() < 1e-9);
        assert!((graph.nodes[0].y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_dangling_links() {
        let particles = vec![SimulationParticle::new("a", 0.0, 0.0)];
        let links = vec![SimulationLink { id: "a->b".into(), source: 0, target: 1 }];
        assert!(Simulation::new(particles, links, BOUNDS, ForceConfig::default()).is_err());
    }

    #[test]
    fn test_step_budget_bounds_run() {
        let config = ForceConfig { max_steps: 10, ..ForceConfig::default() };
        let mut sim = Simulation::from_tree(&build_tree(2), BOUNDS, config).unwrap();
        assert_eq!(sim.run(), 10);
        assert!(!sim.is_settled());
    }
}
