//! Time-stepping for the force strategy.
//!
//! The clock does not own a timer. Whoever drives it (a requestAnimationFrame
//! loop in the browser, a plain loop in tests) calls [`SimulationClock::tick`]
//! once per frame; each tick runs one simulation step and hands a fresh
//! snapshot to the subscriber's callback. Ticks and input events are handled to
//! completion one at a time, so the callback never overlaps anything else.
//!
//! Cancellation goes through the [`Subscription`] returned by `start`, either
//! explicitly or by dropping it. After cancellation the callback is never
//! called again. Starting again replaces the current run outright: the old
//! subscription goes inactive and cannot touch the new run.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use super::{ForceConfig, Simulation, SimulationLink, SimulationParticle};
use crate::error::Result;
use crate::layout::{Bounds, PositionedGraph};

type TickCallback = Box<dyn FnMut(PositionedGraph)>;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing was running.
    Idle,
    /// A step ran and more are needed.
    Running,
    /// A step ran and alpha fell below the threshold; the run is over.
    Settled,
    /// A step ran and used up the step budget; the run is over.
    Exhausted,
    /// The subscription had been cancelled; no step ran.
    Cancelled,
}

impl TickOutcome {
    pub fn is_running(&self) -> bool {
        matches!(self, TickOutcome::Running)
    }
}

/// Handle to a running simulation. Dropping it cancels the run.
#[must_use = "dropping a Subscription cancels the simulation"]
#[derive(Debug)]
pub struct Subscription {
    live: Rc<Cell<bool>>,
}

impl Subscription {
    pub fn cancel(&self) {
        self.live.set(false);
    }

    /// False once cancelled, settled, exhausted or replaced by a newer run.
    pub fn is_active(&self) -> bool {
        self.live.get()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.live.set(false);
    }
}

struct Run {
    simulation: Simulation,
    callback: TickCallback,
    live: Rc<Cell<bool>>,
}

impl Run {
    fn finish(self) {
        self.live.set(false);
    }
}

#[derive(Default)]
pub struct SimulationClock {
    run: Option<Run>,
    generation: u64,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh run, discarding any current one. Velocities are reset to
    /// zero and alpha to 1.
    pub fn start(
        &mut self,
        particles: Vec<SimulationParticle>,
        links: Vec<SimulationLink>,
        bounds: Bounds,
        config: ForceConfig,
        callback: impl FnMut(PositionedGraph) + 'static,
    ) -> Result<Subscription> {
        self.stop();
        let simulation = Simulation::new(particles, links, bounds, config)?;
        let live = Rc::new(Cell::new(true));
        self.generation += 1;
        debug!(generation = self.generation, "simulation clock started");
        self.run = Some(Run {
            simulation,
            callback: Box::new(callback),
            live: Rc::clone(&live),
        });
        Ok(Subscription { live })
    }

    /// Drop the current run without firing its callback again.
    pub fn stop(&mut self) {
        if let Some(run) = self.run.take() {
            debug!(generation = self.generation, steps = run.simulation.steps(), "simulation clock stopped");
            run.finish();
        }
    }

    pub fn is_running(&self) -> bool {
        self.run.as_ref().is_some_and(|r| r.live.get())
    }

    /// Number of runs started so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn alpha(&self) -> Option<f64> {
        self.run.as_ref().map(|r| r.simulation.alpha())
    }

    /// Run one step and publish its snapshot.
    pub fn tick(&mut self) -> TickOutcome {
        let Some(run) = self.run.as_mut() else {
            return TickOutcome::Idle;
        };
        if !run.live.get() {
            debug!(generation = self.generation, "simulation cancelled");
            self.run = None;
            return TickOutcome::Cancelled;
        }

        run.simulation.step();
        let snapshot = run.simulation.snapshot();
        trace!(
            step = run.simulation.steps(),
            alpha = run.simulation.alpha(),
            moved = run.simulation.last_displacement(),
            "tick"
        );
        (run.callback)(snapshot);

        let outcome = if run.simulation.is_settled() {
            debug!(steps = run.simulation.steps(), "simulation settled");
            TickOutcome::Settled
        } else if run.simulation.steps() >= run.simulation.config().max_steps {
            warn!(
                steps = run.simulation.steps(),
                alpha = run.simulation.alpha(),
                "simulation stopped at its step budget"
            );
            TickOutcome::Exhausted
        } else {
            TickOutcome::Running
        };

        if !outcome.is_running() {
            if let Some(run) = self.run.take() {
                run.finish();
            }
        }
        outcome
    }

    /// Tick until the run ends. Returns the number of steps taken.
    pub fn run_to_end(&mut self) -> usize {
        let mut steps = 0;
        loop {
            match self.tick() {
                TickOutcome::Running => steps += 1,
                TickOutcome::Settled | TickOutcome::Exhausted => return steps + 1,
                TickOutcome::Idle | TickOutcome::Cancelled => return steps,
            }
        }
    }
}
