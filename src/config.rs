//! Engine configuration.
//!
//! Arrives as camelCase JSON from the frontend. Every field is optional and
//! falls back to the defaults below:
//!
//! ```json
//! { "strategy": "force", "depth": 3, "bounds": { "width": 800, "height": 600 },
//!   "linkDistance": 100, "chargeStrength": -200 }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CayleyError, Result};
use crate::layout::{Bounds, LayoutConfig, LayoutKind, MAX_EXTENT};
use crate::simulation::ForceConfig;

/// Deepest tree the engine accepts (87381 nodes).
pub const MAX_DEPTH: u32 = 8;

/// Deepest tree the force strategy accepts (1365 nodes). The charge pass is
/// quadratic, so one step already takes ~10ms here and seconds two levels down.
pub const MAX_FORCE_DEPTH: u32 = 5;

/// Upper limit for `linkDistance`.
pub const MAX_LINK_DISTANCE: f64 = MAX_EXTENT;

/// Upper limit for the magnitude of `chargeStrength`.
pub const MAX_CHARGE_STRENGTH: f64 = 1e4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub strategy: LayoutKind,
    /// Signed so that a negative depth is reported as such instead of as a
    /// type mismatch.
    pub depth: i64,
    pub bounds: Bounds,
    pub link_distance: f64,
    pub charge_strength: f64,
    pub velocity_decay: f64,
    pub alpha_min: f64,
    pub alpha_decay: f64,
    pub max_steps: usize,
    pub radial_margin: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let force = ForceConfig::default();
        let layout = LayoutConfig::default();
        Self {
            strategy: LayoutKind::Tree,
            depth: 3,
            bounds: Bounds::default(),
            link_distance: force.link_distance,
            charge_strength: force.charge_strength,
            velocity_decay: force.velocity_decay,
            alpha_min: force.alpha_min,
            alpha_decay: force.alpha_decay,
            max_steps: force.max_steps,
            radial_margin: layout.radial_margin,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: EngineConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let depth = self.tree_depth()?;
        if self.strategy == LayoutKind::Force && depth > MAX_FORCE_DEPTH {
            return Err(CayleyError::InvalidDepth { depth: self.depth, max: MAX_FORCE_DEPTH });
        }
        self.bounds.validate()?;

        if !(self.link_distance > 0.0 && self.link_distance <= MAX_LINK_DISTANCE) {
            return Err(CayleyError::parameter(
                "linkDistance",
                format!("must be within (0, {MAX_LINK_DISTANCE}]"),
            ));
        }
        if self.charge_strength.is_nan() || self.charge_strength.abs() > MAX_CHARGE_STRENGTH {
            return Err(CayleyError::parameter(
                "chargeStrength",
                format!("must be within [-{MAX_CHARGE_STRENGTH}, {MAX_CHARGE_STRENGTH}]"),
            ));
        }
        if !(0.0..=1.0).contains(&self.velocity_decay) {
            return Err(CayleyError::parameter("velocityDecay", "must be within [0, 1]"));
        }
        if !(self.alpha_min > 0.0 && self.alpha_min < 1.0) {
            return Err(CayleyError::parameter("alphaMin", "must be within (0, 1)"));
        }
        if !(self.alpha_decay > 0.0 && self.alpha_decay < 1.0) {
            return Err(CayleyError::parameter("alphaDecay", "must be within (0, 1)"));
        }
        if self.max_steps == 0 {
            return Err(CayleyError::parameter("maxSteps", "must be at least 1"));
        }
        if !(self.radial_margin.is_finite() && self.radial_margin >= 0.0) {
            return Err(CayleyError::parameter("radialMargin", "must be non-negative and finite"));
        }
        Ok(())
    }

    pub fn tree_depth(&self) -> Result<u32> {
        u32::try_from(self.depth)
            .ok()
            .filter(|d| *d <= MAX_DEPTH)
            .ok_or(CayleyError::InvalidDepth { depth: self.depth, max: MAX_DEPTH })
    }

    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            radial_margin: self.radial_margin,
            force: ForceConfig {
                link_distance: self.link_distance,
                charge_strength: self.charge_strength,
                velocity_decay: self.velocity_decay,
                alpha_min: self.alpha_min,
                alpha_decay: self.alpha_decay,
                max_steps: self.max_steps,
                ..ForceConfig::default()
            },
        }
    }
}
