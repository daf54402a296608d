//! Pan/zoom view transform.
//!
//! Maps layout space to view space as `view = layout * scale + translate`.
//! Layout output never has this baked in; the renderer applies it to the whole
//! scene, so switching layouts keeps the current pan and zoom.

use serde::{Deserialize, Serialize};

use crate::error::{CayleyError, Result};

pub const MIN_SCALE: f64 = 0.2;
pub const MAX_SCALE: f64 = 5.0;

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A point in view (screen) space.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewPoint {
    pub x: f64,
    pub y: f64,
}

/// One gesture's worth of input: a drag offset in view pixels and a
/// multiplicative zoom factor (wheel or pinch). With an anchor, zooming keeps
/// that view point fixed on screen.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PanZoomDelta {
    pub dx: f64,
    pub dy: f64,
    pub zoom: f64,
    pub anchor: Option<ViewPoint>,
}

impl Default for PanZoomDelta {
    fn default() -> Self {
        Self { dx: 0.0, dy: 0.0, zoom: 1.0, anchor: None }
    }
}

impl PanZoomDelta {
    pub fn pan(dx: f64, dy: f64) -> Self {
        Self { dx, dy, ..Self::default() }
    }

    pub fn zoom(factor: f64, anchor: Option<ViewPoint>) -> Self {
        Self { zoom: factor, anchor, ..Self::default() }
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
    };

    /// Apply a gesture. The delta is checked in full before anything changes.
    pub fn on_pan_zoom(&mut self, delta: PanZoomDelta) -> Result<()> {
        if !delta.dx.is_finite() || !delta.dy.is_finite() {
            return Err(CayleyError::parameter(
                "pointerDelta",
                format!("pan offset must be finite, got ({}, {})", delta.dx, delta.dy),
            ));
        }
        if !delta.zoom.is_finite() || delta.zoom <= 0.0 {
            return Err(CayleyError::InvalidZoom(delta.zoom));
        }
        if let Some(a) = delta.anchor {
            if !a.x.is_finite() || !a.y.is_finite() {
                return Err(CayleyError::parameter("anchor", "zoom anchor must be finite"));
            }
        }

        self.pan(delta.dx, delta.dy);
        if delta.zoom != 1.0 {
            self.zoom_about(delta.zoom, delta.anchor);
        }
        Ok(())
    }

    /// Pan is unconstrained.
    fn pan(&mut self, dx: f64, dy: f64) {
        self.translate_x += dx;
        self.translate_y += dy;
    }

    fn zoom_about(&mut self, factor: f64, anchor: Option<ViewPoint>) {
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        if let Some(a) = anchor {
            // layout point currently under the anchor stays under it
            let (lx, ly) = self.invert(a.x, a.y);
            self.translate_x = a.x - lx * new_scale;
            self.translate_y = a.y - ly * new_scale;
        }
        self.scale = new_scale;
    }

    /// Layout space -> view space.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.scale + self.translate_x, y * self.scale + self.translate_y)
    }

    /// View space -> layout space.
    pub fn invert(&self, x: f64, y: f64) -> (f64, f64) {
        ((x - self.translate_x) / self.scale, (y - self.translate_y) / self.scale)
    }

    pub fn reset(&mut self) {
        *self = Self::IDENTITY;
    }
}
