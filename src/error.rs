//! Error types for the layout engine.
//!
//! Everything here is a caller contract violation: the engine never retries and
//! never swallows these, they go straight back to whoever made the call.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CayleyError>;

#[derive(Debug, Error)]
pub enum CayleyError {
    #[error("bounds must be positive and at most 1e6 per side, got {width}x{height}")]
    InvalidBounds { width: f64, height: f64 },

    #[error("tree depth {depth} is out of range (0..={max})")]
    InvalidDepth { depth: i64, max: u32 },

    #[error("zoom factor must be positive and finite, got {0}")]
    InvalidZoom(f64),

    #[error("invalid value for `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("malformed configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl CayleyError {
    pub(crate) fn parameter(name: &'static str, reason: impl Into<String>) -> Self {
        CayleyError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
