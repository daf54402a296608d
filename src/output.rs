//! Output types for frontend consumption.
//!
//! These structs are serialized to JSON and handed to the renderer, which only
//! draws what it is given and forwards pointer events back.

use serde::Serialize;

use crate::error::CayleyError;
use crate::layout::LayoutKind;
use crate::view::ViewTransform;

/// A node ready to be drawn, in layout space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeOutput {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub hovered: bool,
    pub selected: bool,
}

/// A parent-child line, endpoints in layout space.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeOutput {
    pub id: String,
    pub source_x: f64,
    pub source_y: f64,
    pub target_x: f64,
    pub target_y: f64,
    pub hovered: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    pub message: String,
    /// Short machine-readable error class, e.g. "bounds" or "config".
    pub kind: &'static str,
}

impl From<&CayleyError> for ErrorInfo {
    fn from(err: &CayleyError) -> Self {
        let kind = match err {
            CayleyError::InvalidBounds { .. } => "bounds",
            CayleyError::InvalidDepth { .. } => "depth",
            CayleyError::InvalidZoom(_) => "zoom",
            CayleyError::InvalidParameter { .. } => "parameter",
            CayleyError::Config(_) => "config",
        };
        ErrorInfo { message: err.to_string(), kind }
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneOutput {
    pub strategy: LayoutKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeOutput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<EdgeOutput>,
    pub hovered_id: Option<String>,
    pub selected_id: Option<String>,
    pub transform: ViewTransform,
    /// True while a force simulation is still publishing frames.
    pub animating: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl SceneOutput {
    /// An empty scene carrying only an error.
    pub fn from_error(err: &CayleyError) -> Self {
        SceneOutput {
            strategy: LayoutKind::default(),
            nodes: vec![],
            edges: vec![],
            hovered_id: None,
            selected_id: None,
            transform: ViewTransform::IDENTITY,
            animating: false,
            error: Some(ErrorInfo::from(err)),
        }
    }
}
