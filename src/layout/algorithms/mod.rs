//! Layout algorithms for Cayley trees.
//!
//! This module contains all available layout strategies:
//! - `tidy`: layered top-down tree (Buchheim/Walker tidy layout)
//! - `cluster`: radial cluster layout with leaves spread over the full circle
//! - `force`: force-directed layout, run to settlement

mod cluster;
mod force;
mod tidy;

pub use cluster::RadialClusterLayout;
pub use force::ForceLayout;
pub use tidy::TidyTreeLayout;
