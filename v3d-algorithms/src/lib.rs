//! # v3d Algorithms
//!
//! Spatial queries over the scene's points: a k-d tree index rebuilt on
//! every render, and the screen-space pick resolution that turns a pointer
//! click into a point index.

pub mod nearest_neighbor;
pub mod picking;

// Re-export commonly used items
pub use nearest_neighbor::*;
pub use picking::*;
