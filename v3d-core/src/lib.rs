//! Core data structures and traits for v3d
//!
//! This crate provides the scene model shared by every other v3d crate:
//! colored points, colored line segments, the permissive scene document
//! used on disk and on the wire, and the traits the renderer and the
//! spatial index are written against.

pub mod point;
pub mod document;
pub mod scene;
pub mod traits;
pub mod error;

pub use point::*;
pub use document::*;
pub use scene::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point2, Point3, Vector3};
