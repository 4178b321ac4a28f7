//! Visualization and rendering for v3d scenes
//!
//! This crate turns a [`v3d_core::SceneModel`] into a handful of batched
//! draw objects and lets the user pick and select points:
//! - Point glyph, line, highlight and grid batches
//! - Two-stage click picking with multi-select
//! - Orbit camera with framing and projection
//! - A session façade tying scene, renderer and subscriber together
//!
//! Rendering goes through the [`RenderBackend`] trait; [`HeadlessBackend`]
//! implements it on the CPU.

pub mod backend;
pub mod camera;
pub mod config;
pub mod grid;
pub mod headless;
pub mod renderer;
pub mod selection;
pub mod session;

pub use backend::*;
pub use camera::*;
pub use config::*;
pub use grid::*;
pub use headless::*;
pub use renderer::*;
pub use selection::*;
pub use session::*;
