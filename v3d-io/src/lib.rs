//! I/O operations for scene documents
//!
//! Scenes are stored as JSON documents with a `points` and a `segments`
//! array (see [`v3d_core::SceneDocument`]). Reading is permissive about the
//! document shape but reports files that are missing or not JSON at all.

pub mod error;
pub mod json;

pub use error::*;
pub use json::*;

use std::path::Path;

use v3d_core::{Result, SceneDocument, SceneModel};

/// Trait for reading scene documents from files
pub trait SceneReader {
    fn read_scene<P: AsRef<Path>>(path: P) -> Result<SceneDocument>;
}

/// Trait for writing scene documents to files
pub trait SceneWriter {
    fn write_scene<P: AsRef<Path>>(document: &SceneDocument, path: P) -> Result<()>;
}

/// Read a scene document from a JSON file
pub fn read_scene<P: AsRef<Path>>(path: P) -> Result<SceneDocument> {
    JsonScene::read_scene(path)
}

/// Write a scene document as pretty-printed JSON
pub fn write_scene<P: AsRef<Path>>(document: &SceneDocument, path: P) -> Result<()> {
    JsonScene::write_scene(document, path)
}

/// Load a file into `model`. On failure the model is left untouched.
pub fn load_into<P: AsRef<Path>>(model: &mut SceneModel, path: P) -> Result<()> {
    let document = read_scene(path)?;
    model.set_document(document);
    Ok(())
}

/// Export the current contents of `model`
pub fn export_model<P: AsRef<Path>>(model: &SceneModel, path: P) -> Result<()> {
    write_scene(&model.to_document(), path)
}
