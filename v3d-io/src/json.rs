//! JSON scene files

use std::fs;
use std::path::Path;

use tracing::info;
use v3d_core::{Result, SceneDocument};

use crate::{IoError, SceneReader, SceneWriter};

/// Reader/writer for `.json` scene documents
pub struct JsonScene;

impl SceneReader for JsonScene {
    fn read_scene<P: AsRef<Path>>(path: P) -> Result<SceneDocument> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(IoError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let text = fs::read_to_string(path).map_err(IoError::from)?;
        let document = SceneDocument::from_json_str(&text).map_err(|e| IoError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let (points, segments) = document.counts();
        info!(path = %path.display(), points, segments, "scene loaded");
        Ok(document)
    }
}

impl SceneWriter for JsonScene {
    fn write_scene<P: AsRef<Path>>(document: &SceneDocument, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = document.to_json_pretty().map_err(|e| IoError::WriteError {
            message: e.to_string(),
        })?;
        fs::write(path, text).map_err(IoError::from)?;

        let (points, segments) = document.counts();
        info!(path = %path.display(), points, segments, "scene exported");
        Ok(())
    }
}
