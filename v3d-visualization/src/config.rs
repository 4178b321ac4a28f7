//! Renderer and viewer configuration
//!
//! Every threshold used by batching, highlighting and picking lives here
//! rather than in the code. [`ViewerConfig`] groups everything a viewer
//! needs and round-trips through a RON file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use v3d_algorithms::PickParams;
use v3d_core::{Error, RandomSceneParams, Result, Rgb8, DEFAULT_POINT_SIZE};
use v3d_subscriber::SubscriberConfig;

/// Background grid geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub half_extent: f32,
    pub spacing: f32,
    pub color: Rgb8,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            half_extent: 10.0,
            spacing: 1.0,
            color: [178, 178, 178],
        }
    }
}

/// Batching, highlight and picking parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Glyph scale per unit of point size
    pub size_scale: f32,
    /// Size used for points that carry none
    pub default_size: f32,
    /// Scale multiplier applied to selected points
    pub highlight_scale: f32,
    pub highlight_color: Rgb8,
    pub pick: PickParams,
    pub grid: GridConfig,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            size_scale: 0.05,
            default_size: DEFAULT_POINT_SIZE as f32,
            highlight_scale: 2.5,
            highlight_color: [255, 255, 0],
            pick: PickParams::default(),
            grid: GridConfig::default(),
        }
    }
}

/// Everything a viewer session is configured with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub renderer: RendererConfig,
    pub subscriber: SubscriberConfig,
    pub random_scene: RandomSceneParams,
    /// Viewport size in pixels
    pub viewport: (u32, u32),
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            renderer: RendererConfig::default(),
            subscriber: SubscriberConfig::default(),
            random_scene: RandomSceneParams::new(50, 10),
            viewport: (1000, 700),
        }
    }
}

impl ViewerConfig {
    /// Load from a RON file, falling back to defaults if the file is
    /// missing or unreadable
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                warn!("Using default config, {:?} not usable: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        ron::from_str(&content).map_err(|e| Error::InvalidData(format!("config parse error: {}", e)))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| Error::InvalidData(format!("config serialize error: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
