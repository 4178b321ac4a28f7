//! Point and segment types

use std::fmt;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::document::lenient;

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// RGBA color, each channel in `[0, 1]`
pub type Rgba = [f64; 4];

/// Opaque 8-bit RGB color as uploaded to the point and line batches
pub type Rgb8 = [u8; 3];

/// Display size used when a point carries none
pub const DEFAULT_POINT_SIZE: f64 = 6.0;

/// Color used when a point or segment carries none
pub const DEFAULT_COLOR: Rgba = [1.0, 1.0, 1.0, 1.0];

/// Clamp each float channel to `[0, 1]` and truncate to 8 bits. Alpha is dropped.
pub fn quantize_rgb(color: &Rgba) -> Rgb8 {
    let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0) as u8;
    [channel(color[0]), channel(color[1]), channel(color[2])]
}

/// Narrow a document value to render precision, saturating at the `f32`
/// range instead of overflowing to infinity
pub fn narrow(value: f64) -> f32 {
    value.clamp(f32::MIN as f64, f32::MAX as f64) as f32
}

/// Point identifier, kept as the JSON string or number it was given as
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointId::Text(text) => f.write_str(text),
            PointId::Number(number) => write!(f, "{}", number),
        }
    }
}

impl From<&str> for PointId {
    fn from(text: &str) -> Self {
        PointId::Text(text.to_string())
    }
}

impl From<String> for PointId {
    fn from(text: String) -> Self {
        PointId::Text(text)
    }
}

impl From<u64> for PointId {
    fn from(number: u64) -> Self {
        PointId::Number(number.into())
    }
}

/// A colored, sized point of the scene.
///
/// Fields keep full document precision; absent optional fields stay absent
/// so that a document survives an import/export cycle unchanged. Defaults
/// and the narrowing to `f32` are applied when rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::id")]
    pub id: Option<PointId>,
    #[serde(default, deserialize_with = "lenient::coordinate")]
    pub x: f64,
    #[serde(default, deserialize_with = "lenient::coordinate")]
    pub y: f64,
    #[serde(default, deserialize_with = "lenient::coordinate")]
    pub z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::scalar")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::color")]
    pub color: Option<Rgba>,
}

impl Point {
    /// Create a point at the given coordinates with default size and color
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            id: None,
            x,
            y,
            z,
            size: None,
            color: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<PointId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }

    pub fn coordinates(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Render-precision position
    pub fn position(&self) -> Point3f {
        Point3f::new(narrow(self.x), narrow(self.y), narrow(self.z))
    }

    /// Size with the default applied
    pub fn display_size(&self) -> f64 {
        self.size.unwrap_or(DEFAULT_POINT_SIZE)
    }

    /// Color with the default applied
    pub fn display_color(&self) -> Rgba {
        self.color.unwrap_or(DEFAULT_COLOR)
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl From<&Point> for Point3f {
    fn from(point: &Point) -> Self {
        point.position()
    }
}

/// A colored line segment. Segments without both endpoints are kept in the
/// model but never drawn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::vec3")]
    pub start: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::vec3")]
    pub end: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::color")]
    pub color: Option<Rgba>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::scalar")]
    pub width: Option<f64>,
}

impl Segment {
    pub fn new(start: [f64; 3], end: [f64; 3]) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            color: None,
            width: None,
        }
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// Both endpoints at render precision, if the segment is drawable
    pub fn endpoints(&self) -> Option<(Point3f, Point3f)> {
        let to_point = |c: [f64; 3]| Point3f::new(narrow(c[0]), narrow(c[1]), narrow(c[2]));
        Some((to_point(self.start?), to_point(self.end?)))
    }

    pub fn display_color(&self) -> Rgba {
        self.color.unwrap_or(DEFAULT_COLOR)
    }
}
