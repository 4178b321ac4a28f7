//! Scene document: the structured form used for files and wire messages
//!
//! ```json
//! {
//!   "points":   [{"id": "p0", "x": 0.0, "y": 1.0, "z": 2.0, "size": 6, "color": [1, 0, 0, 1]}],
//!   "segments": [{"start": [0, 0, 0], "end": [1, 1, 1], "color": [0, 1, 0, 1], "width": 2}]
//! }
//! ```
//!
//! Parsing is permissive: unknown fields are ignored, missing or mistyped
//! fields fall back to defaults and entries that are not objects are dropped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::point::{Point, Segment};
use crate::Result;

/// A whole scene as exchanged with files and publishers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default, deserialize_with = "lenient::seq")]
    pub points: Vec<Point>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub segments: Vec<Segment>,
}

impl SceneDocument {
    pub fn new(points: Vec<Point>, segments: Vec<Segment>) -> Self {
        Self { points, segments }
    }

    /// Interpret an already-parsed JSON value. Anything that is not an
    /// object yields an empty document.
    pub fn from_value(value: &Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        Self::deserialize(value).unwrap_or_default()
    }

    /// Parse JSON text. Only syntax errors are reported; shape problems are
    /// absorbed by the lenient field rules.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(&value))
    }

    /// Pretty-printed JSON, two-space indentation
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn counts(&self) -> (usize, usize) {
        (self.points.len(), self.segments.len())
    }
}

/// Field deserializers that never fail on a well-formed JSON value
pub(crate) mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use crate::point::{PointId, Rgba};

    pub fn coordinate<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(Value::deserialize(d)?.as_f64().unwrap_or(0.0))
    }

    pub fn scalar<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(Value::deserialize(d)?.as_f64())
    }

    /// Strings and numbers keep their JSON type
    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<PointId>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(PointId::Text(s)),
            Value::Number(n) => Some(PointId::Number(n)),
            _ => None,
        })
    }

    /// `[r, g, b]` or `[r, g, b, a]`; a missing alpha is opaque
    pub fn color<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Rgba>, D::Error> {
        let value = Value::deserialize(d)?;
        let Some(channels) = numbers(&value) else {
            return Ok(None);
        };
        if channels.len() < 3 {
            return Ok(None);
        }
        let alpha = channels.get(3).copied().unwrap_or(1.0);
        Ok(Some([channels[0], channels[1], channels[2], alpha]))
    }

    pub fn vec3<'de, D: Deserializer<'de>>(d: D) -> Result<Option<[f64; 3]>, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(numbers(&value)
            .filter(|v| v.len() >= 3)
            .map(|v| [v[0], v[1], v[2]]))
    }

    /// Keep the entries of an array that parse as `T`, drop the rest
    pub fn seq<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items
                .into_iter()
                .filter(Value::is_object)
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        })
    }

    fn numbers(value: &Value) -> Option<Vec<f64>> {
        value.as_array()?.iter().map(Value::as_f64).collect()
    }
}
