//! Scene model: the authoritative set of points and segments

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::document::SceneDocument;
use crate::point::{Point, PointId, Rgba, Segment};

/// Parameters for random scene generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomSceneParams {
    pub n_points: usize,
    pub n_segments: usize,
    /// Per-axis `(min, max)` bounds for point positions
    pub bounds: [(f32, f32); 3],
    pub size_range: (f32, f32),
    pub segment_width: f32,
}

impl RandomSceneParams {
    pub fn new(n_points: usize, n_segments: usize) -> Self {
        Self {
            n_points,
            n_segments,
            ..Self::default()
        }
    }
}

impl Default for RandomSceneParams {
    fn default() -> Self {
        Self {
            n_points: 20,
            n_segments: 5,
            bounds: [(-5.0, 5.0), (-5.0, 5.0), (-2.0, 2.0)],
            size_range: (4.0, 10.0),
            segment_width: 2.0,
        }
    }
}

/// Owns the current points and segments.
///
/// The position of a point in [`SceneModel::points`] is its identity for
/// picking and selection. Both sequences always exist; they are replaced
/// wholesale by [`SceneModel::set_document`], [`SceneModel::set_from_value`]
/// and [`SceneModel::randomize`], and emptied by [`SceneModel::clear`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneModel {
    points: Vec<Point>,
    segments: Vec<Segment>,
}

impl SceneModel {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// `(point count, segment count)`
    pub fn counts(&self) -> (usize, usize) {
        (self.points.len(), self.segments.len())
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.segments.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.segments.clear();
    }

    /// Replace the scene with a parsed document
    pub fn set_document(&mut self, document: SceneDocument) {
        self.points = document.points;
        self.segments = document.segments;
        debug!(
            points = self.points.len(),
            segments = self.segments.len(),
            "scene replaced"
        );
    }

    /// Replace the scene from a loosely-typed JSON value. Never fails:
    /// missing or malformed sequences become empty.
    pub fn set_from_value(&mut self, value: &Value) {
        self.set_document(SceneDocument::from_value(value));
    }

    /// Snapshot of the scene in document form
    pub fn to_document(&self) -> SceneDocument {
        SceneDocument::new(self.points.clone(), self.segments.clone())
    }

    /// Replace the scene with random content using the thread-local RNG
    pub fn randomize(&mut self, params: &RandomSceneParams) {
        self.randomize_with_rng(&mut rand::thread_rng(), params);
    }

    /// Replace the scene with random content.
    ///
    /// Points get ids `p0..pN`. Segment endpoints are copied from two points
    /// drawn with replacement, so a segment may have zero length.
    pub fn randomize_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R, params: &RandomSceneParams) {
        self.clear();

        let [bx, by, bz] = params.bounds;
        self.points = (0..params.n_points)
            .map(|i| Point {
                id: Some(PointId::Text(format!("p{}", i))),
                x: sample(rng, bx),
                y: sample(rng, by),
                z: sample(rng, bz),
                size: Some(sample(rng, params.size_range)),
                color: Some(random_color(rng)),
            })
            .collect();

        if self.points.is_empty() && params.n_segments > 0 {
            warn!(
                requested = params.n_segments,
                "no points to anchor random segments, generating none"
            );
            return;
        }

        let positions: Vec<[f64; 3]> = self.points.iter().map(Point::coordinates).collect();
        self.segments = (0..params.n_segments)
            .map(|_| {
                let start = positions[rng.gen_range(0..positions.len())];
                let end = positions[rng.gen_range(0..positions.len())];
                Segment::new(start, end)
                    .with_color(random_color(rng))
                    .with_width(params.segment_width as f64)
            })
            .collect();

        debug!(
            points = self.points.len(),
            segments = self.segments.len(),
            "random scene generated"
        );
    }
}

impl From<SceneDocument> for SceneModel {
    fn from(document: SceneDocument) -> Self {
        let mut model = Self::new();
        model.set_document(document);
        model
    }
}

fn sample<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f32, f32)) -> f64 {
    let (lo, hi) = (lo as f64, hi as f64);
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Rgba {
    [rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>(), 1.0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    #[test]
    fn test_new_model_is_empty() {
        let model = SceneModel::new();
        assert_eq!(model.counts(), (0, 0));
        assert!(model.is_empty());
    }

    #[test]
    fn test_randomize_exact_counts() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut model = SceneModel::new();
        model.randomize_with_rng(&mut rng, &RandomSceneParams::new(10, 3));
        assert_eq!(model.counts(), (10, 3));
        assert_eq!(model.points()[4].id, Some(PointId::from("p4")));
    }

    #[test]
    fn test_random_segments_connect_generated_points() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut model = SceneModel::new();
        model.randomize_with_rng(&mut rng, &RandomSceneParams::new(25, 40));

        for segment in model.segments() {
            let (start, end) = segment.endpoints().unwrap();
            assert!(model.points().iter().any(|p| p.position() == start));
            assert!(model.points().iter().any(|p| p.position() == end));
            assert_eq!(segment.width, Some(2.0));
        }
    }

    #[test]
    fn test_random_points_respect_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut model = SceneModel::new();
        model.randomize_with_rng(&mut rng, &RandomSceneParams::new(200, 0));

        for p in model.points() {
            assert!((-5.0..5.0).contains(&p.x));
            assert!((-5.0..5.0).contains(&p.y));
            assert!((-2.0..2.0).contains(&p.z));
            let size = p.size.unwrap();
            assert!((4.0..10.0).contains(&size));
            assert_eq!(p.color.unwrap()[3], 1.0);
        }
    }

    #[test]
    fn test_randomize_without_points_has_no_segments() {
        let mut model = SceneModel::new();
        model.randomize(&RandomSceneParams::new(0, 5));
        assert_eq!(model.counts(), (0, 0));
    }

    #[test]
    fn test_set_from_value_never_fails() {
        let mut model = SceneModel::new();
        model.randomize(&RandomSceneParams::default());
        model.set_from_value(&json!(null));
        assert_eq!(model.counts(), (0, 0));

        model.set_from_value(&json!({"points": [{"x": 1}, {"x": 2}]}));
        assert_eq!(model.counts(), (2, 0));
    }

    #[test]
    fn test_document_roundtrip_preserves_scene() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut model = SceneModel::new();
        model.randomize_with_rng(&mut rng, &RandomSceneParams::new(50, 10));

        let text = model.to_document().to_json_pretty().unwrap();
        let before = model.clone();
        model.clear();
        assert_eq!(model.counts(), (0, 0));

        model.set_document(SceneDocument::from_json_str(&text).unwrap());
        assert_eq!(model.counts(), (50, 10));
        assert_eq!(model, before);
    }
}
