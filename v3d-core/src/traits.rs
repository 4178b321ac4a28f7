//! Core traits for v3d

use crate::point::Point3f;
use crate::scene::SceneModel;

/// Trait for nearest neighbor search functionality
pub trait NearestNeighborSearch {
    /// Find the k nearest neighbors to a query point, closest first.
    /// Distances are Euclidean.
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)>;

    /// Find all neighbors within a given radius
    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)>;
}

/// Trait for drawable/renderable objects
pub trait Drawable {
    /// Axis-aligned bounds of everything that would be drawn, `None` when
    /// nothing would be
    fn bounding_box(&self) -> Option<(Point3f, Point3f)>;

    /// Get the center point of the object
    fn center(&self) -> Option<Point3f> {
        let (min, max) = self.bounding_box()?;
        Some(nalgebra::center(&min, &max))
    }
}

impl Drawable for SceneModel {
    fn bounding_box(&self) -> Option<(Point3f, Point3f)> {
        let points = self.points().iter().map(|p| p.position());
        let endpoints = self
            .segments()
            .iter()
            .filter_map(|s| s.endpoints())
            .flat_map(|(a, b)| [a, b]);

        points.chain(endpoints).fold(None, |bounds, p| match bounds {
            None => Some((p, p)),
            Some((min, max)) => Some((min.inf(&p), max.sup(&p))),
        })
    }
}
