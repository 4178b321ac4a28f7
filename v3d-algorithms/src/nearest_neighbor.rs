//! Nearest neighbor search implementations

use std::collections::HashMap;

use kiddo::SquaredEuclidean;
use v3d_core::{NearestNeighborSearch, Point3f};

/// Leaf bucket size of the kiddo tree. A bucket cannot be split when more
/// points than this share one coordinate value on an axis.
const BUCKET_SIZE: usize = 32;

/// KD-Tree implementation for nearest neighbor search
pub struct KdTree {
    tree: kiddo::KdTree<f32, 3>,
    len: usize,
}

impl KdTree {
    /// Build a tree over `points`; item `i` is the index into the slice
    pub fn new(points: &[Point3f]) -> Self {
        let mut tree = kiddo::KdTree::<f32, 3>::with_capacity(points.len().max(1));
        for (idx, point) in points.iter().enumerate() {
            tree.add(&[point.x, point.y, point.z], idx as u64);
        }
        Self {
            tree,
            len: points.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl NearestNeighborSearch for KdTree {
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)> {
        if k == 0 || self.is_empty() {
            return Vec::new();
        }
        self.tree
            .nearest_n::<SquaredEuclidean>(&[query.x, query.y, query.z], k)
            .into_iter()
            .map(|n| (n.item as usize, n.distance.sqrt()))
            .collect()
    }

    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)> {
        if self.is_empty() {
            return Vec::new();
        }
        self.tree
            .within::<SquaredEuclidean>(&[query.x, query.y, query.z], radius * radius)
            .into_iter()
            .map(|n| (n.item as usize, n.distance.sqrt()))
            .collect()
    }
}

/// Simple brute force nearest neighbor search for small or degenerate datasets
pub struct BruteForceSearch {
    points: Vec<Point3f>,
}

impl BruteForceSearch {
    pub fn new(points: &[Point3f]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }

    fn squared_distances<'a>(&'a self, query: &'a Point3f) -> impl Iterator<Item = (usize, f32)> + 'a {
        self.points
            .iter()
            .enumerate()
            .map(move |(idx, point)| (idx, (point - query).norm_squared()))
    }
}

impl NearestNeighborSearch for BruteForceSearch {
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)> {
        let mut distances: Vec<(usize, f32)> = self.squared_distances(query).collect();

        // Sort by distance and take k nearest
        distances.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        distances.truncate(k);
        distances.into_iter().map(|(idx, d2)| (idx, d2.sqrt())).collect()
    }

    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)> {
        let radius_squared = radius * radius;
        let mut hits: Vec<(usize, f32)> = self
            .squared_distances(query)
            .filter(|(_, d2)| *d2 <= radius_squared)
            .map(|(idx, d2)| (idx, d2.sqrt()))
            .collect();
        hits.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        hits
    }
}

/// Spatial index over the rendered point positions.
///
/// Uses a k-d tree unless the input has so many coincident coordinates on
/// one axis that the tree buckets could not be split, in which case it
/// falls back to a linear scan.
pub enum PointIndex {
    Tree(KdTree),
    Linear(BruteForceSearch),
}

impl PointIndex {
    pub fn build(points: &[Point3f]) -> Self {
        if max_shared_coordinate(points) >= BUCKET_SIZE {
            tracing::debug!(
                points = points.len(),
                "coincident coordinates exceed tree bucket size, using linear index"
            );
            PointIndex::Linear(BruteForceSearch::new(points))
        } else {
            PointIndex::Tree(KdTree::new(points))
        }
    }

    pub fn empty() -> Self {
        PointIndex::Tree(KdTree::new(&[]))
    }

    /// The single closest point and its distance
    pub fn nearest(&self, query: &Point3f) -> Option<(usize, f32)> {
        self.find_k_nearest(query, 1).into_iter().next()
    }
}

impl Default for PointIndex {
    fn default() -> Self {
        Self::empty()
    }
}

impl NearestNeighborSearch for PointIndex {
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)> {
        match self {
            PointIndex::Tree(tree) => tree.find_k_nearest(query, k),
            PointIndex::Linear(linear) => linear.find_k_nearest(query, k),
        }
    }

    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)> {
        match self {
            PointIndex::Tree(tree) => tree.find_radius_neighbors(query, radius),
            PointIndex::Linear(linear) => linear.find_radius_neighbors(query, radius),
        }
    }
}

/// Largest number of points sharing the same value on any single axis
fn max_shared_coordinate(points: &[Point3f]) -> usize {
    (0..3)
        .map(|axis| {
            let mut counts: HashMap<u32, usize> = HashMap::new();
            for p in points {
                // normalize -0.0 so it groups with 0.0
                let value = if p[axis] == 0.0 { 0.0f32 } else { p[axis] };
                *counts.entry(value.to_bits()).or_default() += 1;
            }
            counts.into_values().max().unwrap_or(0)
        })
        .max()
        .unwrap_or(0)
}
