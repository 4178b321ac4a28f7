//! CPU-only render backend
//!
//! Keeps the uploaded batches in memory and answers surface picks by ray
//! casting against the point glyphs and the ground grid. Used by the
//! headless viewer and by tests; it never touches a GPU.

use nalgebra::Point2;
use tracing::{debug, trace};
use v3d_core::{Error, Point3f, Result, Vector3f};

use crate::backend::{LineBatch, PointBatch, RenderBackend};
use crate::camera::Camera;

/// Sphere radius of a glyph drawn at scale 1
pub const DEFAULT_GLYPH_RADIUS: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct HeadlessBackend {
    width: u32,
    height: u32,
    camera: Camera,
    glyph_radius: f32,
    grid: LineBatch,
    points: PointBatch,
    lines: LineBatch,
    highlight: PointBatch,
    initialized: bool,
    redraw_count: u64,
}

impl HeadlessBackend {
    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = Camera::default();
        if width > 0 && height > 0 {
            camera.aspect_ratio = width as f32 / height as f32;
        }
        Self {
            width,
            height,
            camera,
            glyph_radius: DEFAULT_GLYPH_RADIUS,
            grid: LineBatch::default(),
            points: PointBatch::default(),
            lines: LineBatch::default(),
            highlight: PointBatch::default(),
            initialized: false,
            redraw_count: 0,
        }
    }

    pub fn with_glyph_radius(mut self, radius: f32) -> Self {
        self.glyph_radius = radius;
        self
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn grid(&self) -> &LineBatch {
        &self.grid
    }

    pub fn points(&self) -> &PointBatch {
        &self.points
    }

    pub fn lines(&self) -> &LineBatch {
        &self.lines
    }

    pub fn highlight(&self) -> &PointBatch {
        &self.highlight
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of frames requested so far
    pub fn redraw_count(&self) -> u64 {
        self.redraw_count
    }

    /// Closest ray parameter at which `batch`'s glyph spheres are hit
    fn intersect_glyphs(&self, batch: &PointBatch, origin: &Point3f, direction: &Vector3f) -> Option<f32> {
        batch
            .positions
            .iter()
            .zip(&batch.scales)
            .filter_map(|(center, &scale)| ray_sphere(origin, direction, center, scale * self.glyph_radius))
            .min_by(f32::total_cmp)
    }

    /// Ray parameter of the z = 0 plane, if the hit lies on the grid
    fn intersect_grid(&self, origin: &Point3f, direction: &Vector3f) -> Option<f32> {
        if direction.z.abs() <= f32::EPSILON {
            return None;
        }
        let t = -origin.z / direction.z;
        if t < 0.0 {
            return None;
        }
        let hit = origin + direction * t;
        let (min, max) = grid_extent(&self.grid)?;
        let inside = (min.x..=max.x).contains(&hit.x) && (min.y..=max.y).contains(&hit.y);
        inside.then_some(t)
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new(1000, 700)
    }
}

impl RenderBackend for HeadlessBackend {
    fn initialize(&mut self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Visualization(format!(
                "cannot create a {}x{} render target",
                self.width, self.height
            )));
        }
        self.initialized = true;
        debug!(width = self.width, height = self.height, "headless backend initialized");
        Ok(())
    }

    fn upload_grid(&mut self, grid: &LineBatch) {
        self.grid.clone_from(grid);
    }

    fn upload_points(&mut self, batch: &PointBatch) {
        self.points.clone_from(batch);
    }

    fn upload_lines(&mut self, batch: &LineBatch) {
        self.lines.clone_from(batch);
    }

    fn upload_highlight(&mut self, batch: &PointBatch) {
        self.highlight.clone_from(batch);
    }

    fn pick_surface(&self, screen_x: f32, screen_y: f32) -> Option<Point3f> {
        let (origin, direction) =
            self.camera
                .screen_to_ray(screen_x, screen_y, self.width as f32, self.height as f32)?;

        let t = [
            self.intersect_glyphs(&self.highlight, &origin, &direction),
            self.intersect_glyphs(&self.points, &origin, &direction),
            self.intersect_grid(&origin, &direction),
        ]
        .into_iter()
        .flatten()
        .min_by(f32::total_cmp)?;

        let hit = origin + direction * t;
        trace!(x = screen_x, y = screen_y, ?hit, "surface pick");
        Some(hit)
    }

    fn project(&self, world: &Point3f) -> Option<Point2<f32>> {
        self.camera.project(world, self.width as f32, self.height as f32)
    }

    fn reset_camera(&mut self, bounds: Option<(Point3f, Point3f)>) {
        match bounds {
            Some((min, max)) => self.camera.frame_bounds(&min, &max),
            None => self.camera.reset(),
        }
    }

    fn redraw(&mut self) {
        self.redraw_count += 1;
        trace!(frame = self.redraw_count, "redraw");
    }
}

/// Nearest non-negative ray parameter at which the ray meets the sphere
fn ray_sphere(origin: &Point3f, direction: &Vector3f, center: &Point3f, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(direction);
    let c = oc.norm_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    [-b - root, -b + root].into_iter().find(|&t| t >= 0.0)
}

fn grid_extent(grid: &LineBatch) -> Option<(Point3f, Point3f)> {
    grid.positions.iter().fold(None, |bounds, p| match bounds {
        None => Some((*p, *p)),
        Some((min, max)) => Some((min.inf(p), max.sup(p))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::grid::build_grid;
    use approx::assert_relative_eq;

    fn backend() -> HeadlessBackend {
        let mut backend = HeadlessBackend::new(800, 600);
        backend.initialize().unwrap();
        backend.upload_grid(&build_grid(&GridConfig::default()).unwrap());
        backend
    }

    #[test]
    fn test_zero_viewport_fails_to_initialize() {
        let mut backend = HeadlessBackend::new(0, 600);
        assert!(matches!(backend.initialize(), Err(Error::Visualization(_))));
    }

    #[test]
    fn test_ray_sphere() {
        let origin = Point3f::new(0.0, 0.0, 10.0);
        let down = Vector3f::new(0.0, 0.0, -1.0);
        let t = ray_sphere(&origin, &down, &Point3f::origin(), 1.0).unwrap();
        assert_relative_eq!(t, 9.0);
        assert!(ray_sphere(&origin, &down, &Point3f::new(5.0, 0.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn test_pick_hits_glyph_before_ground() {
        let mut backend = backend();
        let center = Point3f::new(1.0, 1.0, 1.0);
        let mut batch = PointBatch::default();
        batch.push(center, 0.3, [255, 255, 255]);
        backend.upload_points(&batch);

        let screen = backend.project(&center).unwrap();
        let hit = backend.pick_surface(screen.x, screen.y).unwrap();
        assert!((hit - center).norm() <= 0.3 * DEFAULT_GLYPH_RADIUS + 1e-3);
    }

    #[test]
    fn test_pick_lands_on_ground_grid() {
        let backend = backend();
        let ground = Point3f::new(2.0, -3.0, 0.0);
        let screen = backend.project(&ground).unwrap();
        let hit = backend.pick_surface(screen.x, screen.y).unwrap();
        assert_relative_eq!(hit, ground, epsilon = 1e-2);
    }

    #[test]
    fn test_pick_into_empty_sky_misses() {
        let backend = backend();
        // top-left corner looks above the horizon
        assert!(backend.pick_surface(0.0, 0.0).is_none());
    }

    #[test]
    fn test_reset_camera() {
        let mut backend = backend();
        backend.reset_camera(Some((Point3f::new(10.0, 10.0, 0.0), Point3f::new(12.0, 12.0, 0.0))));
        assert_eq!(backend.camera().target, Point3f::new(11.0, 11.0, 0.0));
        backend.reset_camera(None);
        assert_eq!(backend.camera().target, Point3f::origin());
    }
}
