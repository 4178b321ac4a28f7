//! Draw batches and the graphics capability the renderer is written against

use nalgebra::Point2;
use v3d_core::{Point3f, Result, Rgb8};

/// One glyph batch: every array is index-aligned with the scene's points
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointBatch {
    pub positions: Vec<Point3f>,
    pub scales: Vec<f32>,
    pub colors: Vec<Rgb8>,
}

impl PointBatch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            scales: Vec::with_capacity(capacity),
            colors: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, position: Point3f, scale: f32, color: Rgb8) {
        self.positions.push(position);
        self.scales.push(scale);
        self.colors.push(color);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.scales.clear();
        self.colors.clear();
    }
}

/// One line batch. Every segment owns its two vertices so that colors,
/// which are per segment, stay independent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineBatch {
    /// `2 * segment_count` vertices, pairwise
    pub positions: Vec<Point3f>,
    /// One color per segment
    pub colors: Vec<Rgb8>,
}

impl LineBatch {
    pub fn with_capacity(segments: usize) -> Self {
        Self {
            positions: Vec::with_capacity(segments * 2),
            colors: Vec::with_capacity(segments),
        }
    }

    pub fn push_segment(&mut self, start: Point3f, end: Point3f, color: Rgb8) {
        self.positions.push(start);
        self.positions.push(end);
        self.colors.push(color);
    }

    pub fn segment_count(&self) -> usize {
        self.colors.len()
    }

    pub fn segment(&self, index: usize) -> Option<(Point3f, Point3f, Rgb8)> {
        let color = *self.colors.get(index)?;
        Some((self.positions[2 * index], self.positions[2 * index + 1], color))
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.colors.clear();
    }
}

/// What the renderer needs from a graphics backend.
///
/// The renderer owns the batch contents; a backend turns each upload into
/// its own GPU-side object (one per batch) and answers the two geometric
/// queries picking relies on.
pub trait RenderBackend {
    /// Acquire rendering resources. Called once, before any upload.
    fn initialize(&mut self) -> Result<()>;

    /// Static background grid, uploaded once at construction
    fn upload_grid(&mut self, grid: &LineBatch);

    fn upload_points(&mut self, batch: &PointBatch);

    fn upload_lines(&mut self, batch: &LineBatch);

    /// Selection overlay drawn on top of the point batch
    fn upload_highlight(&mut self, batch: &PointBatch);

    /// World position of the rendered surface under a viewport pixel
    /// (origin top-left), if anything is there
    fn pick_surface(&self, screen_x: f32, screen_y: f32) -> Option<Point3f>;

    /// Viewport pixel of a world point; `None` if it cannot be projected
    fn project(&self, world: &Point3f) -> Option<Point2<f32>>;

    /// Frame the given bounds, or restore the default view for `None`
    fn reset_camera(&mut self, bounds: Option<(Point3f, Point3f)>);

    fn redraw(&mut self);
}
