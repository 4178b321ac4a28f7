//! Batched scene renderer with picking and selection
//!
//! A scene of any size maps onto four backend objects: the static grid, one
//! point glyph batch, one line batch and one selection highlight batch.
//! Every [`SceneRenderer::render`] rebuilds the point and line batches in
//! full; picking and selection only touch the highlight.

use nalgebra::Point2;
use tracing::{debug, info};
use v3d_algorithms::{resolve_pick, PickHit, PointIndex};
use v3d_core::{narrow, quantize_rgb, Drawable, Point3f, Result, SceneModel};

use crate::backend::{LineBatch, PointBatch, RenderBackend};
use crate::config::RendererConfig;
use crate::grid::build_grid;
use crate::selection::SelectionState;

pub struct SceneRenderer<B: RenderBackend> {
    backend: B,
    config: RendererConfig,
    points: PointBatch,
    lines: LineBatch,
    highlight: PointBatch,
    index: PointIndex,
    selection: SelectionState,
}

impl<B: RenderBackend> SceneRenderer<B> {
    /// Initialize `backend` and upload the background grid.
    ///
    /// Fails if the backend cannot acquire its rendering resources or the
    /// grid configuration is invalid.
    pub fn new(mut backend: B, config: RendererConfig) -> Result<Self> {
        backend.initialize()?;
        let grid = build_grid(&config.grid)?;
        backend.upload_grid(&grid);
        debug!(grid_lines = grid.segment_count(), "renderer initialized");

        Ok(Self {
            backend,
            config,
            points: PointBatch::default(),
            lines: LineBatch::default(),
            highlight: PointBatch::default(),
            index: PointIndex::empty(),
            selection: SelectionState::new(),
        })
    }

    /// Rebuild every draw batch from `model`, reframe the camera and redraw.
    ///
    /// The selection is kept; indices past the new point count are dropped
    /// from it.
    pub fn render(&mut self, model: &SceneModel) {
        let (n_points, n_segments) = model.counts();

        self.points.clear();
        for point in model.points() {
            let scale = point.size.map_or(self.config.default_size, narrow) * self.config.size_scale;
            self.points
                .push(point.position(), scale, quantize_rgb(&point.display_color()));
        }

        self.lines.clear();
        for segment in model.segments() {
            if let Some((start, end)) = segment.endpoints() {
                self.lines
                    .push_segment(start, end, quantize_rgb(&segment.display_color()));
            }
        }

        self.selection.capture(&self.points);
        self.index = PointIndex::build(&self.points.positions);
        self.highlight = self.selection.apply(
            &mut self.points,
            self.config.highlight_scale,
            self.config.highlight_color,
        );

        self.backend.upload_points(&self.points);
        self.backend.upload_lines(&self.lines);
        self.backend.upload_highlight(&self.highlight);
        self.backend.reset_camera(model.bounding_box());
        self.backend.redraw();

        info!(
            points = n_points,
            segments = n_segments,
            lines = self.lines.segment_count(),
            selected = self.highlight.len(),
            "scene rendered"
        );
    }

    /// Empty every draw batch and the selection, then redraw. The grid and
    /// the camera are left alone.
    pub fn clear(&mut self) {
        self.points.clear();
        self.lines.clear();
        self.highlight.clear();
        self.index = PointIndex::empty();
        self.selection.reset();

        self.backend.upload_points(&self.points);
        self.backend.upload_lines(&self.lines);
        self.backend.upload_highlight(&self.highlight);
        self.backend.redraw();
        debug!("renderer cleared");
    }

    /// Resolve a click to a point without changing the selection
    pub fn pick(&self, screen_x: f32, screen_y: f32) -> Option<PickHit> {
        let pick_position = self
            .backend
            .pick_surface(screen_x, screen_y)
            .unwrap_or_else(Point3f::origin);

        resolve_pick(
            &self.index,
            &self.points.positions,
            &pick_position,
            &Point2::new(screen_x, screen_y),
            |p: &Point3f| self.backend.project(p),
            &self.config.pick,
        )
    }

    /// Resolve a click, update the selection and redraw the highlight.
    ///
    /// With `multi` the hit is toggled in the selection; without it the
    /// selection becomes the hit alone, or empty on no match.
    pub fn pick_and_select(&mut self, screen_x: f32, screen_y: f32, multi: bool) -> Option<usize> {
        let hit = self.pick(screen_x, screen_y);
        let index = hit.map(|h| h.index);

        match (index, multi) {
            (Some(index), true) => {
                self.selection.toggle(index);
            }
            (None, true) => {}
            (index, false) => self.selection.replace(index),
        }

        match hit {
            Some(hit) => debug!(index = hit.index, stage = ?hit.stage, multi, "pick resolved"),
            None => debug!(x = screen_x, y = screen_y, "pick found no point"),
        }

        self.refresh_highlight();
        index
    }

    /// Replace the selection with `indices`
    pub fn select<I: IntoIterator<Item = usize>>(&mut self, indices: I) {
        self.selection.clear_selection();
        self.selection.extend(indices);
        self.refresh_highlight();
    }

    /// Toggle one index, as a multi-select click on it would
    pub fn toggle(&mut self, index: usize) -> bool {
        let selected = self.selection.toggle(index);
        self.refresh_highlight();
        selected
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear_selection();
        self.refresh_highlight();
    }

    pub fn selected(&self) -> &[usize] {
        self.selection.indices()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
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

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable backend access, e.g. for camera interaction. Call
    /// [`RenderBackend::redraw`] afterwards to present the change.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Reset-then-apply the highlight and push the point and overlay
    /// batches to the backend
    fn refresh_highlight(&mut self) {
        self.highlight = self.selection.apply(
            &mut self.points,
            self.config.highlight_scale,
            self.config.highlight_color,
        );
        self.backend.upload_points(&self.points);
        self.backend.upload_highlight(&self.highlight);
        self.backend.redraw();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HeadlessBackend;
    use v3d_core::{Point, SceneDocument, Segment};

    fn renderer() -> SceneRenderer<HeadlessBackend> {
        SceneRenderer::new(HeadlessBackend::new(800, 600), RendererConfig::default()).unwrap()
    }

    fn model() -> SceneModel {
        SceneModel::from(SceneDocument::new(
            vec![
                Point::new(0.0, 0.0, 0.0).with_size(10.0).with_color([1.0, 0.0, 0.0, 1.0]),
                Point::new(3.0, 0.0, 0.0),
                Point::new(-3.0, 2.0, 1.0).with_color([2.0, -1.0, 0.5, 0.2]),
            ],
            vec![
                Segment::new([0.0, 0.0, 0.0], [3.0, 0.0, 0.0]),
                Segment::default(),
            ],
        ))
    }

    #[test]
    fn test_construction_fails_without_resources() {
        let result = SceneRenderer::new(HeadlessBackend::new(0, 0), RendererConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_grid_uploaded_once() {
        let mut renderer = renderer();
        assert_eq!(renderer.backend().grid().segment_count(), 42);
        renderer.render(&model());
        renderer.clear();
        assert_eq!(renderer.backend().grid().segment_count(), 42);
    }

    #[test]
    fn test_render_batches_points() {
        let mut renderer = renderer();
        renderer.render(&model());

        let points = renderer.backend().points();
        assert_eq!(points.len(), 3);
        assert_eq!(points.scales, vec![0.5, 6.0 * 0.05, 6.0 * 0.05]);
        assert_eq!(points.colors, vec![[255, 0, 0], [255, 255, 255], [255, 0, 127]]);
        // the segment without endpoints is not drawn
        assert_eq!(renderer.backend().lines().segment_count(), 1);
        assert_eq!(renderer.backend().redraw_count(), 1);
    }

    #[test]
    fn test_clear_keeps_camera() {
        let mut renderer = renderer();
        renderer.render(&model());
        let camera = renderer.backend().camera().clone();
        renderer.clear();
        assert_eq!(renderer.backend().camera(), &camera);
        assert!(renderer.backend().points().is_empty());
        assert!(renderer.backend().lines().is_empty());
    }

    #[test]
    fn test_select_and_toggle() {
        let mut renderer = renderer();
        renderer.render(&model());

        renderer.select([2, 0, 2]);
        assert_eq!(renderer.selected(), &[2, 0]);
        assert_eq!(renderer.highlight().len(), 2);

        assert!(!renderer.toggle(0));
        assert_eq!(renderer.selected(), &[2]);
        assert_eq!(renderer.points().colors[2], [255, 255, 0]);

        renderer.clear_selection();
        assert!(renderer.backend().highlight().is_empty());
        assert_eq!(renderer.points().colors[2], [255, 0, 127]);
    }

    #[test]
    fn test_selection_survives_render() {
        let mut renderer = renderer();
        renderer.render(&model());
        renderer.select([1]);
        renderer.render(&model());
        assert_eq!(renderer.selected(), &[1]);
        assert_eq!(renderer.points().scales[1], 6.0 * 0.05 * 2.5);
    }

    #[test]
    fn test_shrunk_scene_forgets_out_of_range_selection() {
        let mut renderer = renderer();
        renderer.render(&model());
        renderer.select([0, 2]);

        renderer.render(&SceneModel::from(SceneDocument::new(
            vec![Point::new(1.0, 1.0, 1.0)],
            Vec::new(),
        )));
        assert_eq!(renderer.selected(), &[0]);

        // regrowing the scene must not bring index 2 back
        renderer.render(&model());
        assert_eq!(renderer.selected(), &[0]);
        assert_eq!(renderer.highlight().len(), 1);
        assert_eq!(renderer.points().colors[2], [255, 0, 127]);
    }

    #[test]
    fn test_document_values_narrowed_for_batches() {
        let mut renderer = renderer();
        renderer.render(&SceneModel::from(SceneDocument::new(
            vec![
                Point::new(0.123456789012, -1.5, 0.0).with_size(1e300),
                Point::new(1.0, 2.0, 3.0),
            ],
            Vec::new(),
        )));

        let points = renderer.points();
        assert_eq!(points.positions[0], Point3f::new(0.123456789012_f64 as f32, -1.5, 0.0));
        assert_eq!(points.scales[0], f32::MAX * 0.05);
        assert!(points.scales[0].is_finite());
    }
}
