//! Selection state and highlight application

use tracing::warn;
use v3d_core::Rgb8;

use crate::backend::PointBatch;

/// Ordered set of selected point indices plus the un-highlighted scale and
/// color of every point, captured at the last render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    selected: Vec<usize>,
    original_scales: Vec<f32>,
    original_colors: Vec<Rgb8>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the pre-highlight appearance of every point. Selection is kept.
    pub fn capture(&mut self, batch: &PointBatch) {
        self.original_scales.clone_from(&batch.scales);
        self.original_colors.clone_from(&batch.colors);
    }

    /// Rebuild the snapshot from the live batch if its length no longer
    /// matches. Returns `true` when that happened.
    pub fn ensure_snapshot(&mut self, batch: &PointBatch) -> bool {
        if self.original_scales.len() == batch.len() && self.original_colors.len() == batch.len() {
            return false;
        }
        warn!(
            snapshot = self.original_scales.len(),
            points = batch.len(),
            "selection snapshot out of sync with point batch, rebuilding from live values"
        );
        self.capture(batch);
        true
    }

    /// Replace the selection with a single index, or clear it
    pub fn replace(&mut self, index: Option<usize>) {
        self.selected.clear();
        self.selected.extend(index);
    }

    /// Remove `index` if selected, append it otherwise. Returns whether it
    /// is selected afterwards.
    pub fn toggle(&mut self, index: usize) -> bool {
        if let Some(pos) = self.selected.iter().position(|&i| i == index) {
            self.selected.remove(pos);
            false
        } else {
            self.selected.push(index);
            true
        }
    }

    /// Select several indices at once; duplicates are ignored
    pub fn extend<I: IntoIterator<Item = usize>>(&mut self, indices: I) {
        for index in indices {
            if !self.contains(index) {
                self.selected.push(index);
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Drop the selection and the snapshot
    pub fn reset(&mut self) {
        self.selected.clear();
        self.original_scales.clear();
        self.original_colors.clear();
    }

    pub fn contains(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn indices(&self) -> &[usize] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Cached pre-highlight `(scale, color)` of a point
    pub fn original(&self, index: usize) -> Option<(f32, Rgb8)> {
        Some((*self.original_scales.get(index)?, *self.original_colors.get(index)?))
    }

    /// Reset every point of `batch` to its cached appearance, then scale and
    /// recolor the selected ones. Indices beyond the batch are removed from
    /// the selection. Returns the overlay batch holding only the selected
    /// points.
    pub fn apply(&mut self, batch: &mut PointBatch, scale_factor: f32, color: Rgb8) -> PointBatch {
        self.ensure_snapshot(batch);
        batch.scales.copy_from_slice(&self.original_scales);
        batch.colors.copy_from_slice(&self.original_colors);

        self.selected.retain(|&index| index < batch.len());

        let mut overlay = PointBatch::with_capacity(self.selected.len());
        for &index in &self.selected {
            batch.scales[index] = self.original_scales[index] * scale_factor;
            batch.colors[index] = color;
            overlay.push(batch.positions[index], batch.scales[index], color);
        }
        overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use v3d_core::Point3f;

    fn batch(n: usize) -> PointBatch {
        let mut batch = PointBatch::default();
        for i in 0..n {
            batch.push(Point3f::new(i as f32, 0.0, 0.0), 0.3, [10, 20, i as u8]);
        }
        batch
    }

    #[test]
    fn test_toggle_twice_restores_selection() {
        let mut selection = SelectionState::new();
        selection.replace(Some(1));
        let before = selection.indices().to_vec();

        assert!(selection.toggle(4));
        assert!(!selection.toggle(4));
        assert_eq!(selection.indices(), before.as_slice());
    }

    #[test]
    fn test_replace_with_none_clears() {
        let mut selection = SelectionState::new();
        selection.extend([1, 2, 2, 3]);
        assert_eq!(selection.indices(), &[1, 2, 3]);
        selection.replace(None);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_apply_then_deselect_restores_exact_values() {
        let mut points = batch(5);
        let pristine = points.clone();
        let mut selection = SelectionState::new();
        selection.capture(&points);

        selection.toggle(2);
        let overlay = selection.apply(&mut points, 2.5, [255, 255, 0]);
        assert_eq!(overlay.len(), 1);
        assert_eq!(points.scales[2], 0.3 * 2.5);
        assert_eq!(points.colors[2], [255, 255, 0]);

        selection.toggle(2);
        let overlay = selection.apply(&mut points, 2.5, [255, 255, 0]);
        assert!(overlay.is_empty());
        assert_eq!(points, pristine);
    }

    #[test]
    fn test_stale_indices_are_dropped() {
        let mut points = batch(3);
        let mut selection = SelectionState::new();
        selection.capture(&points);
        selection.extend([0, 7]);

        let overlay = selection.apply(&mut points, 2.0, [1, 2, 3]);
        assert_eq!(overlay.len(), 1);
        assert_eq!(overlay.positions[0], Point3f::new(0.0, 0.0, 0.0));
        assert!(!selection.contains(7));
        assert_eq!(selection.indices(), &[0]);

        // a larger batch later does not revive it
        let mut grown = batch(10);
        selection.capture(&grown);
        let overlay = selection.apply(&mut grown, 2.0, [1, 2, 3]);
        assert_eq!(overlay.len(), 1);
        assert_eq!(grown.colors[7], [10, 20, 7]);
    }

    #[test]
    fn test_snapshot_rebuilt_on_length_mismatch() {
        let mut selection = SelectionState::new();
        selection.capture(&batch(2));
        let mut points = batch(4);
        assert!(selection.ensure_snapshot(&points));
        assert_eq!(selection.original(3), Some((0.3, [10, 20, 3])));
        assert!(!selection.ensure_snapshot(&points));

        selection.toggle(3);
        selection.apply(&mut points, 2.0, [0, 0, 0]);
        assert_eq!(points.scales[3], 0.6);
    }
}
