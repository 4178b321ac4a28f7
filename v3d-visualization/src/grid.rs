//! Ground grid on the XOY plane

use v3d_core::{Error, Point3f, Result};

use crate::backend::LineBatch;
use crate::config::GridConfig;

/// Lines from `-half_extent` to `+half_extent` every `spacing` units along
/// both x and y, at z = 0, endpoints included
pub fn build_grid(config: &GridConfig) -> Result<LineBatch> {
    let GridConfig {
        half_extent,
        spacing,
        color,
    } = *config;

    if !(spacing.is_finite() && spacing > 0.0) {
        return Err(Error::InvalidData(format!("grid spacing must be positive, got {}", spacing)));
    }
    if !(half_extent.is_finite() && half_extent >= 0.0) {
        return Err(Error::InvalidData(format!(
            "grid half extent must be non-negative, got {}",
            half_extent
        )));
    }

    let steps = ((2.0 * half_extent) / spacing).floor() as usize;
    let ticks: Vec<f32> = (0..=steps).map(|i| -half_extent + i as f32 * spacing).collect();

    let mut grid = LineBatch::with_capacity(ticks.len() * 2);
    for &y in &ticks {
        grid.push_segment(Point3f::new(-half_extent, y, 0.0), Point3f::new(half_extent, y, 0.0), color);
    }
    for &x in &ticks {
        grid.push_segment(Point3f::new(x, -half_extent, 0.0), Point3f::new(x, half_extent, 0.0), color);
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_line_count() {
        let grid = build_grid(&GridConfig::default()).unwrap();
        // 21 ticks from -10 to 10, one line per tick per axis
        assert_eq!(grid.segment_count(), 42);
        assert_eq!(grid.positions.len(), 84);
        assert!(grid.positions.iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn test_invalid_spacing_is_rejected() {
        let config = GridConfig {
            spacing: 0.0,
            ..GridConfig::default()
        };
        assert!(build_grid(&config).is_err());
    }
}
