//! Resolve a pointer click to the point the user meant
//!
//! Surface picks are unreliable for small glyphs, so the surface hit is only
//! used to seed a world-space radius query; the candidates are then ranked by
//! their projected distance to the click in screen space.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use v3d_core::{NearestNeighborSearch, Point3f};

/// Tunable thresholds for [`resolve_pick`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickParams {
    /// World-space radius around the surface hit searched for candidates
    pub search_radius: f32,
    /// Largest accepted screen distance, in pixels, between click and point
    pub screen_tolerance_px: f32,
    /// Largest accepted world distance for the nearest-point fallback
    pub fallback_radius: f32,
}

impl Default for PickParams {
    fn default() -> Self {
        Self {
            search_radius: 4.0,
            screen_tolerance_px: 20.0,
            fallback_radius: 2.0,
        }
    }
}

/// Which stage of the search produced a hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickStage {
    /// Closest candidate in screen space among the radius query results
    ScreenSpace { distance_sq_px: f32 },
    /// Closest point in 3D after an empty radius query
    Nearest { distance: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub index: usize,
    pub stage: PickStage,
}

/// Resolve a click to at most one point index.
///
/// * `positions` - world positions, index-aligned with `index`
/// * `pick_position` - world position returned by the surface pick (or the
///   origin when nothing was hit)
/// * `click` - pointer location in viewport pixels, origin top-left
/// * `project` - world to viewport projection; `None` for points that cannot
///   be projected (behind the camera)
pub fn resolve_pick<S, F>(
    index: &S,
    positions: &[Point3f],
    pick_position: &Point3f,
    click: &Point2<f32>,
    project: F,
    params: &PickParams,
) -> Option<PickHit>
where
    S: NearestNeighborSearch + ?Sized,
    F: Fn(&Point3f) -> Option<Point2<f32>>,
{
    let candidates = index.find_radius_neighbors(pick_position, params.search_radius);

    if candidates.is_empty() {
        let (nearest, distance) = index.find_k_nearest(pick_position, 1).into_iter().next()?;
        return (distance <= params.fallback_radius).then_some(PickHit {
            index: nearest,
            stage: PickStage::Nearest { distance },
        });
    }

    let tolerance_sq = params.screen_tolerance_px * params.screen_tolerance_px;
    let (best, distance_sq_px) = candidates
        .iter()
        .filter_map(|&(idx, _)| {
            let screen = project(positions.get(idx)?)?;
            Some((idx, (screen - *click).norm_squared()))
        })
        // first candidate wins ties, so ordering stays deterministic
        .fold(None, |best: Option<(usize, f32)>, (idx, d2)| match best {
            Some((_, best_d2)) if best_d2 <= d2 => best,
            _ => Some((idx, d2)),
        })?;

    (distance_sq_px <= tolerance_sq).then_some(PickHit {
        index: best,
        stage: PickStage::ScreenSpace { distance_sq_px },
    })
}
