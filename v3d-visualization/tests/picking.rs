//! Picking and selection through the renderer on the headless backend

use rand::rngs::StdRng;
use rand::SeedableRng;
use v3d_core::{Point, Point3f, RandomSceneParams, SceneDocument, SceneModel, Segment};
use v3d_visualization::{HeadlessBackend, RenderBackend, RendererConfig, SceneRenderer};

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;

fn renderer() -> SceneRenderer<HeadlessBackend> {
    SceneRenderer::new(HeadlessBackend::new(WIDTH, HEIGHT), RendererConfig::default()).unwrap()
}

fn spread_model() -> SceneModel {
    SceneModel::from(SceneDocument::new(
        vec![
            Point::new(-3.0, 0.0, 0.0).with_id("left"),
            Point::new(0.0, 0.0, 0.0).with_id("middle").with_color([0.0, 0.0, 1.0, 1.0]),
            Point::new(3.0, 0.0, 0.0).with_id("right").with_size(9.0),
            Point::new(0.0, 3.0, 1.0).with_id("back"),
        ],
        vec![Segment::new([-3.0, 0.0, 0.0], [3.0, 0.0, 0.0])],
    ))
}

fn random_model(n_points: usize, n_segments: usize) -> SceneModel {
    let mut rng = StdRng::seed_from_u64(7);
    let mut model = SceneModel::new();
    model.randomize_with_rng(&mut rng, &RandomSceneParams::new(n_points, n_segments));
    model
}

/// Screen position of a rendered point
fn screen_of(renderer: &SceneRenderer<HeadlessBackend>, index: usize) -> (f32, f32) {
    let position = renderer.points().positions[index];
    let screen = renderer.backend().project(&position).unwrap();
    (screen.x, screen.y)
}

#[test]
fn test_render_array_lengths_match_point_count() {
    let mut renderer = renderer();
    let model = random_model(50, 10);
    renderer.render(&model);

    let points = renderer.backend().points();
    assert_eq!(points.positions.len(), 50);
    assert_eq!(points.scales.len(), 50);
    assert_eq!(points.colors.len(), 50);
    assert_eq!(renderer.backend().lines().segment_count(), 10);
    assert_eq!(renderer.backend().lines().positions.len(), 20);
}

#[test]
fn test_clear_zeroes_every_batch() {
    let mut renderer = renderer();
    renderer.render(&random_model(30, 4));
    renderer.select([0, 1]);
    renderer.clear();

    assert_eq!(renderer.backend().points().len(), 0);
    assert_eq!(renderer.backend().lines().segment_count(), 0);
    assert_eq!(renderer.backend().highlight().len(), 0);
    assert!(renderer.selected().is_empty());
}

#[test]
fn test_missing_fields_use_defaults() {
    let mut renderer = renderer();
    let model = SceneModel::from(SceneDocument::from_json_str(r#"{"points": [{}]}"#).unwrap());
    renderer.render(&model);

    let points = renderer.backend().points();
    assert_eq!(points.positions, vec![Point3f::origin()]);
    assert_eq!(points.scales, vec![6.0 * 0.05]);
    assert_eq!(points.colors, vec![[255, 255, 255]]);
}

#[test]
fn test_click_on_point_selects_it() {
    let mut renderer = renderer();
    renderer.render(&spread_model());

    for index in 0..4 {
        let (x, y) = screen_of(&renderer, index);
        assert_eq!(renderer.pick_and_select(x, y, false), Some(index));
        assert_eq!(renderer.selected(), &[index]);
    }
}

#[test]
fn test_near_miss_resolves_in_screen_space() {
    let mut renderer = renderer();
    renderer.render(&spread_model());

    let (x, y) = screen_of(&renderer, 2);
    assert_eq!(renderer.pick_and_select(x + 8.0, y - 6.0, false), Some(2));
}

#[test]
fn test_far_click_is_no_match_and_clears() {
    let mut renderer = renderer();
    renderer.render(&spread_model());
    renderer.select([1]);

    assert_eq!(renderer.pick_and_select(0.0, 0.0, false), None);
    assert!(renderer.selected().is_empty());
}

#[test]
fn test_far_click_with_multi_keeps_selection() {
    let mut renderer = renderer();
    renderer.render(&spread_model());
    renderer.select([1]);

    assert_eq!(renderer.pick_and_select(0.0, 0.0, true), None);
    assert_eq!(renderer.selected(), &[1]);
}

#[test]
fn test_multi_toggle_pairs_are_idempotent() {
    let mut renderer = renderer();
    renderer.render(&spread_model());

    let (x0, y0) = screen_of(&renderer, 0);
    let (x3, y3) = screen_of(&renderer, 3);
    renderer.pick_and_select(x0, y0, false);
    let before = renderer.selected().to_vec();

    assert_eq!(renderer.pick_and_select(x3, y3, true), Some(3));
    assert_eq!(renderer.selected(), &[0, 3]);
    assert_eq!(renderer.pick_and_select(x3, y3, true), Some(3));
    assert_eq!(renderer.selected(), before.as_slice());
}

#[test]
fn test_select_then_deselect_restores_exact_appearance() {
    let mut renderer = renderer();
    renderer.render(&random_model(40, 0));
    let pristine = renderer.backend().points().clone();

    let (x, y) = screen_of(&renderer, 17);
    let picked = renderer.pick_and_select(x, y, true).unwrap();
    let highlighted = renderer.backend().points();
    assert_eq!(highlighted.colors[picked], [255, 255, 0]);
    assert_eq!(highlighted.scales[picked], pristine.scales[picked] * 2.5);
    assert_eq!(renderer.backend().highlight().len(), 1);

    renderer.toggle(picked);
    assert_eq!(renderer.backend().points(), &pristine);
    assert!(renderer.backend().highlight().is_empty());
}

#[test]
fn test_shrinking_scene_drops_stale_selection() {
    let mut renderer = renderer();
    renderer.render(&random_model(20, 0));
    renderer.select([2, 15]);

    renderer.render(&random_model(5, 0));
    assert_eq!(renderer.points().len(), 5);
    assert_eq!(renderer.selected(), &[2]);
    assert_eq!(renderer.highlight().len(), 1);
    assert_eq!(renderer.highlight().positions[0], renderer.points().positions[2]);

    renderer.render(&random_model(20, 0));
    assert_eq!(renderer.selected(), &[2]);
    assert_eq!(renderer.highlight().len(), 1);
    assert_ne!(renderer.backend().points().colors[15], [255, 255, 0]);
}

#[test]
fn test_render_frames_the_scene() {
    let mut renderer = renderer();
    let model = SceneModel::from(SceneDocument::new(
        vec![Point::new(40.0, 40.0, 0.0), Point::new(44.0, 42.0, 2.0)],
        Vec::new(),
    ));
    renderer.render(&model);
    assert_eq!(renderer.backend().camera().target, Point3f::new(42.0, 41.0, 1.0));

    for index in 0..2 {
        let (x, y) = screen_of(&renderer, index);
        assert!((0.0..=WIDTH as f32).contains(&x));
        assert!((0.0..=HEIGHT as f32).contains(&y));
    }
}
