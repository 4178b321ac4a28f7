//! Integration tests for scene file load and export

use std::fs;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;
use v3d_core::{PointId, RandomSceneParams, SceneModel};
use v3d_io::{export_model, load_into};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("v3d_it_{}_{}.json", name, std::process::id()))
}

#[test]
fn test_generate_export_clear_reimport() {
    let path = temp_path("roundtrip");
    let mut rng = StdRng::seed_from_u64(2024);
    let mut model = SceneModel::new();
    model.randomize_with_rng(&mut rng, &RandomSceneParams::new(50, 10));
    let before = model.clone();

    export_model(&model, &path).unwrap();
    model.clear();
    assert_eq!(model.counts(), (0, 0));

    load_into(&mut model, &path).unwrap();
    assert_eq!(model.counts(), (50, 10));
    assert_eq!(model, before);

    let _ = fs::remove_file(&path);
}

#[test]
fn test_failed_load_keeps_previous_scene() {
    let path = temp_path("broken");
    fs::write(&path, "definitely not json").unwrap();

    let mut model = SceneModel::new();
    model.randomize(&RandomSceneParams::new(5, 2));
    let before = model.clone();

    assert!(load_into(&mut model, &path).is_err());
    assert_eq!(model, before);

    let _ = fs::remove_file(&path);
}

#[test]
fn test_permissive_document_shape() {
    let path = temp_path("permissive");
    fs::write(
        &path,
        r#"{
  "points": [
    {"id": "a", "x": 1, "y": 2, "z": 3, "label": "ignored"},
    {"x": 4, "y": 5, "z": 6, "size": 8, "color": [0, 0, 1, 1]}
  ],
  "segments": [
    {"start": [0, 0, 0], "end": [1, 1, 1], "color": [0, 1, 0, 1], "width": 2},
    {"start": [0, 0, 0]}
  ],
  "meta": {"version": 3}
}"#,
    )
    .unwrap();

    let mut model = SceneModel::new();
    load_into(&mut model, &path).unwrap();
    assert_eq!(model.counts(), (2, 2));
    assert_eq!(model.points()[0].id, Some(PointId::from("a")));
    assert!(model.points()[0].color.is_none());
    assert_eq!(model.points()[1].size, Some(8.0));
    assert!(model.segments()[1].endpoints().is_none());

    let _ = fs::remove_file(&path);
}

#[test]
fn test_import_export_preserves_numbers_and_ids() {
    let source = temp_path("precise_in");
    let target = temp_path("precise_out");
    let input = serde_json::json!({
        "points": [
            {"id": 12, "x": 0.30000000000000004, "y": 123456789.123456789, "z": 1e39, "size": 7.5},
            {"id": "label", "x": -2.5, "y": 0.0, "z": 1e-9}
        ],
        "segments": [{"start": [0.1, 0.2, 0.3], "end": [1e40, 0.0, 0.0]}]
    });
    fs::write(&source, input.to_string()).unwrap();

    let mut model = SceneModel::new();
    load_into(&mut model, &source).unwrap();
    assert_eq!(model.points()[0].id, Some(PointId::from(12u64)));
    export_model(&model, &target).unwrap();

    let exported: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
    assert_eq!(exported, input);

    let _ = fs::remove_file(&source);
    let _ = fs::remove_file(&target);
}
