// Host-side tests for pure input functions.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod input {
    include!("../src/input.rs");
}

use input::*;
use parallax_core::Source;

#[test]
fn keys_map_to_actions_case_insensitively() {
    assert_eq!(action_for_key("r"), Some(KeyAction::Recalibrate));
    assert_eq!(action_for_key("R"), Some(KeyAction::Recalibrate));
    assert_eq!(action_for_key("p"), Some(KeyAction::Restart));
    assert_eq!(action_for_key("h"), Some(KeyAction::ToggleHint));
    assert_eq!(action_for_key("H"), Some(KeyAction::ToggleHint));
}

#[test]
fn unbound_keys_do_nothing() {
    for key in ["a", "Enter", " ", "", "rr", "Shift"] {
        assert_eq!(action_for_key(key), None, "key {key:?}");
    }
}

#[test]
fn every_source_has_a_distinct_label() {
    let labels: Vec<&str> = Source::ALL.iter().map(|s| source_label(*s)).collect();
    for (i, a) in labels.iter().enumerate() {
        assert!(!a.is_empty());
        for b in &labels[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn overlay_transform_flips_y_for_css() {
    assert_eq!(overlay_transform(3.0, 2.0), "translate3d(3.00px, -2.00px, 0)");
    assert_eq!(overlay_transform(-1.5, -4.0), "translate3d(-1.50px, 4.00px, 0)");
}

#[test]
fn layer_transform_scales_by_depth() {
    let t = layer_transform(2.0, 1.0, 0.5);
    assert!(t.contains("rotateX(0.500deg)"), "{t}");
    assert!(t.contains("rotateY(1.000deg)"), "{t}");
}

#[test]
fn depth_attribute_falls_back_on_garbage() {
    assert_eq!(parse_depth(Some("2.5"), 1.0), 2.5);
    assert_eq!(parse_depth(Some(" 0.25 "), 1.0), 0.25);
    assert_eq!(parse_depth(Some("deep"), 1.0), 1.0);
    assert_eq!(parse_depth(Some("NaN"), 1.0), 1.0);
    assert_eq!(parse_depth(None, 0.7), 0.7);
}

#[test]
fn detector_box_is_normalized_to_centroid() {
    let [cx, cy, w, h] = normalize_box(120.0, 60.0, 80.0, 120.0, 320.0, 240.0).unwrap();
    assert!((cx - 0.5).abs() < 1e-6);
    assert!((cy - 0.5).abs() < 1e-6);
    assert!((w - 0.25).abs() < 1e-6);
    assert!((h - 0.5).abs() < 1e-6);
}

#[test]
fn detector_box_needs_video_dimensions() {
    assert!(normalize_box(10.0, 10.0, 50.0, 50.0, 0.0, 240.0).is_none());
    assert!(normalize_box(10.0, 10.0, 50.0, 50.0, 320.0, 0.0).is_none());
}
