// Host-side tests for constants and their relationships.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}

use constants::*;

#[test]
#[allow(clippy::assertions_on_constants)]
fn consumer_tuning_is_within_reasonable_bounds() {
    assert!(OVERLAY_SHIFT_PX > 0.0 && OVERLAY_SHIFT_PX < 100.0);
    assert!(LAYER_ROTATION_DEG > 0.0 && LAYER_ROTATION_DEG < 45.0);
    assert!(LAYER_DEPTH_DEFAULT > 0.0);
    // Overlay smoothing is a scale on the shared factor; it must stay a factor.
    assert!(OVERLAY_SMOOTHING_SCALE > 0.0 && OVERLAY_SMOOTHING_SCALE <= 1.0);
    assert!(SPOTLIGHT_TRAVEL > 0.0);
    assert!(SPOTLIGHT_INTENSITY > 0.0);
    assert!(BACK_WALL_Z < 0.0);
    assert!(MAX_FRAME_MS > 16.67);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn capture_size_is_small_landscape() {
    assert!(CAPTURE_WIDTH > CAPTURE_HEIGHT);
    assert!(CAPTURE_WIDTH <= 640);
}

#[test]
fn element_ids_are_distinct() {
    let ids = [
        CANVAS_ID,
        STATUS_ID,
        PERMISSION_PROMPT_ID,
        PERMISSION_BUTTON_ID,
        HINT_OVERLAY_ID,
        OVERLAY_ID,
    ];
    for (i, a) in ids.iter().enumerate() {
        for b in &ids[i + 1..] {
            assert_ne!(a, b);
        }
    }
}
