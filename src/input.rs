// Pure input helpers shared by the event handlers; kept free of web types so
// they can be tested on the host.

use parallax_core::Source;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Recalibrate,
    Restart,
    ToggleHint,
}

#[inline]
pub fn action_for_key(key: &str) -> Option<KeyAction> {
    match key {
        "r" | "R" => Some(KeyAction::Recalibrate),
        "p" | "P" => Some(KeyAction::Restart),
        "h" | "H" => Some(KeyAction::ToggleHint),
        _ => None,
    }
}

/// Human-readable label for the status line.
#[inline]
pub fn source_label(source: Source) -> &'static str {
    match source {
        Source::Face => "Following your head",
        Source::Orientation => "Following device tilt",
        Source::Pointer => "Following the pointer",
        Source::Ambient => "Drifting",
    }
}

/// CSS transform for the overlay consumer; `x`/`y` already carry the pixel
/// gain. Screen-up is positive in offset space but negative in CSS.
#[inline]
pub fn overlay_transform(x: f32, y: f32) -> String {
    format!("translate3d({:.2}px, {:.2}px, 0)", x, -y)
}

/// CSS transform for one parallax layer; `x`/`y` carry the rotation gain in
/// degrees and `depth` scales it per layer.
#[inline]
pub fn layer_transform(x: f32, y: f32, depth: f32) -> String {
    format!(
        "perspective(900px) rotateX({:.3}deg) rotateY({:.3}deg)",
        y * depth,
        x * depth
    )
}

/// Parse a `data-depth` attribute, falling back to `default` when missing or
/// not a finite number.
#[inline]
pub fn parse_depth(attr: Option<&str>, default: f32) -> f32 {
    attr.and_then(|s| s.trim().parse::<f32>().ok())
        .filter(|d| d.is_finite())
        .unwrap_or(default)
}

/// Normalize a detector box given in video pixels into a centroid + size in
/// `0..1` video space. `None` when the video has no dimensions yet.
#[inline]
pub fn normalize_box(
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    video_w: f32,
    video_h: f32,
) -> Option<[f32; 4]> {
    if !(video_w > 0.0 && video_h > 0.0) {
        return None;
    }
    let w = width / video_w;
    let h = height / video_h;
    Some([x / video_w + w * 0.5, y / video_h + h * 0.5, w, h])
}
