// Consumer tuning and DOM wiring constants used by the web frontend.

// Page elements
pub const CANVAS_ID: &str = "app-canvas";
pub const STATUS_ID: &str = "tracking-status";
pub const PERMISSION_PROMPT_ID: &str = "permission-prompt";
pub const PERMISSION_BUTTON_ID: &str = "permission-button";
pub const HINT_OVERLAY_ID: &str = "hint-overlay";
pub const OVERLAY_ID: &str = "parallax-overlay";
pub const LAYER_CLASS: &str = "parallax-layer";

// Globals the embedding page may provide
pub const CONFIG_GLOBAL: &str = "PARALLAX_CONFIG";
pub const FACE_DETECTOR_GLOBAL: &str = "parallaxFaceDetector";

// Camera capture request (small frames are plenty for a face centroid)
pub const CAPTURE_WIDTH: u32 = 320;
pub const CAPTURE_HEIGHT: u32 = 240;

// Overlay UI: pixels of shift at full offset
pub const OVERLAY_SHIFT_PX: f32 = 14.0;
// Parallax layers: degrees of rotation at full offset, before per-layer depth
pub const LAYER_ROTATION_DEG: f32 = 6.0;
pub const LAYER_DEPTH_DEFAULT: f32 = 1.0;

// Overlay UI eases slower than the camera rig
pub const OVERLAY_SMOOTHING_SCALE: f32 = 0.6;

// Shader spotlight
pub const SPOTLIGHT_TRAVEL: f32 = 2.6; // world units across the back wall per unit offset
pub const SPOTLIGHT_INTENSITY: f32 = 1.0;
pub const BACK_WALL_Z: f32 = -4.0;

// Frame time clamp (ms); longer gaps (hidden tab) are treated as one long frame
pub const MAX_FRAME_MS: f32 = 250.0;
