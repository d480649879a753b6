// Tuning constants shared by the estimators and the smoothing layer.

// Reference frame duration the downstream smoothing factor is expressed in.
pub const REFERENCE_FRAME_MS: f32 = 16.67;

// Face depth mapping: apparent-size ratio window mapped onto z in [1, -1]
pub const FACE_RATIO_FAR: f32 = 0.6;
pub const FACE_RATIO_NEAR: f32 = 1.6;

// Ambient Lissajous curve
pub const AMBIENT_FREQ_X: f32 = 1.0;
pub const AMBIENT_FREQ_Y: f32 = 2.0;
pub const AMBIENT_PHASE: f32 = std::f32::consts::FRAC_PI_4;
pub const AMBIENT_BREATH_AMPLITUDE: f32 = 0.06;
pub const AMBIENT_BREATH_HZ: f32 = 0.1;

// Device classification: touch-capable and at most this wide (CSS px)
pub const HANDHELD_MAX_WIDTH: f32 = 768.0;

// Camera rig
pub const RIG_CAMERA_Z: f32 = 6.0;
pub const RIG_TRAVEL_XY: f32 = 1.2; // world units per unit of offset
pub const RIG_TRAVEL_Z: f32 = 1.5;
