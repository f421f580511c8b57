// Shared scene tuning constants used by the lifecycle manager and the web frontend.

// Capability thresholds
pub const MOBILE_BREAKPOINT_PX: f64 = 768.0; // viewports narrower than this prefer low quality
pub const SLOW_CONNECTION_TYPES: &[&str] = &["slow-2g", "2g"];

// Lifecycle
pub const LOADING_DELAY_MS: i32 = 500; // hides the first-layout flash before the spinner drops
pub const MAX_FRAME_DT_SEC: f32 = 0.1; // clamp for spin integration after long stalls

// Scene look
pub const BACKGROUND_RGB: [f32; 3] = [0.039, 0.055, 0.102];
pub const FOG_DENSITY_LOW: f32 = 0.035;
pub const FOG_DENSITY_HIGH: f32 = 0.02;

// Camera
pub const CAMERA_FOV_DEG: f32 = 60.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CONTROLS_TARGET: [f32; 3] = [0.0, 1.0, 0.0]; // slightly above the origin
pub const MIN_DISTANCE: f32 = 3.0;
// Keeps the eye above the ground.
pub const MAX_POLAR_ANGLE: f32 = std::f32::consts::FRAC_PI_2 * 0.95;
pub const ROTATE_SPEED: f32 = 1.0;
pub const ZOOM_STEP: f32 = 0.95; // dolly scale per wheel notch

// Lights
pub const HEMI_SKY_RGB: [f32; 3] = [1.0, 1.0, 1.0];
pub const HEMI_GROUND_RGB: [f32; 3] = [0.267, 0.267, 0.267];
pub const HEMI_INTENSITY: f32 = 0.6;
pub const KEY_LIGHT_POSITION: [f32; 3] = [5.0, 10.0, 5.0];
pub const KEY_LIGHT_INTENSITY: f32 = 1.0;
pub const SHADOW_FRUSTUM_HALF_EXTENT: f32 = 10.0;
pub const SHADOW_NEAR: f32 = 0.5;
pub const SHADOW_FAR: f32 = 50.0;
pub const ACCENT_LIGHTS: [([f32; 3], [f32; 3]); 2] = [
    ([-5.0, 3.0, -5.0], [0.31, 0.82, 0.77]), // teal
    ([5.0, 3.0, 5.0], [0.62, 0.48, 0.92]),   // violet
];
pub const ACCENT_INTENSITY: f32 = 0.5;
pub const ACCENT_DISTANCE: f32 = 20.0;

// Fixtures
pub const GROUND_SIZE: f32 = 40.0;
pub const GROUND_RGB: [f32; 3] = [0.1, 0.12, 0.18];
pub const GRID_DIVISIONS: u32 = 40;
pub const GRID_RGB: [f32; 3] = [0.27, 0.33, 0.45];

// Material polish applied to every catalog mesh
pub const POLISH_ROUGHNESS_SCALE: f32 = 0.9;
pub const POLISH_ROUGHNESS_MIN: f32 = 0.15;
pub const POLISH_METALNESS_BIAS: f32 = 0.05;
pub const POLISH_METALNESS_MAX: f32 = 0.9;

// Seed for procedurally placed detail (cell organelles, virus spikes)
pub const CATALOG_SEED: u64 = 42;
