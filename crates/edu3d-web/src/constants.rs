// Web frontend tuning constants

// Renderer
pub const MSAA_SAMPLES: u32 = 4;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
// Per frame; fixtures plus the largest catalog entry fit comfortably.
pub const MAX_DRAWS: usize = 512;
pub const DRAW_UNIFORM_STRIDE: u64 = 256; // WebGPU minUniformBufferOffsetAlignment
pub const SHADOW_BIAS: f32 = 0.0025;

// Input
pub const WHEEL_PIXELS_PER_STEP: f64 = 100.0;
pub const WHEEL_LINES_PER_STEP: f64 = 3.0;
pub const PAN_BUTTON: i16 = 2; // right mouse button pans where allowed
