use crate::camera::Camera;
use crate::scene::{MeshId, Scene};

/// Output configuration handed to a renderer at mount and on quality changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderSettings {
    pub antialias: bool,
    pub shadows: bool,
    pub shadow_map_size: u32,
    pub pixel_ratio: f64,
    /// Logical (CSS) pixels.
    pub width: f64,
    pub height: f64,
    pub clear_color: [f32; 3],
}

/// Backend that turns the scene graph into pixels.
///
/// Implementations own their output surface (a canvas on the web) and any GPU
/// resources cached per [`MeshId`].
pub trait Renderer {
    fn configure(&mut self, settings: &RenderSettings);
    fn set_pixel_ratio(&mut self, ratio: f64);
    fn set_size(&mut self, width: f64, height: f64);
    /// Draw fixtures and attached models only.
    fn render(&mut self, scene: &Scene, camera: &Camera);
    /// Drop cached resources for a disposed mesh.
    fn release_mesh(&mut self, id: MeshId);
    /// Release the device-side context.
    fn dispose(&mut self);
    /// Remove the output surface from its container.
    fn detach(&mut self);
}

/// Handle returned by [`Host::request_frame`].
pub type FrameHandle = i32;

/// Frame scheduling and event wiring supplied by the embedding page.
pub trait Host {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
    /// Remove every resize/visibility/input listener the host registered.
    fn remove_listeners(&mut self);
}
