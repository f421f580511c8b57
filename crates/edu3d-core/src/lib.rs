//! Scene lifecycle core for the edu3d subject gallery.
//!
//! Everything here is platform-free: the web frontend supplies a
//! [`Renderer`], a [`Host`] for frame scheduling and a [`CapabilityProvider`].

pub mod camera;
pub mod capability;
pub mod catalog;
pub mod constants;
pub mod controls;
pub mod error;
pub mod geometry;
pub mod manager;
pub mod material;
pub mod motion;
pub mod quality;
pub mod render;
pub mod scene;
pub mod throttle;

pub use camera::Camera;
pub use capability::{
    is_touch_user_agent, prefers_low_quality, CapabilityProvider, DeviceCapabilities, Viewport,
};
pub use catalog::{build_catalog, CatalogEntry, Subject};
pub use controls::OrbitControls;
pub use error::SceneError;
pub use geometry::{Geometry, MeshData, Shape, Topology};
pub use manager::{FrameOutcome, SceneManager, SceneStatus};
pub use material::{Material, Texture};
pub use motion::Motion;
pub use quality::QualityProfile;
pub use render::{FrameHandle, Host, RenderSettings, Renderer};
pub use scene::{
    DisposeReport, Fog, Light, Mesh, MeshId, Node, Orbit, Scene, ShadowSettings, Transform,
};
pub use throttle::FrameThrottle;
