//! Device capability inputs and the low-quality decision.
//!
//! The decision is a pure function of [`DeviceCapabilities`]; browsers supply
//! them through a [`CapabilityProvider`] so tests can inject any device.

use crate::constants::{MOBILE_BREAKPOINT_PX, SLOW_CONNECTION_TYPES};
use crate::error::SceneError;

/// Size of the drawing area in logical (CSS) pixels plus the device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Result<Self, SceneError> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(SceneError::InvalidViewport { width, height });
        }
        let device_pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        Ok(Self {
            width,
            height,
            device_pixel_ratio,
        })
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        (self.width / self.height) as f32
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeviceCapabilities {
    pub viewport: Viewport,
    pub user_agent: String,
    pub save_data: bool,
    pub effective_type: Option<String>,
    pub touch: bool,
}

/// Source of device signals. Implementations must not have side effects.
pub trait CapabilityProvider {
    fn capabilities(&self) -> DeviceCapabilities;
}

impl CapabilityProvider for DeviceCapabilities {
    fn capabilities(&self) -> DeviceCapabilities {
        self.clone()
    }
}

/// Narrow viewports and data-saving or 2G-class connections render at low quality.
pub fn prefers_low_quality(caps: &DeviceCapabilities) -> bool {
    caps.viewport.width < MOBILE_BREAKPOINT_PX
        || caps.save_data
        || caps
            .effective_type
            .as_deref()
            .map(is_slow_connection)
            .unwrap_or(false)
}

#[inline]
pub fn is_slow_connection(effective_type: &str) -> bool {
    let t = effective_type.trim().to_ascii_lowercase();
    SLOW_CONNECTION_TYPES.iter().any(|s| *s == t)
}

pub fn is_touch_user_agent(user_agent: &str) -> bool {
    const MARKERS: [&str; 8] = [
        "android",
        "webos",
        "iphone",
        "ipad",
        "ipod",
        "blackberry",
        "iemobile",
        "opera mini",
    ];
    let ua = user_agent.to_ascii_lowercase();
    MARKERS.iter().any(|m| ua.contains(m)) || ua.contains("mobile")
}
