use edu3d_core::{is_touch_user_agent, CapabilityProvider, DeviceCapabilities, Viewport};
use wasm_bindgen::JsValue;
use web_sys as web;

/// Reads device hints from the live browser each time it is asked.
pub struct BrowserCapabilities {
    window: web::Window,
}

impl BrowserCapabilities {
    pub fn new(window: web::Window) -> Self {
        Self { window }
    }
}

fn number(value: &JsValue) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

/// Window inner size and device pixel ratio, falling back to a desktop-sized
/// viewport when the window reports nothing usable.
pub fn current_viewport(window: &web::Window) -> Viewport {
    let width = window.inner_width().ok().as_ref().and_then(number);
    let height = window.inner_height().ok().as_ref().and_then(number);
    let dpr = window.device_pixel_ratio();
    match (width, height) {
        (Some(w), Some(h)) => Viewport::new(w, h, dpr).unwrap_or_else(|e| {
            log::warn!("[caps] {}; using fallback viewport", e);
            fallback_viewport(dpr)
        }),
        _ => fallback_viewport(dpr),
    }
}

fn fallback_viewport(dpr: f64) -> Viewport {
    Viewport {
        width: 1024.0,
        height: 768.0,
        device_pixel_ratio: if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 },
    }
}

impl CapabilityProvider for BrowserCapabilities {
    fn capabilities(&self) -> DeviceCapabilities {
        let navigator = self.window.navigator();
        let user_agent = navigator.user_agent().unwrap_or_default();
        // navigator.connection is non-standard; read it reflectively
        let connection = js_sys::Reflect::get(&navigator, &JsValue::from_str("connection"))
            .ok()
            .filter(|c| c.is_object());
        let field = |name: &str| {
            connection
                .as_ref()
                .and_then(|c| js_sys::Reflect::get(c, &JsValue::from_str(name)).ok())
        };
        let save_data = field("saveData").and_then(|v| v.as_bool()).unwrap_or(false);
        let effective_type = field("effectiveType").and_then(|v| v.as_string());
        let touch = navigator.max_touch_points() > 0 || is_touch_user_agent(&user_agent);
        DeviceCapabilities {
            viewport: current_viewport(&self.window),
            user_agent,
            save_data,
            effective_type,
            touch,
        }
    }
}
