use crate::dom::Listener;
use edu3d_core::{FrameHandle, Host};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// requestAnimationFrame scheduling plus the listeners wired for one mount.
pub struct WebHost {
    window: web::Window,
    frame_cb: FrameCallback,
    listeners: Vec<Listener>,
    timeouts: Vec<i32>,
}

impl WebHost {
    pub fn new(window: web::Window, frame_cb: FrameCallback) -> Self {
        Self {
            window,
            frame_cb,
            listeners: Vec::new(),
            timeouts: Vec::new(),
        }
    }

    pub fn add_listener(&mut self, listener: Option<Listener>) {
        if let Some(l) = listener {
            self.listeners.push(l);
        }
    }

    /// Run `f` once after `delay_ms`; cleared on teardown if still pending.
    pub fn set_timeout(&mut self, delay_ms: i32, f: impl FnOnce() + 'static) {
        let cb = Closure::once_into_js(f);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), delay_ms)
        {
            Ok(id) => self.timeouts.push(id),
            Err(e) => log::warn!("[host] setTimeout failed: {:?}", e),
        }
    }
}

impl Host for WebHost {
    fn request_frame(&mut self) -> FrameHandle {
        let slot = self.frame_cb.borrow();
        let Some(cb) = slot.as_ref() else {
            return 0;
        };
        self.window
            .request_animation_frame(cb.as_ref().unchecked_ref())
            .unwrap_or_else(|e| {
                log::warn!("[host] requestAnimationFrame failed: {:?}", e);
                0
            })
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let _ = self.window.cancel_animation_frame(handle);
    }

    fn remove_listeners(&mut self) {
        let n = self.listeners.len();
        for l in self.listeners.drain(..) {
            l.remove();
        }
        for id in self.timeouts.drain(..) {
            self.window.clear_timeout_with_handle(id);
        }
        log::debug!("[host] removed {} listeners", n);
    }
}

impl Drop for WebHost {
    fn drop(&mut self) {
        self.remove_listeners();
        self.frame_cb.borrow_mut().take();
    }
}
