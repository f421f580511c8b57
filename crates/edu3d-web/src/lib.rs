#![cfg(target_arch = "wasm32")]
//! Browser frontend for the edu3d subject gallery: wires the platform-free
//! scene manager to WebGPU, requestAnimationFrame and DOM events.

mod capability;
mod constants;
mod dom;
mod host;
mod input;
mod mount;
mod render;

use capability::{current_viewport, BrowserCapabilities};
use dom::Listener;
use edu3d_core::constants::LOADING_DELAY_MS;
use edu3d_core::{Renderer, SceneManager, Subject};
use host::{FrameCallback, WebHost};
use input::{wheel_steps, Gesture, PointerDrag};
use mount::MountTracker;
use instant::Instant;
use render::GpuRenderer;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

type Manager = SceneManager<GpuRenderer, WebHost>;

struct Gallery {
    subject: Subject,
    canvas: web::HtmlCanvasElement,
    manager: RefCell<Option<Manager>>,
    drag: RefCell<PointerDrag>,
    mount: RefCell<MountTracker>,
}

impl Gallery {
    fn with_manager<T>(&self, f: impl FnOnce(&mut Manager) -> T) -> Option<T> {
        let mut slot = self.manager.try_borrow_mut().ok()?;
        slot.as_mut().map(f)
    }

    fn peek<T>(&self, f: impl FnOnce(&Manager) -> T) -> Option<T> {
        let slot = self.manager.try_borrow().ok()?;
        slot.as_ref().map(f)
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("edu3d-web loaded");
    Ok(())
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Mount a gallery for `subject` into the element with id `container_id`.
///
/// Returns immediately; the scene goes live once WebGPU is ready
/// (see [`GalleryHandle::is_ready`]).
#[wasm_bindgen]
pub fn mount_gallery(container_id: &str, subject: &str) -> Result<GalleryHandle, JsValue> {
    let subject: Subject = subject.parse().map_err(js_err)?;
    let window = web::window().ok_or_else(|| js_err("no window"))?;
    let document = window.document().ok_or_else(|| js_err("no document"))?;
    let container = document
        .get_element_by_id(container_id)
        .ok_or_else(|| js_err(format!("missing #{container_id}")))?;
    let canvas = dom::create_canvas(&document, &container).map_err(js_err)?;
    let viewport = current_viewport(&window);
    canvas.set_width(((viewport.width * viewport.device_pixel_ratio) as u32).max(1));
    canvas.set_height(((viewport.height * viewport.device_pixel_ratio) as u32).max(1));

    let gallery = Rc::new(Gallery {
        subject,
        canvas: canvas.clone(),
        manager: RefCell::new(None),
        drag: RefCell::new(PointerDrag::default()),
        mount: RefCell::new(MountTracker::default()),
    });
    let weak = Rc::downgrade(&gallery);
    spawn_local(async move {
        let started = Instant::now();
        let mut renderer = match GpuRenderer::new(canvas.clone()).await {
            Ok(r) => r,
            Err(e) => {
                log::error!("[mount] WebGPU init error: {:?}", e);
                canvas.remove();
                if let Some(g) = weak.upgrade() {
                    g.mount.borrow_mut().init_failed(e.to_string());
                }
                return;
            }
        };
        let gallery = match weak.upgrade() {
            Some(g) if g.mount.borrow_mut().init_succeeded() => g,
            _ => {
                log::info!("[mount] unmounted during GPU init; releasing renderer");
                renderer.dispose();
                renderer.detach();
                return;
            }
        };
        go_live(&gallery, window, document, renderer);
        log::info!(
            "[mount] {} live in {} ms",
            gallery.subject,
            started.elapsed().as_millis()
        );
    });
    Ok(GalleryHandle { inner: gallery })
}

fn go_live(
    gallery: &Rc<Gallery>,
    window: web::Window,
    document: web::Document,
    renderer: GpuRenderer,
) {
    let frame_cb: FrameCallback = Rc::new(RefCell::new(None));
    {
        let weak = Rc::downgrade(gallery);
        *frame_cb.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
            if let Some(g) = weak.upgrade() {
                g.with_manager(|m| m.on_frame(now));
            }
        }) as Box<dyn FnMut(f64)>));
    }
    let mut host = WebHost::new(window.clone(), frame_cb);
    wire_listeners(gallery, &window, &document, &mut host);
    {
        let weak = Rc::downgrade(gallery);
        host.set_timeout(LOADING_DELAY_MS, move || {
            if let Some(g) = weak.upgrade() {
                g.with_manager(|m| m.complete_loading());
            }
        });
    }
    let caps = BrowserCapabilities::new(window);
    let manager = SceneManager::mount(gallery.subject, &caps, renderer, host);
    *gallery.manager.borrow_mut() = Some(manager);
}

fn wire_listeners(
    gallery: &Rc<Gallery>,
    window: &web::Window,
    document: &web::Document,
    host: &mut WebHost,
) {
    // Window resize: camera aspect and renderer size follow the viewport
    {
        let weak = Rc::downgrade(gallery);
        let win = window.clone();
        host.add_listener(Listener::add(window, "resize", move |_| {
            if let Some(g) = weak.upgrade() {
                let viewport = current_viewport(&win);
                g.with_manager(|m| m.resize(viewport));
            }
        }));
    }
    // Page visibility: pause the loop while hidden
    {
        let weak = Rc::downgrade(gallery);
        let doc = document.clone();
        host.add_listener(Listener::add(document, "visibilitychange", move |_| {
            if let Some(g) = weak.upgrade() {
                let visible = doc.visibility_state() == web::VisibilityState::Visible;
                g.with_manager(|m| m.set_visible(visible));
            }
        }));
    }

    let canvas = gallery.canvas.clone();
    {
        let weak = Rc::downgrade(gallery);
        let target = canvas.clone();
        host.add_listener(Listener::add(&canvas, "pointerdown", move |ev| {
            let (Some(g), Some(ev)) = (weak.upgrade(), ev.dyn_ref::<web::PointerEvent>()) else {
                return;
            };
            let pan_allowed = ev.pointer_type() != "touch";
            g.drag.borrow_mut().begin(
                ev.pointer_id(),
                ev.button(),
                ev.shift_key(),
                pan_allowed,
                ev.client_x() as f64,
                ev.client_y() as f64,
            );
            let _ = target.set_pointer_capture(ev.pointer_id());
        }));
    }
    {
        let weak = Rc::downgrade(gallery);
        host.add_listener(Listener::add(&canvas, "pointermove", move |ev| {
            let (Some(g), Some(ev)) = (weak.upgrade(), ev.dyn_ref::<web::PointerEvent>()) else {
                return;
            };
            let gesture = g.drag.borrow_mut().moved(
                ev.pointer_id(),
                ev.client_x() as f64,
                ev.client_y() as f64,
            );
            match gesture {
                Some(Gesture::Rotate { dx, dy }) => {
                    g.with_manager(|m| m.rotate(dx, dy));
                }
                Some(Gesture::Pan { dx, dy }) => {
                    g.with_manager(|m| m.pan(dx, dy));
                }
                None => {}
            }
        }));
    }
    for event in ["pointerup", "pointercancel"] {
        let weak = Rc::downgrade(gallery);
        let target = canvas.clone();
        host.add_listener(Listener::add(&canvas, event, move |ev| {
            let (Some(g), Some(ev)) = (weak.upgrade(), ev.dyn_ref::<web::PointerEvent>()) else {
                return;
            };
            g.drag.borrow_mut().end(ev.pointer_id());
            let _ = target.release_pointer_capture(ev.pointer_id());
        }));
    }
    {
        let weak = Rc::downgrade(gallery);
        host.add_listener(Listener::add_active(&canvas, "wheel", move |ev| {
            let (Some(g), Some(wheel)) = (weak.upgrade(), ev.dyn_ref::<web::WheelEvent>()) else {
                return;
            };
            ev.prevent_default();
            let steps = wheel_steps(wheel.delta_y(), wheel.delta_mode());
            g.with_manager(|m| m.zoom(steps));
        }));
    }
    host.add_listener(Listener::add(&canvas, "contextmenu", |ev| ev.prevent_default()));
}

/// JS-side handle to one mounted gallery.
#[wasm_bindgen]
pub struct GalleryHandle {
    inner: Rc<Gallery>,
}

#[wasm_bindgen]
impl GalleryHandle {
    /// True once the scene is mounted and rendering.
    pub fn is_ready(&self) -> bool {
        self.inner.peek(|m| m.is_live()).unwrap_or(false)
    }

    /// Why GPU init failed, if it did. The page can show a fallback.
    pub fn error(&self) -> Option<String> {
        self.inner.mount.borrow().error().map(str::to_string)
    }

    pub fn subject(&self) -> String {
        self.inner.subject.to_string()
    }

    pub fn switch_model(&self, index: usize) -> bool {
        self.inner
            .with_manager(|m| m.switch_model(index))
            .unwrap_or(false)
    }

    pub fn current_model(&self) -> usize {
        self.inner
            .peek(|m| m.status().current_index)
            .unwrap_or(0)
    }

    pub fn model_count(&self) -> usize {
        self.inner.peek(|m| m.entries().len()).unwrap_or(0)
    }

    pub fn model_name(&self, index: usize) -> Option<String> {
        self.inner
            .peek(|m| m.entries().get(index).map(|e| e.name.to_string()))
            .flatten()
    }

    pub fn model_description(&self, index: usize) -> Option<String> {
        self.inner
            .peek(|m| m.entries().get(index).map(|e| e.description.to_string()))
            .flatten()
    }

    /// Loading until the first layout settles; also while GPU init is pending.
    /// False once init has failed or the gallery is unmounted.
    pub fn is_loading(&self) -> bool {
        let scene_loading = self.inner.peek(|m| m.status().loading);
        self.inner.mount.borrow().is_loading(scene_loading)
    }

    pub fn is_low_quality(&self) -> bool {
        self.inner
            .peek(|m| m.status().low_quality)
            .unwrap_or(false)
    }

    pub fn toggle_quality(&self) {
        self.inner.with_manager(|m| m.toggle_quality());
    }

    pub fn reset_camera(&self) {
        self.inner.with_manager(|m| m.reset_camera());
    }

    /// Tear the scene down. Safe to call more than once, and before the
    /// scene is live.
    pub fn unmount(&self) {
        let g = &self.inner;
        if !g.mount.borrow_mut().unmount() {
            return;
        }
        let manager = g.manager.try_borrow_mut().ok().and_then(|mut slot| slot.take());
        match manager {
            Some(mut m) => {
                m.teardown();
            }
            None => {
                g.canvas.remove();
                log::info!("[mount] unmount before scene went live");
            }
        }
    }
}
