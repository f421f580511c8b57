//! Scene lifecycle: mount, per-frame update, model switching, resize and teardown.

use crate::camera::Camera;
use crate::capability::{prefers_low_quality, CapabilityProvider, DeviceCapabilities, Viewport};
use crate::catalog::{build_catalog, CatalogEntry, Subject};
use crate::constants::{MAX_FRAME_DT_SEC, ZOOM_STEP};
use crate::controls::OrbitControls;
use crate::quality::QualityProfile;
use crate::render::{FrameHandle, Host, RenderSettings, Renderer};
use crate::scene::{DisposeReport, Scene};
use crate::throttle::FrameThrottle;

/// UI-facing flags, kept in sync with but separate from the graphics objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneStatus {
    pub loading: bool,
    pub low_quality: bool,
    pub current_index: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Rendered,
    /// Arrived inside the throttle interval; the next frame is still scheduled.
    Skipped,
    /// Torn down or hidden; nothing scheduled.
    Idle,
}

struct Live<R> {
    profile: QualityProfile,
    scene: Scene,
    camera: Camera,
    controls: OrbitControls,
    renderer: R,
    throttle: FrameThrottle,
}

impl<R: Renderer> Live<R> {
    fn build(
        subject: Subject,
        caps: &DeviceCapabilities,
        low_quality: bool,
        mut renderer: R,
    ) -> Self {
        let profile = QualityProfile::select(low_quality);
        let mut camera = Camera::new(caps.viewport.aspect());
        let mut controls = OrbitControls::new(&profile, caps.touch);
        controls.reset(&mut camera, &profile);
        renderer.configure(&render_settings(&profile, &caps.viewport));
        let catalog = build_catalog(subject, &profile);
        let mut scene = Scene::new(&profile, catalog);
        scene.attach(0);
        Self {
            throttle: FrameThrottle::new(profile.target_fps),
            profile,
            scene,
            camera,
            controls,
            renderer,
        }
    }
}

fn render_settings(profile: &QualityProfile, viewport: &Viewport) -> RenderSettings {
    RenderSettings {
        antialias: profile.antialias,
        shadows: profile.shadows,
        shadow_map_size: profile.shadow_map_size,
        pixel_ratio: profile.capped_pixel_ratio(viewport.device_pixel_ratio),
        width: viewport.width,
        height: viewport.height,
        clear_color: crate::constants::BACKGROUND_RGB,
    }
}

/// Owns one subject's scene from mount to teardown.
///
/// All graphics state lives in an inner `Option`; teardown takes it, so every
/// later call finds nothing to act on.
pub struct SceneManager<R: Renderer, H: Host> {
    subject: Subject,
    caps: DeviceCapabilities,
    host: H,
    live: Option<Live<R>>,
    status: SceneStatus,
    pending: Option<FrameHandle>,
    visible: bool,
    epoch_ms: Option<f64>,
}

impl<R: Renderer, H: Host> SceneManager<R, H> {
    /// Build the scene for `subject`, attach the first catalog model and
    /// request the first frame.
    pub fn mount(
        subject: Subject,
        provider: &impl CapabilityProvider,
        renderer: R,
        mut host: H,
    ) -> Self {
        let caps = provider.capabilities();
        let low_quality = prefers_low_quality(&caps);
        let live = Live::build(subject, &caps, low_quality, renderer);
        log::info!(
            "[scene] mount subject={} low_quality={} viewport={}x{} models={}",
            subject,
            low_quality,
            caps.viewport.width,
            caps.viewport.height,
            live.scene.catalog().len()
        );
        let pending = Some(host.request_frame());
        Self {
            subject,
            caps,
            host,
            live: Some(live),
            status: SceneStatus {
                loading: true,
                low_quality,
                current_index: 0,
            },
            pending,
            visible: true,
            epoch_ms: None,
        }
    }

    #[inline]
    pub fn subject(&self) -> Subject {
        self.subject
    }

    #[inline]
    pub fn status(&self) -> SceneStatus {
        self.status
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    #[inline]
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    #[inline]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Catalog indices currently attached to the scene.
    pub fn attached(&self) -> &[usize] {
        self.live.as_ref().map(|l| l.scene.attached()).unwrap_or(&[])
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        self.live.as_ref().map(|l| l.scene.catalog()).unwrap_or(&[])
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.live.as_ref().map(|l| &l.scene)
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.live.as_ref().map(|l| &l.camera)
    }

    pub fn profile(&self) -> Option<&QualityProfile> {
        self.live.as_ref().map(|l| &l.profile)
    }

    pub fn renderer(&self) -> Option<&R> {
        self.live.as_ref().map(|l| &l.renderer)
    }

    /// Drop the loading flag once the initial layout has settled.
    pub fn complete_loading(&mut self) {
        if self.live.is_some() {
            self.status.loading = false;
        }
    }

    /// The scheduled frame callback fired at host time `now_ms`.
    pub fn on_frame(&mut self, now_ms: f64) -> FrameOutcome {
        self.pending = None;
        if !self.visible {
            return FrameOutcome::Idle;
        }
        let Some(live) = self.live.as_mut() else {
            return FrameOutcome::Idle;
        };
        self.pending = Some(self.host.request_frame());

        let Some(dt) = live.throttle.ready(now_ms) else {
            return FrameOutcome::Skipped;
        };
        let dt = dt.min(MAX_FRAME_DT_SEC);
        let epoch = *self.epoch_ms.get_or_insert(now_ms);
        let t = ((now_ms - epoch) / 1000.0) as f32;

        let spin = live.profile.spin_rate;
        for entry in live.scene.attached_entries_mut() {
            entry.animate(t, dt, spin);
        }
        live.controls.update(&mut live.camera);
        live.renderer.render(&live.scene, &live.camera);
        log::trace!("[scene] frame t={:.3} dt={:.4}", t, dt);
        FrameOutcome::Rendered
    }

    /// Document visibility changed. Hidden cancels the pending callback;
    /// visible resumes with a fresh throttle baseline. Repeating the current
    /// state changes nothing.
    pub fn set_visible(&mut self, visible: bool) {
        let Some(live) = self.live.as_mut() else {
            return;
        };
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        if visible {
            live.throttle.reset();
            if self.pending.is_none() {
                self.pending = Some(self.host.request_frame());
            }
            log::debug!("[scene] resumed");
        } else {
            if let Some(handle) = self.pending.take() {
                self.host.cancel_frame(handle);
            }
            log::debug!("[scene] paused while hidden");
        }
    }

    /// Show catalog entry `index` alone. Returns false, changing nothing, when
    /// the index is out of range or the scene is gone.
    pub fn switch_model(&mut self, index: usize) -> bool {
        let Some(live) = self.live.as_mut() else {
            return false;
        };
        if index >= live.scene.catalog().len() {
            log::warn!("[scene] switch_model({}) out of range", index);
            return false;
        }
        live.scene.detach_models();
        live.scene.attach(index);
        self.status.current_index = index;
        log::info!(
            "[scene] model {} ({})",
            index,
            live.scene.catalog()[index].name
        );
        true
    }

    pub fn resize(&mut self, viewport: Viewport) {
        let Some(live) = self.live.as_mut() else {
            return;
        };
        self.caps.viewport = viewport;
        live.camera.aspect = viewport.aspect();
        live.camera.update_projection_matrix();
        live.renderer
            .set_pixel_ratio(live.profile.capped_pixel_ratio(viewport.device_pixel_ratio));
        live.renderer.set_size(viewport.width, viewport.height);
    }

    /// Switch quality tier by rebuilding the scene around the same renderer.
    /// The current model stays selected.
    pub fn set_low_quality(&mut self, low_quality: bool) {
        let Some(mut live) = self.live.take() else {
            return;
        };
        if live.profile.low_quality == low_quality {
            self.live = Some(live);
            return;
        }
        let renderer = &mut live.renderer;
        let released = live.scene.dispose_all(|id| renderer.release_mesh(id));
        let mut rebuilt = Live::build(self.subject, &self.caps, low_quality, live.renderer);
        rebuilt.scene.detach_models();
        rebuilt.scene.attach(self.status.current_index);
        self.live = Some(rebuilt);
        self.status.low_quality = low_quality;
        log::info!(
            "[scene] quality low={} (released {} meshes)",
            low_quality,
            released.meshes
        );
    }

    pub fn toggle_quality(&mut self) {
        let low = !self.status.low_quality;
        self.set_low_quality(low);
    }

    pub fn reset_camera(&mut self) {
        if let Some(live) = self.live.as_mut() {
            live.controls.reset(&mut live.camera, &live.profile);
        }
    }

    /// Pointer drag in CSS pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        let height = self.caps.viewport.height as f32;
        if let Some(live) = self.live.as_mut() {
            live.controls.rotate(dx, dy, height);
        }
    }

    /// Wheel notches; positive zooms out.
    pub fn zoom(&mut self, steps: f32) {
        if let Some(live) = self.live.as_mut() {
            live.controls.dolly(ZOOM_STEP.powf(-steps));
        }
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        let height = self.caps.viewport.height as f32;
        if let Some(live) = self.live.as_mut() {
            live.controls.pan(dx, dy, &live.camera, height);
        }
    }

    /// Release everything: listeners, the pending frame, every catalog mesh
    /// whether attached or not, controls and the renderer surface. Only the
    /// first call does work.
    pub fn teardown(&mut self) -> Option<DisposeReport> {
        let mut live = self.live.take()?;
        self.host.remove_listeners();
        if let Some(handle) = self.pending.take() {
            self.host.cancel_frame(handle);
        }
        let renderer = &mut live.renderer;
        let report = live.scene.dispose_all(|id| renderer.release_mesh(id));
        live.controls.dispose();
        live.renderer.dispose();
        live.renderer.detach();
        drop(live);
        self.status.loading = false;
        log::info!(
            "[scene] teardown subject={} meshes={} textures={}",
            self.subject,
            report.meshes,
            report.textures
        );
        Some(report)
    }
}

impl<R: Renderer, H: Host> Drop for SceneManager<R, H> {
    fn drop(&mut self) {
        self.teardown();
    }
}
