// Host-side lifecycle tests driving SceneManager with a recording renderer and a
// fake frame scheduler.

use edu3d_core::*;
use glam::Mat4;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

#[derive(Default)]
struct RenderLog {
    settings: Vec<RenderSettings>,
    frames: Vec<Vec<MeshId>>,
    released: BTreeSet<MeshId>,
    size: Option<(f64, f64)>,
    pixel_ratio: Option<f64>,
    disposed: bool,
    surface_attached: bool,
}

struct RecordingRenderer(Rc<RefCell<RenderLog>>);

impl Renderer for RecordingRenderer {
    fn configure(&mut self, settings: &RenderSettings) {
        let mut log = self.0.borrow_mut();
        log.settings.push(*settings);
        log.surface_attached = true;
    }
    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.0.borrow_mut().pixel_ratio = Some(ratio);
    }
    fn set_size(&mut self, width: f64, height: f64) {
        self.0.borrow_mut().size = Some((width, height));
    }
    fn render(&mut self, scene: &Scene, _camera: &Camera) {
        let mut drawn = Vec::new();
        scene.visit_visible_meshes(&mut |mesh, _| {
            assert!(!mesh.is_disposed(), "rendered a disposed mesh");
            drawn.push(mesh.id);
        });
        self.0.borrow_mut().frames.push(drawn);
    }
    fn release_mesh(&mut self, id: MeshId) {
        self.0.borrow_mut().released.insert(id);
    }
    fn dispose(&mut self) {
        self.0.borrow_mut().disposed = true;
    }
    fn detach(&mut self) {
        self.0.borrow_mut().surface_attached = false;
    }
}

#[derive(Default)]
struct HostLog {
    next: FrameHandle,
    outstanding: BTreeSet<FrameHandle>,
    requested: usize,
    cancelled: usize,
    listeners_removed: usize,
}

struct FakeHost(Rc<RefCell<HostLog>>);

impl Host for FakeHost {
    fn request_frame(&mut self) -> FrameHandle {
        let mut log = self.0.borrow_mut();
        log.next += 1;
        let h = log.next;
        log.outstanding.insert(h);
        log.requested += 1;
        h
    }
    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut log = self.0.borrow_mut();
        if log.outstanding.remove(&handle) {
            log.cancelled += 1;
        }
    }
    fn remove_listeners(&mut self) {
        self.0.borrow_mut().listeners_removed += 1;
    }
}

type Manager = SceneManager<RecordingRenderer, FakeHost>;

struct Harness {
    mgr: Manager,
    render: Rc<RefCell<RenderLog>>,
    host: Rc<RefCell<HostLog>>,
}

impl Harness {
    fn mount(subject: Subject, caps: DeviceCapabilities) -> Self {
        let render = Rc::new(RefCell::new(RenderLog::default()));
        let host = Rc::new(RefCell::new(HostLog::default()));
        let mgr = SceneManager::mount(
            subject,
            &caps,
            RecordingRenderer(render.clone()),
            FakeHost(host.clone()),
        );
        Self { mgr, render, host }
    }

    /// Fire the pending frame callback the way requestAnimationFrame would.
    fn fire(&mut self, now_ms: f64) -> Option<FrameOutcome> {
        let handle = self.mgr.pending_frame()?;
        assert!(self.host.borrow_mut().outstanding.remove(&handle));
        Some(self.mgr.on_frame(now_ms))
    }

    fn attached_mesh_ids(&self, index: usize) -> Vec<MeshId> {
        let mut ids = Vec::new();
        self.mgr.entries()[index]
            .root
            .visit_meshes(Mat4::IDENTITY, &mut |m, _| ids.push(m.id));
        ids
    }
}

fn desktop() -> DeviceCapabilities {
    DeviceCapabilities {
        viewport: Viewport::new(1280.0, 800.0, 2.0).unwrap(),
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0) Safari/605.1.15".into(),
        save_data: false,
        effective_type: Some("4g".into()),
        touch: false,
    }
}

fn phone() -> DeviceCapabilities {
    DeviceCapabilities {
        viewport: Viewport::new(390.0, 844.0, 3.0).unwrap(),
        user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148".into(),
        save_data: false,
        effective_type: Some("4g".into()),
        touch: true,
    }
}

#[test]
fn exactly_first_model_attached_after_mount() {
    for caps in [desktop(), phone()] {
        for subject in Subject::ALL {
            let h = Harness::mount(subject, caps.clone());
            assert_eq!(h.mgr.attached(), &[0]);
            assert_eq!(h.mgr.status().current_index, 0);
            assert!(h.mgr.status().loading);
        }
    }
}

#[test]
fn mount_configures_renderer_for_quality() {
    let hi = Harness::mount(Subject::Geometry, desktop());
    let lo = Harness::mount(Subject::Geometry, phone());
    let hs = hi.render.borrow().settings[0];
    let ls = lo.render.borrow().settings[0];
    assert!(hs.antialias && hs.shadows);
    assert!(!ls.antialias && !ls.shadows);
    assert_eq!(hs.pixel_ratio, 2.0);
    assert_eq!(ls.pixel_ratio, 1.5);
    assert!(!hi.mgr.status().low_quality);
    assert!(lo.mgr.status().low_quality);
    assert_eq!(hi.host.borrow().outstanding.len(), 1);
}

#[test]
fn switch_model_attaches_exactly_one() {
    let mut h = Harness::mount(Subject::Chemistry, desktop());
    for i in [3, 1, 2, 0, 2] {
        assert!(h.mgr.switch_model(i));
        assert_eq!(h.mgr.attached(), &[i]);
        assert_eq!(h.mgr.status().current_index, i);
    }
}

#[test]
fn out_of_range_switch_is_noop() {
    let mut h = Harness::mount(Subject::Physics, desktop());
    h.mgr.switch_model(2);
    assert!(!h.mgr.switch_model(4));
    assert!(!h.mgr.switch_model(usize::MAX));
    assert_eq!(h.mgr.attached(), &[2]);
    assert_eq!(h.mgr.status().current_index, 2);
}

#[test]
fn operations_after_teardown_do_nothing() {
    let mut h = Harness::mount(Subject::Biology, desktop());
    assert!(h.mgr.teardown().is_some());
    let settings_before = h.render.borrow().settings.len();

    assert!(!h.mgr.switch_model(1));
    h.mgr.resize(Viewport::new(640.0, 480.0, 1.0).unwrap());
    h.mgr.set_visible(false);
    h.mgr.set_visible(true);
    h.mgr.toggle_quality();
    h.mgr.reset_camera();
    h.mgr.rotate(10.0, 10.0);
    h.mgr.complete_loading();
    assert_eq!(h.mgr.on_frame(1000.0), FrameOutcome::Idle);

    let render = h.render.borrow();
    assert_eq!(render.size, None);
    assert_eq!(render.settings.len(), settings_before);
    assert!(render.frames.is_empty());
    assert!(h.host.borrow().outstanding.is_empty());
    assert!(h.mgr.attached().is_empty());
    assert!(h.mgr.camera().is_none());
}

#[test]
fn teardown_runs_once() {
    let mut h = Harness::mount(Subject::Geometry, desktop());
    assert!(h.mgr.teardown().is_some());
    assert!(h.mgr.teardown().is_none());
    assert_eq!(h.host.borrow().listeners_removed, 1);
    drop(h.mgr);
    assert_eq!(h.host.borrow().listeners_removed, 1);
}

#[test]
fn teardown_releases_every_catalog_mesh_and_detaches_surface() {
    let mut h = Harness::mount(Subject::Biology, desktop());
    h.fire(0.0);
    let mut all = BTreeSet::new();
    let scene = h.mgr.scene().unwrap();
    for entry in scene.catalog() {
        entry.root.visit_meshes(Mat4::IDENTITY, &mut |m, _| {
            all.insert(m.id);
        });
    }
    for fixture in &scene.fixtures {
        fixture.visit_meshes(Mat4::IDENTITY, &mut |m, _| {
            all.insert(m.id);
        });
    }

    let report = h.mgr.teardown().unwrap();
    assert_eq!(report.meshes, all.len());
    let render = h.render.borrow();
    assert_eq!(render.released, all);
    assert!(render.disposed);
    assert!(!render.surface_attached);
    let host = h.host.borrow();
    assert!(host.outstanding.is_empty(), "frame callback left behind");
    assert_eq!(host.listeners_removed, 1);
}

#[test]
fn disposal_covers_detached_models() {
    let profile = QualityProfile::HIGH;
    let mut scene = Scene::new(&profile, build_catalog(Subject::Physics, &profile));
    scene.attach(0);
    scene.dispose_all(|_| {});
    for entry in scene.catalog() {
        entry.root.visit_meshes(Mat4::IDENTITY, &mut |m, _| {
            assert!(m.geometry.is_disposed(), "{} geometry live", entry.key);
            assert!(m.material.is_disposed(), "{} material live", entry.key);
        });
    }
    assert!(scene.attached().is_empty());
}

#[test]
fn throttle_spaces_renders_under_fast_clock() {
    for caps in [desktop(), phone()] {
        let mut h = Harness::mount(Subject::Physics, caps);
        let interval = h.mgr.profile().unwrap().frame_interval_ms();
        let mut rendered = Vec::new();
        let mut now = 0.0;
        while now < 2000.0 {
            if h.fire(now) == Some(FrameOutcome::Rendered) {
                rendered.push(now);
            }
            now += 1.0;
        }
        assert!(rendered.len() > 10);
        for pair in rendered.windows(2) {
            assert!(pair[1] - pair[0] >= interval, "{:?}", pair);
        }
        assert_eq!(h.render.borrow().frames.len(), rendered.len());
    }
}

#[test]
fn every_frame_reschedules_exactly_once() {
    let mut h = Harness::mount(Subject::Geometry, desktop());
    for i in 0..50 {
        h.fire(i as f64 * 4.0);
        assert_eq!(h.host.borrow().outstanding.len(), 1);
    }
}

#[test]
fn renders_only_fixtures_and_the_attached_model() {
    let mut h = Harness::mount(Subject::Chemistry, desktop());
    h.mgr.switch_model(2);
    h.fire(0.0);
    let expected = h.attached_mesh_ids(2);
    let other = h.attached_mesh_ids(0);
    let render = h.render.borrow();
    let drawn = render.frames.last().unwrap();
    assert!(expected.iter().all(|id| drawn.contains(id)));
    assert!(other.iter().all(|id| !drawn.contains(id)));
    // ground plane and grid
    assert_eq!(drawn.len(), expected.len() + 2);
}

#[test]
fn biology_end_to_end() {
    let mut h = Harness::mount(Subject::Biology, desktop());
    assert_eq!(h.mgr.entries()[0].name, "Cell");
    assert_eq!(h.mgr.attached(), &[0]);
    h.fire(0.0);

    assert!(h.mgr.switch_model(1));
    assert_eq!(h.mgr.entries()[1].name, "DNA");
    assert_eq!(h.mgr.attached(), &[1]);
    h.fire(20.0);
    {
        let render = h.render.borrow();
        let drawn = render.frames.last().unwrap();
        let cell = h.attached_mesh_ids(0);
        assert!(cell.iter().all(|id| !drawn.contains(id)));
    }

    h.mgr.resize(Viewport::new(600.0, 900.0, 3.0).unwrap());
    let aspect = h.mgr.camera().unwrap().aspect;
    assert!((aspect - 600.0 / 900.0).abs() < 1e-6);
    assert_eq!(h.mgr.attached(), &[1]);
    assert_eq!(h.render.borrow().size, Some((600.0, 900.0)));
    assert_eq!(h.render.borrow().pixel_ratio, Some(2.0));

    h.mgr.set_visible(false);
    assert!(h.host.borrow().outstanding.is_empty());
    assert_eq!(h.mgr.pending_frame(), None);
    h.mgr.set_visible(true);
    let requested = h.host.borrow().requested;
    // already visible: no extra request
    h.mgr.set_visible(true);
    assert_eq!(h.host.borrow().requested, requested);
    assert_eq!(h.host.borrow().outstanding.len(), 1);

    let frames_before = h.render.borrow().frames.len();
    // throttle baseline was reset, so the first frame after showing renders
    assert_eq!(h.fire(25.0), Some(FrameOutcome::Rendered));
    assert_eq!(h.render.borrow().frames.len(), frames_before + 1);
    assert_eq!(h.host.borrow().outstanding.len(), 1);
}

#[test]
fn repeated_visible_keeps_throttle_baseline() {
    let mut h = Harness::mount(Subject::Geometry, desktop());
    assert_eq!(h.fire(0.0), Some(FrameOutcome::Rendered));
    h.mgr.set_visible(true);
    assert_eq!(h.fire(2.0), Some(FrameOutcome::Skipped));
    assert_eq!(h.host.borrow().outstanding.len(), 1);
    let interval = QualityProfile::HIGH.frame_interval_ms();
    assert_eq!(h.fire(interval + 1.0), Some(FrameOutcome::Rendered));
}

#[test]
fn hidden_frame_does_not_reschedule() {
    let mut h = Harness::mount(Subject::Geometry, desktop());
    let handle = h.mgr.pending_frame().unwrap();
    h.mgr.set_visible(false);
    // a callback that raced the cancellation
    assert_eq!(h.mgr.on_frame(5.0), FrameOutcome::Idle);
    assert!(h.host.borrow().outstanding.is_empty());
    assert!(!h.host.borrow().outstanding.contains(&handle));
}

#[test]
fn loading_completes_once_signalled() {
    let mut h = Harness::mount(Subject::Geometry, desktop());
    assert!(h.mgr.status().loading);
    h.mgr.complete_loading();
    assert!(!h.mgr.status().loading);
}

#[test]
fn quality_toggle_rebuilds_and_keeps_model() {
    let mut h = Harness::mount(Subject::Physics, desktop());
    h.mgr.switch_model(3);
    let old_ids = h.attached_mesh_ids(3);
    h.mgr.toggle_quality();

    assert!(h.mgr.status().low_quality);
    assert_eq!(h.mgr.profile().unwrap(), &QualityProfile::LOW);
    assert_eq!(h.mgr.attached(), &[3]);
    assert_eq!(h.mgr.status().current_index, 3);
    let render = h.render.borrow();
    assert_eq!(render.settings.len(), 2);
    assert!(!render.settings[1].shadows);
    assert!(old_ids.iter().all(|id| render.released.contains(id)));
    assert!(render.surface_attached);
    drop(render);
    let new_ids = h.attached_mesh_ids(3);
    assert!(new_ids.iter().all(|id| !old_ids.contains(id)));
}

#[test]
fn reset_camera_restores_home_framing() {
    let mut h = Harness::mount(Subject::Geometry, desktop());
    let home = h.mgr.camera().unwrap().eye;
    h.mgr.rotate(300.0, 40.0);
    h.mgr.zoom(3.0);
    for i in 0..20 {
        h.fire(i as f64 * 20.0);
    }
    assert!((h.mgr.camera().unwrap().eye - home).length() > 0.1);
    h.mgr.reset_camera();
    assert_eq!(h.mgr.camera().unwrap().eye, home);
}

#[test]
fn animation_is_time_based_across_frame_rates() {
    // two scenes advanced to the same wall-clock time with different frame
    // spacing end up with the same bob offset
    let mut fast = Harness::mount(Subject::Geometry, desktop());
    let mut slow = Harness::mount(Subject::Geometry, desktop());
    let mut t = 0.0;
    while t <= 1000.0 {
        fast.fire(t);
        t += 17.0;
    }
    let mut t = 0.0;
    while t <= 1000.0 {
        slow.fire(t);
        t += 34.0;
    }
    fast.fire(1020.0);
    slow.fire(1020.0);
    let y = |h: &Harness| h.mgr.entries()[0].root.transform.translation.y;
    assert!((y(&fast) - y(&slow)).abs() < 1e-5);
}
