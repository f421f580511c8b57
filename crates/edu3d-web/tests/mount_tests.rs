// Host-side tests for mount bookkeeping: GPU init racing unmount, and init failure.
// The main crate is wasm-only, so we include the pure-Rust module directly.

#![allow(dead_code)]
mod mount {
    include!("../src/mount.rs");
}

use mount::*;

#[test]
fn loading_until_init_then_scene_flag() {
    let mut m = MountTracker::default();
    assert_eq!(m.phase(), &MountPhase::Initializing);
    assert!(m.is_loading(None));
    assert!(m.init_succeeded());
    assert!(m.is_loading(Some(true)));
    assert!(!m.is_loading(Some(false)));
    assert_eq!(m.error(), None);
}

#[test]
fn failed_init_stops_loading_and_reports_reason() {
    let mut m = MountTracker::default();
    m.init_failed("No WebGPU adapter");
    assert!(!m.is_loading(None));
    assert_eq!(m.error(), Some("No WebGPU adapter"));
    // a late success cannot revive a failed mount
    assert!(!m.init_succeeded());
}

#[test]
fn unmount_during_init_releases_the_renderer() {
    let mut m = MountTracker::default();
    assert!(m.unmount());
    assert!(!m.is_loading(None));
    // init completing afterwards must not go live
    assert!(!m.init_succeeded());
    assert_eq!(m.phase(), &MountPhase::Unmounted);
}

#[test]
fn failure_after_unmount_is_ignored() {
    let mut m = MountTracker::default();
    m.unmount();
    m.init_failed("device lost");
    assert_eq!(m.error(), None);
    assert_eq!(m.phase(), &MountPhase::Unmounted);
}

#[test]
fn unmount_is_idempotent() {
    let mut m = MountTracker::default();
    assert!(m.init_succeeded());
    assert!(m.unmount());
    assert!(!m.unmount());
    assert!(!m.unmount());
    assert!(!m.is_loading(Some(true)));
}
