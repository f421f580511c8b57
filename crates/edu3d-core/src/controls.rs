//! Orbit-style camera controls with damping.
//!
//! Input accumulates into pending deltas; [`OrbitControls::update`] applies a
//! `damping_factor` share of them each rendered frame and decays the rest, so
//! the camera glides to a stop after the pointer is released.

use crate::camera::Camera;
use crate::constants::{CONTROLS_TARGET, MAX_POLAR_ANGLE, MIN_DISTANCE, ROTATE_SPEED};
use crate::quality::QualityProfile;
use glam::Vec3;
use std::f32::consts::TAU;

const EPS: f32 = 1e-6;
const SETTLED: f32 = 1e-5;

#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub target: Vec3,
    pub damping_factor: f32,
    pub enable_zoom: bool,
    pub enable_pan: bool,
    pub min_distance: f32,
    pub max_distance: f32,
    pub max_polar_angle: f32,
    pub rotate_speed: f32,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_offset: Vec3,
    disposed: bool,
}

impl OrbitControls {
    pub fn new(profile: &QualityProfile, touch: bool) -> Self {
        Self {
            target: Vec3::from(CONTROLS_TARGET),
            damping_factor: profile.damping_factor,
            enable_zoom: true,
            enable_pan: !touch,
            min_distance: MIN_DISTANCE,
            max_distance: profile.max_distance,
            max_polar_angle: MAX_POLAR_ANGLE,
            rotate_speed: ROTATE_SPEED,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
            disposed: false,
        }
    }

    /// Queue an orbit from a pointer drag of `dx, dy` pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        if self.disposed {
            return;
        }
        let k = TAU * self.rotate_speed / viewport_height.max(1.0);
        self.delta_theta -= dx * k;
        self.delta_phi -= dy * k;
    }

    /// Queue a dolly; `scale < 1` moves the camera closer.
    pub fn dolly(&mut self, scale: f32) {
        if self.disposed || !self.enable_zoom || scale <= 0.0 {
            return;
        }
        self.scale *= scale;
    }

    /// Queue a pan of `dx, dy` pixels in the camera's screen plane.
    pub fn pan(&mut self, dx: f32, dy: f32, camera: &Camera, viewport_height: f32) {
        if self.disposed || !self.enable_pan {
            return;
        }
        let distance = (camera.eye - self.target).length() * (camera.fovy_radians * 0.5).tan();
        let per_px = 2.0 * distance / viewport_height.max(1.0);
        let forward = (self.target - camera.eye).normalize_or_zero();
        let right = forward.cross(camera.up).normalize_or_zero();
        let up = right.cross(forward);
        self.pan_offset += right * (-dx * per_px) + up * (dy * per_px);
    }

    /// Apply damped input to `camera`. Returns true while the camera is still moving.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        if self.disposed {
            return false;
        }
        let d = self.damping_factor;
        let offset = camera.eye - self.target;
        let mut radius = offset.length().max(EPS);
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        theta += self.delta_theta * d;
        phi = (phi + self.delta_phi * d).clamp(EPS, self.max_polar_angle);
        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);
        self.target += self.pan_offset * d;

        let sin_phi = phi.sin();
        camera.eye = self.target
            + Vec3::new(
                radius * sin_phi * theta.sin(),
                radius * phi.cos(),
                radius * sin_phi * theta.cos(),
            );
        camera.target = self.target;

        self.delta_theta *= 1.0 - d;
        self.delta_phi *= 1.0 - d;
        self.pan_offset *= 1.0 - d;
        self.scale = 1.0;

        self.delta_theta.abs() > SETTLED
            || self.delta_phi.abs() > SETTLED
            || self.pan_offset.length_squared() > SETTLED * SETTLED
    }

    /// Return the camera to its home framing for `profile`.
    pub fn reset(&mut self, camera: &mut Camera, profile: &QualityProfile) {
        self.target = Vec3::from(CONTROLS_TARGET);
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.scale = 1.0;
        self.pan_offset = Vec3::ZERO;
        camera.eye = Camera::home_position(profile);
        camera.target = self.target;
    }

    /// Drop pending input and stop reacting to further calls.
    pub fn dispose(&mut self) {
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.scale = 1.0;
        self.pan_offset = Vec3::ZERO;
        self.disposed = true;
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn setup(profile: &QualityProfile, touch: bool) -> (Camera, OrbitControls) {
        let mut camera = Camera::new(16.0 / 9.0);
        let mut controls = OrbitControls::new(profile, touch);
        controls.reset(&mut camera, profile);
        (camera, controls)
    }

    #[test]
    fn damping_spreads_rotation_over_frames() {
        let p = QualityProfile::HIGH;
        let (mut camera, mut controls) = setup(&p, false);
        let start = camera.eye;
        controls.rotate(100.0, 0.0, 800.0);
        controls.update(&mut camera);
        let first = camera.eye;
        controls.update(&mut camera);
        let second = camera.eye;
        assert!((first - start).length() > (second - first).length());
        assert!((second - first).length() > 0.0);
    }

    #[test]
    fn orbit_keeps_distance() {
        let p = QualityProfile::LOW;
        let (mut camera, mut controls) = setup(&p, false);
        let r0 = (camera.eye - controls.target).length();
        controls.rotate(250.0, 0.0, 600.0);
        for _ in 0..30 {
            controls.update(&mut camera);
        }
        assert_relative_eq!((camera.eye - controls.target).length(), r0, epsilon = 1e-3);
    }

    #[test]
    fn zoom_is_clamped_to_profile_distance() {
        let p = QualityProfile::LOW;
        let (mut camera, mut controls) = setup(&p, false);
        controls.dolly(100.0);
        controls.update(&mut camera);
        assert_relative_eq!(
            (camera.eye - controls.target).length(),
            p.max_distance,
            epsilon = 1e-3
        );
        controls.dolly(0.001);
        controls.update(&mut camera);
        assert_relative_eq!(
            (camera.eye - controls.target).length(),
            MIN_DISTANCE,
            epsilon = 1e-3
        );
    }

    #[test]
    fn pan_is_disabled_on_touch() {
        let p = QualityProfile::HIGH;
        let (mut camera, mut controls) = setup(&p, true);
        let target = controls.target;
        let cam = camera.clone();
        controls.pan(200.0, 50.0, &cam, 800.0);
        controls.update(&mut camera);
        assert_eq!(controls.target, target);
    }

    #[test]
    fn camera_never_drops_below_the_horizon() {
        let p = QualityProfile::HIGH;
        let (mut camera, mut controls) = setup(&p, false);
        controls.rotate(0.0, -5000.0, 800.0);
        for _ in 0..100 {
            controls.update(&mut camera);
        }
        assert!(camera.eye.y > controls.target.y);
    }

    #[test]
    fn disposed_controls_ignore_input() {
        let p = QualityProfile::HIGH;
        let (mut camera, mut controls) = setup(&p, false);
        controls.dispose();
        let eye = camera.eye;
        controls.rotate(100.0, 100.0, 800.0);
        assert!(!controls.update(&mut camera));
        assert_eq!(camera.eye, eye);
    }
}
