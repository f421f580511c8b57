use crate::constants::{FOG_DENSITY_HIGH, FOG_DENSITY_LOW};

/// Rendering-cost parameters chosen once per scene from the low-quality flag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QualityProfile {
    pub low_quality: bool,
    /// Width/height segments for spheres.
    pub sphere_segments: u32,
    /// Radial segments for cylinders, cones and torus tubes.
    pub radial_segments: u32,
    /// Segments along a torus ring or a long curve.
    pub tubular_segments: u32,
    pub shadows: bool,
    pub shadow_map_size: u32,
    pub antialias: bool,
    pub max_pixel_ratio: f64,
    pub target_fps: f32,
    pub damping_factor: f32,
    pub max_distance: f32,
    pub fog_density: f32,
    pub camera_distance: f32,
    pub camera_height: f32,
    /// Baseline spin applied to the attached model, radians per second.
    pub spin_rate: f32,
    pub ground_opacity: f32,
    pub grid_opacity: f32,
}

impl QualityProfile {
    pub const LOW: Self = Self {
        low_quality: true,
        sphere_segments: 16,
        radial_segments: 12,
        tubular_segments: 48,
        shadows: false,
        shadow_map_size: 0,
        antialias: false,
        max_pixel_ratio: 1.5,
        target_fps: 30.0,
        damping_factor: 0.1,
        max_distance: 15.0,
        fog_density: FOG_DENSITY_LOW,
        camera_distance: 8.0,
        camera_height: 3.0,
        spin_rate: 0.18,
        ground_opacity: 0.6,
        grid_opacity: 0.15,
    };

    pub const HIGH: Self = Self {
        low_quality: false,
        sphere_segments: 32,
        radial_segments: 24,
        tubular_segments: 100,
        shadows: true,
        shadow_map_size: 2048,
        antialias: true,
        max_pixel_ratio: 2.0,
        target_fps: 60.0,
        damping_factor: 0.05,
        max_distance: 20.0,
        fog_density: FOG_DENSITY_HIGH,
        camera_distance: 10.0,
        camera_height: 4.0,
        spin_rate: 0.3,
        ground_opacity: 0.8,
        grid_opacity: 0.25,
    };

    #[inline]
    pub fn select(low_quality: bool) -> Self {
        if low_quality {
            Self::LOW
        } else {
            Self::HIGH
        }
    }

    /// Minimum spacing between rendered frames in milliseconds.
    #[inline]
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.target_fps as f64
    }

    #[inline]
    pub fn capped_pixel_ratio(&self, device_pixel_ratio: f64) -> f64 {
        device_pixel_ratio.min(self.max_pixel_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_profile_is_cheaper_everywhere() {
        let (lo, hi) = (QualityProfile::LOW, QualityProfile::HIGH);
        assert!(lo.sphere_segments < hi.sphere_segments);
        assert!(lo.radial_segments < hi.radial_segments);
        assert!(lo.tubular_segments < hi.tubular_segments);
        assert!(!lo.shadows && hi.shadows);
        assert!(!lo.antialias && hi.antialias);
        assert!(lo.max_pixel_ratio < hi.max_pixel_ratio);
        assert!(lo.target_fps < hi.target_fps);
        assert!(lo.damping_factor > hi.damping_factor);
        assert!(lo.max_distance < hi.max_distance);
        assert!(lo.fog_density > hi.fog_density);
    }

    #[test]
    fn pixel_ratio_is_capped() {
        assert_eq!(QualityProfile::LOW.capped_pixel_ratio(3.0), 1.5);
        assert_eq!(QualityProfile::HIGH.capped_pixel_ratio(1.25), 1.25);
    }
}
