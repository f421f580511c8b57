use bytemuck::{Pod, Zeroable};
use edu3d_core::{Camera, Light, Material, Scene};
use glam::{Mat4, Vec3};

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct Globals {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub fog: [f32; 4],
    pub hemi_sky: [f32; 4],
    pub hemi_ground: [f32; 4],
    pub key_dir: [f32; 4],
    pub key_color: [f32; 4],
    pub point_pos: [[f32; 4]; 2],
    pub point_color: [[f32; 4]; 2],
    pub shadow: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct DrawUniforms {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub emissive: [f32; 4],
    pub params: [f32; 4],
}

impl DrawUniforms {
    pub(crate) fn new(model: Mat4, material: &Material, receive_shadow: bool) -> Self {
        let [r, g, b] = material.color;
        let [er, eg, eb] = material.emissive;
        Self {
            model: model.to_cols_array_2d(),
            color: [r, g, b, material.opacity],
            emissive: [er, eg, eb, 0.0],
            params: [
                material.roughness,
                material.metalness,
                if receive_shadow { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }
}

fn rgb_scaled(rgb: [f32; 3], k: f32) -> [f32; 4] {
    [rgb[0] * k, rgb[1] * k, rgb[2] * k, 0.0]
}

/// Pack the scene's lights, fog and the camera. Returns the globals and the
/// key light's shadow matrix when that light casts shadows.
pub(crate) fn pack_globals(
    scene: &Scene,
    camera: &Camera,
    shadows: bool,
    shadow_bias: f32,
) -> (Globals, Option<Mat4>) {
    let [fr, fg, fb] = scene.fog.color;
    let mut globals = Globals {
        view_proj: camera.view_projection().to_cols_array_2d(),
        light_view_proj: Mat4::IDENTITY.to_cols_array_2d(),
        camera_pos: camera.eye.extend(1.0).to_array(),
        fog: [fr, fg, fb, scene.fog.density],
        hemi_sky: [0.0; 4],
        hemi_ground: [0.0; 4],
        key_dir: [0.0, 1.0, 0.0, 0.0],
        key_color: [0.0; 4],
        point_pos: [[0.0, 0.0, 0.0, 1.0]; 2],
        point_color: [[0.0; 4]; 2],
        shadow: [0.0; 4],
    };
    let mut light_matrix = None;
    let mut points = 0;
    for light in &scene.lights {
        match light {
            Light::Hemisphere {
                sky,
                ground,
                intensity,
            } => {
                globals.hemi_sky = [sky[0], sky[1], sky[2], *intensity];
                globals.hemi_ground = [ground[0], ground[1], ground[2], 0.0];
            }
            Light::Directional {
                position,
                target,
                color,
                intensity,
                shadow,
            } => {
                globals.key_dir = (*position - *target).normalize_or_zero().extend(0.0).to_array();
                globals.key_color = rgb_scaled(*color, *intensity);
                if let (true, Some(s)) = (shadows, shadow) {
                    let e = s.half_extent;
                    let view = Mat4::look_at_rh(*position, *target, Vec3::Y);
                    let proj = Mat4::orthographic_rh(-e, e, -e, e, s.near, s.far);
                    let m = proj * view;
                    globals.light_view_proj = m.to_cols_array_2d();
                    globals.shadow = [1.0, shadow_bias, 1.0 / s.map_size.max(1) as f32, 0.0];
                    light_matrix = Some(m);
                }
            }
            Light::Point {
                position,
                color,
                intensity,
                distance,
            } => {
                if points < 2 {
                    globals.point_pos[points] = position.extend(distance.max(1e-3)).to_array();
                    globals.point_color[points] = rgb_scaled(*color, *intensity);
                    points += 1;
                }
            }
        }
    }
    (globals, light_matrix)
}
