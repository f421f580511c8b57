use crate::constants::{
    POLISH_METALNESS_BIAS, POLISH_METALNESS_MAX, POLISH_ROUGHNESS_MIN, POLISH_ROUGHNESS_SCALE,
};

/// Image-backed map attached to a material. Only the lifetime is tracked here;
/// pixel data belongs to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub label: String,
    disposed: bool,
}

impl Texture {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            disposed: false,
        }
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn dispose(&mut self) {
        self.disposed = true;
    }
}

/// Physically-based surface description (metal/rough workflow).
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub color: [f32; 3],
    pub emissive: [f32; 3],
    pub roughness: f32,
    pub metalness: f32,
    pub opacity: f32,
    pub transparent: bool,
    pub map: Option<Texture>,
    disposed: bool,
}

impl Material {
    pub fn standard(color: [f32; 3]) -> Self {
        Self {
            color,
            emissive: [0.0; 3],
            roughness: 0.5,
            metalness: 0.1,
            opacity: 1.0,
            transparent: false,
            map: None,
            disposed: false,
        }
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    pub fn with_metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness.clamp(0.0, 1.0);
        self
    }

    pub fn with_emissive(mut self, emissive: [f32; 3]) -> Self {
        self.emissive = emissive;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self.transparent = self.opacity < 1.0;
        self
    }

    pub fn with_map(mut self, map: Texture) -> Self {
        self.map = Some(map);
        self
    }

    /// Nudge the surface toward the gallery's shared polished look.
    pub fn polish(&mut self) {
        self.roughness = (self.roughness * POLISH_ROUGHNESS_SCALE).max(POLISH_ROUGHNESS_MIN);
        self.metalness = (self.metalness + POLISH_METALNESS_BIAS).min(POLISH_METALNESS_MAX);
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Releases the material and any attached map.
    pub fn dispose(&mut self) {
        if let Some(map) = self.map.as_mut() {
            map.dispose();
        }
        self.disposed = true;
    }
}
