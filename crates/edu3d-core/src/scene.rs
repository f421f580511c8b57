//! Scene graph: transforms, meshes, lights and the gallery scene container.

use crate::catalog::CatalogEntry;
use crate::constants::*;
use crate::geometry::{Geometry, Shape};
use crate::material::Material;
use crate::quality::QualityProfile;
use glam::{EulerRot, Mat4, Quat, Vec3};
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_MESH_ID: AtomicU32 = AtomicU32::new(1);

/// Stable identity used by renderers to cache GPU buffers per mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u32);

impl MeshId {
    fn next() -> Self {
        MeshId(NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    /// Euler angles in radians, XYZ order.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        let q = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, q, self.translation)
    }
}

/// Circular path for a satellite node around its parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orbit {
    pub phase: f32,
    pub radius: f32,
    /// Radians per second.
    pub speed: f32,
    pub height: f32,
    /// Tilt of the orbital plane around X, radians.
    pub tilt: f32,
}

impl Orbit {
    pub fn position_at(&self, t: f32) -> Vec3 {
        let angle = self.phase + t * self.speed;
        let flat = Vec3::new(angle.cos() * self.radius, 0.0, angle.sin() * self.radius);
        Quat::from_rotation_x(self.tilt) * flat + Vec3::Y * self.height
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub id: MeshId,
    pub geometry: Geometry,
    pub material: Material,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    pub fn new(shape: Shape, material: Material) -> Self {
        Self {
            id: MeshId::next(),
            geometry: Geometry::new(shape),
            material,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.geometry.is_disposed() && self.material.is_disposed()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub name: String,
    /// Pose the node was built with; motions offset from it.
    pub rest: Transform,
    pub transform: Transform,
    pub mesh: Option<Mesh>,
    pub orbit: Option<Orbit>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rest: Transform::default(),
            transform: Transform::default(),
            mesh: None,
            orbit: None,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: impl Into<String>, shape: Shape, material: Material) -> Self {
        let mut node = Self::group(name);
        node.mesh = Some(Mesh::new(shape, material));
        node
    }

    pub fn at(mut self, translation: Vec3) -> Self {
        self.rest.translation = translation;
        self.transform.translation = translation;
        self
    }

    pub fn rotated(mut self, rotation: Vec3) -> Self {
        self.rest.rotation = rotation;
        self.transform.rotation = rotation;
        self
    }

    pub fn scaled(mut self, scale: Vec3) -> Self {
        self.rest.scale = scale;
        self.transform.scale = scale;
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Places the node on its orbit at t = 0.
    pub fn with_orbit(mut self, orbit: Orbit) -> Self {
        self.orbit = Some(orbit);
        self.at(orbit.position_at(0.0))
    }

    /// Visits every mesh with its world matrix, depth first.
    pub fn visit_meshes(&self, parent: Mat4, f: &mut impl FnMut(&Mesh, Mat4)) {
        let world = parent * self.transform.matrix();
        if let Some(mesh) = &self.mesh {
            f(mesh, world);
        }
        for child in &self.children {
            child.visit_meshes(world, f);
        }
    }

    pub fn for_each_mesh_mut(&mut self, f: &mut impl FnMut(&mut Mesh)) {
        if let Some(mesh) = self.mesh.as_mut() {
            f(mesh);
        }
        for child in &mut self.children {
            child.for_each_mesh_mut(f);
        }
    }

    pub fn for_each_node_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(self);
        for child in &mut self.children {
            child.for_each_node_mut(f);
        }
    }

    pub fn mesh_count(&self) -> usize {
        let mut n = 0;
        self.visit_meshes(Mat4::IDENTITY, &mut |_, _| n += 1);
        n
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowSettings {
    pub map_size: u32,
    pub half_extent: f32,
    pub near: f32,
    pub far: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Light {
    Hemisphere {
        sky: [f32; 3],
        ground: [f32; 3],
        intensity: f32,
    },
    Directional {
        position: Vec3,
        target: Vec3,
        color: [f32; 3],
        intensity: f32,
        shadow: Option<ShadowSettings>,
    },
    Point {
        position: Vec3,
        color: [f32; 3],
        intensity: f32,
        distance: f32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    pub color: [f32; 3],
    pub density: f32,
}

/// Counts of resources released by [`Scene::dispose_all`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisposeReport {
    pub meshes: usize,
    pub textures: usize,
}

pub struct Scene {
    pub background: [f32; 3],
    pub fog: Fog,
    pub lights: Vec<Light>,
    /// Ground plane and grid helper; always attached.
    pub fixtures: Vec<Node>,
    catalog: Vec<CatalogEntry>,
    attached: SmallVec<[usize; 1]>,
}

impl Scene {
    /// Builds lights and fixtures for `profile` around an already built catalog.
    /// No model is attached yet.
    pub fn new(profile: &QualityProfile, catalog: Vec<CatalogEntry>) -> Self {
        Self {
            background: BACKGROUND_RGB,
            fog: Fog {
                color: BACKGROUND_RGB,
                density: profile.fog_density,
            },
            lights: lights_for(profile),
            fixtures: fixtures_for(profile),
            catalog,
            attached: SmallVec::new(),
        }
    }

    #[inline]
    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }

    #[inline]
    pub fn attached(&self) -> &[usize] {
        &self.attached
    }

    pub fn detach_models(&mut self) {
        self.attached.clear();
    }

    /// Attaches catalog entry `index`; false when it does not exist.
    pub fn attach(&mut self, index: usize) -> bool {
        if index >= self.catalog.len() {
            return false;
        }
        if !self.attached.contains(&index) {
            self.attached.push(index);
        }
        true
    }

    /// Attached catalog entries in attachment order.
    pub fn attached_entries_mut(&mut self) -> impl Iterator<Item = &mut CatalogEntry> {
        let attached = &self.attached;
        self.catalog
            .iter_mut()
            .enumerate()
            .filter(move |(i, _)| attached.contains(i))
            .map(|(_, e)| e)
    }

    /// Visits every mesh that is part of the rendered scene: fixtures plus
    /// attached models. Detached catalog entries are skipped.
    pub fn visit_visible_meshes(&self, f: &mut impl FnMut(&Mesh, Mat4)) {
        for node in &self.fixtures {
            node.visit_meshes(Mat4::IDENTITY, f);
        }
        for &i in &self.attached {
            if let Some(entry) = self.catalog.get(i) {
                entry.root.visit_meshes(Mat4::IDENTITY, f);
            }
        }
    }

    /// Disposes geometry, material and texture of every mesh in the catalog
    /// (attached or not) and the fixtures, reporting each id to `release`.
    pub fn dispose_all(&mut self, mut release: impl FnMut(MeshId)) -> DisposeReport {
        let mut report = DisposeReport::default();
        let mut dispose = |mesh: &mut Mesh| {
            if mesh.is_disposed() {
                return;
            }
            mesh.geometry.dispose();
            if mesh.material.map.is_some() {
                report.textures += 1;
            }
            mesh.material.dispose();
            report.meshes += 1;
            release(mesh.id);
        };
        for entry in &mut self.catalog {
            entry.root.for_each_mesh_mut(&mut dispose);
        }
        for node in &mut self.fixtures {
            node.for_each_mesh_mut(&mut dispose);
        }
        self.attached.clear();
        report
    }
}

fn lights_for(profile: &QualityProfile) -> Vec<Light> {
    let shadow = profile.shadows.then_some(ShadowSettings {
        map_size: profile.shadow_map_size,
        half_extent: SHADOW_FRUSTUM_HALF_EXTENT,
        near: SHADOW_NEAR,
        far: SHADOW_FAR,
    });
    let mut lights = vec![
        Light::Hemisphere {
            sky: HEMI_SKY_RGB,
            ground: HEMI_GROUND_RGB,
            intensity: HEMI_INTENSITY,
        },
        Light::Directional {
            position: Vec3::from(KEY_LIGHT_POSITION),
            target: Vec3::ZERO,
            color: [1.0; 3],
            intensity: KEY_LIGHT_INTENSITY,
            shadow,
        },
    ];
    lights.extend(ACCENT_LIGHTS.iter().map(|(pos, color)| Light::Point {
        position: Vec3::from(*pos),
        color: *color,
        intensity: ACCENT_INTENSITY,
        distance: ACCENT_DISTANCE,
    }));
    lights
}

fn fixtures_for(profile: &QualityProfile) -> Vec<Node> {
    let mut ground = Node::mesh(
        "ground",
        Shape::Plane {
            width: GROUND_SIZE,
            depth: GROUND_SIZE,
        },
        Material::standard(GROUND_RGB)
            .with_roughness(0.9)
            .with_metalness(0.0)
            .with_opacity(profile.ground_opacity),
    );
    if let Some(mesh) = ground.mesh.as_mut() {
        mesh.receive_shadow = profile.shadows;
    }
    let grid = Node::mesh(
        "grid",
        Shape::Grid {
            size: GROUND_SIZE,
            divisions: GRID_DIVISIONS,
        },
        Material::standard(GRID_RGB).with_opacity(profile.grid_opacity),
    )
    .at(Vec3::new(0.0, 0.01, 0.0));
    vec![ground, grid]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mesh_ids_are_unique() {
        let a = Mesh::new(Shape::Plane { width: 1.0, depth: 1.0 }, Material::standard([1.0; 3]));
        let b = Mesh::new(Shape::Plane { width: 1.0, depth: 1.0 }, Material::standard([1.0; 3]));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn world_matrices_compose_parent_first() {
        let root = Node::group("root").at(Vec3::new(1.0, 0.0, 0.0)).with_child(
            Node::mesh(
                "child",
                Shape::Box {
                    width: 1.0,
                    height: 1.0,
                    depth: 1.0,
                },
                Material::standard([1.0; 3]),
            )
            .at(Vec3::new(0.0, 2.0, 0.0)),
        );
        let mut seen = Vec::new();
        root.visit_meshes(Mat4::IDENTITY, &mut |_, m| seen.push(m.w_axis.truncate()));
        assert_eq!(seen, vec![Vec3::new(1.0, 2.0, 0.0)]);
    }

    #[test]
    fn orbit_position_tracks_time() {
        let orbit = Orbit {
            phase: 0.0,
            radius: 2.0,
            speed: std::f32::consts::FRAC_PI_2,
            height: 0.5,
            tilt: 0.0,
        };
        let p0 = orbit.position_at(0.0);
        let p1 = orbit.position_at(1.0);
        assert_relative_eq!(p0.x, 2.0, epsilon = 1e-5);
        assert_relative_eq!(p1.z, 2.0, epsilon = 1e-5);
        assert_relative_eq!(p1.y, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn shadows_follow_quality() {
        let hi = lights_for(&QualityProfile::HIGH);
        let lo = lights_for(&QualityProfile::LOW);
        let shadow_of = |lights: &[Light]| {
            lights.iter().find_map(|l| match l {
                Light::Directional { shadow, .. } => Some(*shadow),
                _ => None,
            })
        };
        assert!(matches!(shadow_of(&hi), Some(Some(s)) if s.map_size == 2048));
        assert_eq!(shadow_of(&lo), Some(None));
        assert_eq!(hi.iter().filter(|l| matches!(l, Light::Point { .. })).count(), 2);
    }
}
