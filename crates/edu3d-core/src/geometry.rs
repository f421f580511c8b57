//! Procedural geometry descriptors and their CPU tessellation.
//!
//! Shapes are kept as descriptors so the renderer can build GPU buffers lazily
//! and drop them again when the owning mesh is released. Segment counts come
//! from the active [`QualityProfile`](crate::QualityProfile).

use std::f32::consts::{PI, TAU};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    Lines,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    /// A `radius_top` of zero produces a cone.
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
    /// Flat quad on the XZ plane facing +Y.
    Plane { width: f32, depth: f32 },
    /// Line grid on the XZ plane.
    Grid { size: f32, divisions: u32 },
}

/// Vertex data ready for upload.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn push(&mut self, p: [f32; 3], n: [f32; 3]) -> u32 {
        self.positions.push(p);
        self.normals.push(n);
        (self.positions.len() - 1) as u32
    }
}

/// Shape plus the lifetime flag flipped on disposal.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    pub shape: Shape,
    disposed: bool,
}

impl Geometry {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
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

    #[inline]
    pub fn topology(&self) -> Topology {
        self.shape.topology()
    }

    pub fn tessellate(&self) -> MeshData {
        self.shape.tessellate()
    }
}

impl Shape {
    #[inline]
    pub fn topology(&self) -> Topology {
        match self {
            Shape::Grid { .. } => Topology::Lines,
            _ => Topology::Triangles,
        }
    }

    pub fn tessellate(&self) -> MeshData {
        match *self {
            Shape::Sphere {
                radius,
                width_segments,
                height_segments,
            } => sphere(radius, width_segments.max(3), height_segments.max(2)),
            Shape::Box {
                width,
                height,
                depth,
            } => cuboid(width, height, depth),
            Shape::Cylinder {
                radius_top,
                radius_bottom,
                height,
                radial_segments,
            } => cylinder(radius_top, radius_bottom, height, radial_segments.max(3)),
            Shape::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            } => torus(radius, tube, radial_segments.max(3), tubular_segments.max(3)),
            Shape::Plane { width, depth } => plane(width, depth),
            Shape::Grid { size, divisions } => grid(size, divisions.max(1)),
        }
    }
}

fn sphere(radius: f32, ws: u32, hs: u32) -> MeshData {
    let mut m = MeshData::default();
    for y in 0..=hs {
        let v = y as f32 / hs as f32;
        let phi = v * PI;
        for x in 0..=ws {
            let u = x as f32 / ws as f32;
            let theta = u * TAU;
            let n = [-theta.cos() * phi.sin(), phi.cos(), theta.sin() * phi.sin()];
            m.push([n[0] * radius, n[1] * radius, n[2] * radius], n);
        }
    }
    let row = ws + 1;
    for y in 0..hs {
        for x in 0..ws {
            let a = y * row + x + 1;
            let b = y * row + x;
            let c = (y + 1) * row + x;
            let d = (y + 1) * row + x + 1;
            if y != 0 {
                m.indices.extend_from_slice(&[a, b, d]);
            }
            if y != hs - 1 {
                m.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    m
}

fn cuboid(w: f32, h: f32, d: f32) -> MeshData {
    let (hx, hy, hz) = (w * 0.5, h * 0.5, d * 0.5);
    // (normal, u axis, v axis) per face; corners are n + ±u ± v scaled by half extents
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];
    let mut m = MeshData::default();
    for (n, u, v) in faces {
        let base = m.positions.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = [
                (n[0] + u[0] * su + v[0] * sv) * hx,
                (n[1] + u[1] * su + v[1] * sv) * hy,
                (n[2] + u[2] * su + v[2] * sv) * hz,
            ];
            m.push(p, n);
        }
        m.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    m
}

fn cylinder(rt: f32, rb: f32, h: f32, radial: u32) -> MeshData {
    let mut m = MeshData::default();
    let half = h * 0.5;
    let slope = (rb - rt) / h;
    for (y, r) in [(half, rt), (-half, rb)] {
        for i in 0..=radial {
            let theta = i as f32 / radial as f32 * TAU;
            let (s, c) = theta.sin_cos();
            let n = glam::Vec3::new(s, slope, c).normalize();
            m.push([r * s, y, r * c], n.to_array());
        }
    }
    let row = radial + 1;
    for i in 0..radial {
        let (a, b, c, d) = (i, row + i, row + i + 1, i + 1);
        m.indices.extend_from_slice(&[a, b, d, b, c, d]);
    }
    for (y, r, ny) in [(half, rt, 1.0f32), (-half, rb, -1.0)] {
        if r <= 0.0 {
            continue;
        }
        let center = m.push([0.0, y, 0.0], [0.0, ny, 0.0]);
        let start = m.positions.len() as u32;
        for i in 0..=radial {
            let theta = i as f32 / radial as f32 * TAU;
            m.push([r * theta.sin(), y, r * theta.cos()], [0.0, ny, 0.0]);
        }
        for i in 0..radial {
            if ny > 0.0 {
                m.indices
                    .extend_from_slice(&[start + i, start + i + 1, center]);
            } else {
                m.indices
                    .extend_from_slice(&[start + i + 1, start + i, center]);
            }
        }
    }
    m
}

fn torus(radius: f32, tube: f32, radial: u32, tubular: u32) -> MeshData {
    let mut m = MeshData::default();
    for j in 0..=radial {
        let v = j as f32 / radial as f32 * TAU;
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * TAU;
            let p = [
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            ];
            let center = [radius * u.cos(), radius * u.sin(), 0.0];
            let n = glam::Vec3::from(p) - glam::Vec3::from(center);
            m.push(p, n.normalize_or_zero().to_array());
        }
    }
    let row = tubular + 1;
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            m.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    m
}

fn plane(w: f32, d: f32) -> MeshData {
    let (hx, hz) = (w * 0.5, d * 0.5);
    let mut m = MeshData::default();
    for p in [[-hx, 0.0, hz], [hx, 0.0, hz], [hx, 0.0, -hz], [-hx, 0.0, -hz]] {
        m.push(p, [0.0, 1.0, 0.0]);
    }
    m.indices.extend_from_slice(&[0, 1, 2, 0, 2, 3]);
    m
}

fn grid(size: f32, divisions: u32) -> MeshData {
    let half = size * 0.5;
    let step = size / divisions as f32;
    let mut m = MeshData::default();
    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        for (a, b) in [([-half, 0.0, k], [half, 0.0, k]), ([k, 0.0, -half], [k, 0.0, half])] {
            let ia = m.push(a, [0.0, 1.0, 0.0]);
            let ib = m.push(b, [0.0, 1.0, 0.0]);
            m.indices.extend_from_slice(&[ia, ib]);
        }
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_vertex_count_follows_segments() {
        let lo = Shape::Sphere {
            radius: 1.0,
            width_segments: 16,
            height_segments: 16,
        }
        .tessellate();
        let hi = Shape::Sphere {
            radius: 1.0,
            width_segments: 32,
            height_segments: 32,
        }
        .tessellate();
        assert_eq!(lo.vertex_count(), 17 * 17);
        assert_eq!(hi.vertex_count(), 33 * 33);
        // poles emit one triangle per quad instead of two
        assert_eq!(lo.indices.len(), (16 * 16 * 2 - 2 * 16) * 3);
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let m = Shape::Sphere {
            radius: 2.5,
            width_segments: 8,
            height_segments: 6,
        }
        .tessellate();
        for p in &m.positions {
            let len = glam::Vec3::from(*p).length();
            assert!((len - 2.5).abs() < 1e-4);
        }
    }

    #[test]
    fn indices_stay_in_bounds() {
        let shapes = [
            Shape::Box {
                width: 1.0,
                height: 2.0,
                depth: 3.0,
            },
            Shape::Cylinder {
                radius_top: 0.0,
                radius_bottom: 1.0,
                height: 2.0,
                radial_segments: 12,
            },
            Shape::Torus {
                radius: 1.0,
                tube: 0.3,
                radial_segments: 12,
                tubular_segments: 48,
            },
            Shape::Plane {
                width: 4.0,
                depth: 4.0,
            },
            Shape::Grid {
                size: 4.0,
                divisions: 4,
            },
        ];
        for s in shapes {
            let m = s.tessellate();
            assert_eq!(m.positions.len(), m.normals.len());
            assert!(m.indices.iter().all(|&i| (i as usize) < m.vertex_count()));
        }
    }

    #[test]
    fn cone_has_no_top_cap() {
        let cone = Shape::Cylinder {
            radius_top: 0.0,
            radius_bottom: 1.0,
            height: 2.0,
            radial_segments: 8,
        }
        .tessellate();
        let cyl = Shape::Cylinder {
            radius_top: 1.0,
            radius_bottom: 1.0,
            height: 2.0,
            radial_segments: 8,
        }
        .tessellate();
        assert_eq!(cyl.vertex_count() - cone.vertex_count(), 1 + 9);
    }

    #[test]
    fn grid_is_line_list() {
        let g = Shape::Grid {
            size: 10.0,
            divisions: 10,
        };
        assert_eq!(g.topology(), Topology::Lines);
        assert_eq!(g.tessellate().indices.len(), 11 * 2 * 2);
    }

    #[test]
    fn dispose_flips_state_once() {
        let mut g = Geometry::new(Shape::Plane {
            width: 1.0,
            depth: 1.0,
        });
        assert!(!g.is_disposed());
        g.dispose();
        g.dispose();
        assert!(g.is_disposed());
    }
}
