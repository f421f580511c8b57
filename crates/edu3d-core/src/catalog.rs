//! Subject model catalogs.
//!
//! Each subject has four entries. Entries are built once per subject selection,
//! with tessellation detail taken from the active [`QualityProfile`], and each
//! one carries its own [`Motion`] list.

use crate::constants::CATALOG_SEED;
use crate::error::SceneError;
use crate::geometry::Shape;
use crate::material::Material;
use crate::motion::Motion;
use crate::quality::QualityProfile;
use crate::scene::{Node, Orbit};
use glam::{EulerRot, Quat, Vec3};
use rand::prelude::*;
use smallvec::{smallvec, SmallVec};
use std::f32::consts::{FRAC_PI_2, TAU};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Subject {
    Geometry,
    Biology,
    Chemistry,
    Physics,
}

impl Subject {
    pub const ALL: [Subject; 4] = [
        Subject::Geometry,
        Subject::Biology,
        Subject::Chemistry,
        Subject::Physics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Geometry => "geometry",
            Subject::Biology => "biology",
            Subject::Chemistry => "chemistry",
            Subject::Physics => "physics",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Subject::ALL
            .into_iter()
            .find(|subject| subject.as_str() == key)
            .ok_or_else(|| SceneError::UnknownSubject(s.to_string()))
    }
}

pub struct CatalogEntry {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub root: Node,
    pub motions: SmallVec<[Motion; 2]>,
}

impl CatalogEntry {
    fn new(
        key: &'static str,
        name: &'static str,
        description: &'static str,
        root: Node,
        motions: SmallVec<[Motion; 2]>,
    ) -> Self {
        Self {
            key,
            name,
            description,
            root,
            motions,
        }
    }

    /// Advances the entry to wall-clock time `t`. `dt` is the time since the
    /// previous rendered frame and only feeds rate-based spins.
    pub fn animate(&mut self, t: f32, dt: f32, spin_rate: f32) {
        self.root.transform.rotation.y += spin_rate * dt;
        for motion in &self.motions {
            motion.apply(&mut self.root, t, dt);
        }
    }

    /// Applies shadow flags for the quality tier and the shared material polish.
    fn prepare(&mut self, profile: &QualityProfile) {
        self.root.for_each_mesh_mut(&mut |mesh| {
            mesh.cast_shadow = profile.shadows;
            mesh.receive_shadow = profile.shadows;
            mesh.material.polish();
        });
    }
}

impl fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("meshes", &self.root.mesh_count())
            .field("motions", &self.motions)
            .finish()
    }
}

pub fn build_catalog(subject: Subject, profile: &QualityProfile) -> Vec<CatalogEntry> {
    let b = Builder::new(profile);
    let mut entries = match subject {
        Subject::Geometry => vec![b.cube(), b.sphere(), b.cone(), b.torus()],
        Subject::Biology => vec![b.cell(), b.dna(), b.virus(), b.neuron()],
        Subject::Chemistry => vec![b.atom(), b.water(), b.methane(), b.crystal()],
        Subject::Physics => vec![b.solar_system(), b.pendulum(), b.spring(), b.wave()],
    };
    for entry in &mut entries {
        entry.prepare(profile);
    }
    log::debug!(
        "[catalog] subject={} entries={} meshes={}",
        subject,
        entries.len(),
        entries.iter().map(|e| e.root.mesh_count()).sum::<usize>()
    );
    entries
}

const MODEL_HEIGHT: f32 = 1.5;

struct Builder<'a> {
    q: &'a QualityProfile,
}

impl<'a> Builder<'a> {
    fn new(q: &'a QualityProfile) -> Self {
        Self { q }
    }

    #[inline]
    fn detail(&self, low: usize, high: usize) -> usize {
        if self.q.low_quality {
            low
        } else {
            high
        }
    }

    fn sphere_shape(&self, radius: f32) -> Shape {
        Shape::Sphere {
            radius,
            width_segments: self.q.sphere_segments,
            height_segments: self.q.sphere_segments,
        }
    }

    /// Small spheres (atoms, beads) use half the segment budget.
    fn bead_shape(&self, radius: f32) -> Shape {
        let s = (self.q.sphere_segments / 2).max(6);
        Shape::Sphere {
            radius,
            width_segments: s,
            height_segments: s,
        }
    }

    fn rod_shape(&self, radius: f32, length: f32) -> Shape {
        Shape::Cylinder {
            radius_top: radius,
            radius_bottom: radius,
            height: length,
            radial_segments: (self.q.radial_segments / 2).max(6),
        }
    }

    fn ring_shape(&self, radius: f32, tube: f32) -> Shape {
        Shape::Torus {
            radius,
            tube,
            radial_segments: (self.q.radial_segments / 3).max(4),
            tubular_segments: self.q.tubular_segments,
        }
    }

    /// Cylinder spanning `from` to `to`.
    fn bond(&self, name: &str, from: Vec3, to: Vec3, radius: f32, material: Material) -> Node {
        let dir = to - from;
        let length = dir.length().max(1e-4);
        let (x, y, z) =
            Quat::from_rotation_arc(Vec3::Y, dir / length).to_euler(EulerRot::XYZ);
        Node::mesh(name, self.rod_shape(radius, length), material)
            .at((from + to) * 0.5)
            .rotated(Vec3::new(x, y, z))
    }

    // ---------------- geometry ----------------

    fn cube(&self) -> CatalogEntry {
        let root = Node::mesh(
            "cube",
            Shape::Box {
                width: 2.0,
                height: 2.0,
                depth: 2.0,
            },
            Material::standard([0.26, 0.6, 0.88])
                .with_roughness(0.4)
                .with_metalness(0.2),
        )
        .at(Vec3::Y * MODEL_HEIGHT)
        .rotated(Vec3::new(0.35, 0.0, 0.2));
        CatalogEntry::new(
            "cube",
            "Cube",
            "Six congruent square faces, twelve edges and eight vertices. Volume is a³.",
            root,
            smallvec![Motion::Bob {
                amplitude: 0.15,
                speed: 1.5
            }],
        )
    }

    fn sphere(&self) -> CatalogEntry {
        let root = Node::mesh(
            "sphere",
            self.sphere_shape(1.2),
            Material::standard([0.93, 0.4, 0.4])
                .with_roughness(0.3)
                .with_metalness(0.3),
        )
        .at(Vec3::Y * MODEL_HEIGHT);
        CatalogEntry::new(
            "sphere",
            "Sphere",
            "Every surface point is the same distance from the centre. Volume is 4/3·π·r³.",
            root,
            smallvec![Motion::Pulse {
                amount: 0.06,
                speed: 2.0,
                vertical_only: false
            }],
        )
    }

    fn cone(&self) -> CatalogEntry {
        let root = Node::mesh(
            "cone",
            Shape::Cylinder {
                radius_top: 0.0,
                radius_bottom: 1.2,
                height: 2.4,
                radial_segments: self.q.radial_segments,
            },
            Material::standard([0.95, 0.77, 0.25]).with_roughness(0.45),
        )
        .at(Vec3::Y * MODEL_HEIGHT);
        CatalogEntry::new(
            "cone",
            "Cone",
            "A circular base tapering to a single apex. Volume is 1/3·π·r²·h.",
            root,
            smallvec![Motion::Bob {
                amplitude: 0.2,
                speed: 1.2
            }],
        )
    }

    fn torus(&self) -> CatalogEntry {
        let root = Node::mesh(
            "torus",
            Shape::Torus {
                radius: 1.0,
                tube: 0.38,
                radial_segments: self.q.radial_segments,
                tubular_segments: self.q.tubular_segments,
            },
            Material::standard([0.55, 0.45, 0.95])
                .with_roughness(0.25)
                .with_metalness(0.5),
        )
        .at(Vec3::Y * MODEL_HEIGHT);
        CatalogEntry::new(
            "torus",
            "Torus",
            "A circle swept around an axis in its plane. Surface area is 4·π²·R·r.",
            root,
            smallvec![
                Motion::Twist { rate: 0.6 },
                Motion::Bob {
                    amplitude: 0.1,
                    speed: 1.0
                }
            ],
        )
    }

    // ---------------- biology ----------------

    fn cell(&self) -> CatalogEntry {
        let mut rng = StdRng::seed_from_u64(CATALOG_SEED);
        let membrane = Node::mesh(
            "membrane",
            self.sphere_shape(1.5),
            Material::standard([0.55, 0.85, 0.75])
                .with_roughness(0.6)
                .with_opacity(0.35),
        );
        let nucleus = Node::mesh(
            "nucleus",
            self.sphere_shape(0.5),
            Material::standard([0.58, 0.32, 0.78]).with_roughness(0.4),
        )
        .at(Vec3::new(0.15, 0.1, 0.0));
        let mut organelles = Vec::new();
        for i in 0..self.detail(4, 7) {
            let dir = random_direction(&mut rng);
            let r: f32 = rng.gen_range(0.75..1.15);
            organelles.push(
                Node::mesh(
                    format!("mitochondrion{i}"),
                    self.bead_shape(0.16),
                    Material::standard([0.95, 0.55, 0.3]).with_roughness(0.5),
                )
                .at(dir * r)
                .scaled(Vec3::new(1.8, 1.0, 1.0))
                .rotated(Vec3::new(0.0, rng.gen_range(0.0..TAU), rng.gen_range(0.0..TAU))),
            );
        }
        for i in 0..self.detail(6, 14) {
            let dir = random_direction(&mut rng);
            organelles.push(
                Node::mesh(
                    format!("ribosome{i}"),
                    self.bead_shape(0.05),
                    Material::standard([0.9, 0.9, 0.6]),
                )
                .at(dir * rng.gen_range(0.6f32..1.35)),
            );
        }
        let root = Node::group("cell")
            .at(Vec3::Y * MODEL_HEIGHT)
            .with_child(membrane)
            .with_child(nucleus)
            .with_children(organelles);
        CatalogEntry::new(
            "cell",
            "Cell",
            "The basic unit of life: a membrane enclosing cytoplasm, a nucleus and organelles such as mitochondria.",
            root,
            smallvec![Motion::Pulse {
                amount: 0.03,
                speed: 1.5,
                vertical_only: false
            }],
        )
    }

    fn dna(&self) -> CatalogEntry {
        let pairs = self.detail(12, 20);
        let spacing = 0.18;
        let radius = 0.8;
        let offset = (pairs as f32 - 1.0) * spacing * 0.5;
        let base_colors = [
            [0.95, 0.35, 0.35],
            [0.35, 0.55, 0.95],
            [0.4, 0.85, 0.45],
            [0.95, 0.8, 0.3],
        ];
        let mut children = Vec::new();
        for i in 0..pairs {
            let theta = i as f32 * 0.6;
            let y = i as f32 * spacing - offset;
            let a = Vec3::new(theta.cos() * radius, y, theta.sin() * radius);
            let b = Vec3::new(-a.x, y, -a.z);
            let backbone = Material::standard([0.85, 0.88, 0.95]).with_metalness(0.3);
            children.push(
                Node::mesh(format!("strand_a{i}"), self.bead_shape(0.12), backbone.clone()).at(a),
            );
            children.push(
                Node::mesh(format!("strand_b{i}"), self.bead_shape(0.12), backbone).at(b),
            );
            let mid = (a + b) * 0.5;
            children.push(self.bond(
                &format!("base{i}_a"),
                a,
                mid,
                0.04,
                Material::standard(base_colors[i % 4]),
            ));
            children.push(self.bond(
                &format!("base{i}_b"),
                mid,
                b,
                0.04,
                Material::standard(base_colors[(i + 2) % 4]),
            ));
        }
        let root = Node::group("dna")
            .at(Vec3::Y * (MODEL_HEIGHT + 0.3))
            .with_children(children);
        CatalogEntry::new(
            "dna",
            "DNA",
            "A double helix of two sugar-phosphate backbones joined by paired bases A–T and C–G.",
            root,
            smallvec![Motion::Twist { rate: 0.4 }],
        )
    }

    fn virus(&self) -> CatalogEntry {
        let capsid_segments = (self.q.sphere_segments / 2).max(8);
        let capsid = Node::mesh(
            "capsid",
            Shape::Sphere {
                radius: 0.9,
                width_segments: capsid_segments,
                height_segments: capsid_segments,
            },
            Material::standard([0.85, 0.3, 0.45]).with_roughness(0.5),
        );
        let count = self.detail(12, 24);
        let mut spikes = Vec::new();
        for (i, dir) in fibonacci_sphere(count).into_iter().enumerate() {
            let base = dir * 0.85;
            let tip = dir * 1.3;
            spikes.push(self.bond(
                &format!("spike{i}"),
                base,
                tip,
                0.04,
                Material::standard([0.95, 0.75, 0.8]),
            ));
            spikes.push(
                Node::mesh(
                    format!("spike_tip{i}"),
                    self.bead_shape(0.09),
                    Material::standard([0.98, 0.9, 0.4]),
                )
                .at(tip),
            );
        }
        let root = Node::group("virus")
            .at(Vec3::Y * MODEL_HEIGHT)
            .with_child(capsid)
            .with_children(spikes);
        CatalogEntry::new(
            "virus",
            "Virus",
            "Genetic material packed in a protein capsid; surface spikes bind to host cells.",
            root,
            smallvec![
                Motion::Pulse {
                    amount: 0.04,
                    speed: 2.5,
                    vertical_only: false
                },
                Motion::Bob {
                    amplitude: 0.15,
                    speed: 1.1
                }
            ],
        )
    }

    fn neuron(&self) -> CatalogEntry {
        let membrane = Material::standard([0.95, 0.65, 0.35]).with_roughness(0.45);
        let soma = Node::mesh("soma", self.sphere_shape(0.5), membrane.clone())
            .at(Vec3::new(-1.2, 0.0, 0.0));
        let mut children = vec![soma];
        let dendrites = self.detail(4, 6);
        for i in 0..dendrites {
            let a = i as f32 / dendrites as f32 * TAU;
            let from = Vec3::new(-1.2, 0.0, 0.0);
            let to = from + Vec3::new(-0.5 - a.cos().abs() * 0.4, a.sin() * 0.9, a.cos() * 0.9);
            children.push(self.bond(&format!("dendrite{i}"), from, to, 0.06, membrane.clone()));
        }
        let axon_end = Vec3::new(2.0, 0.0, 0.0);
        children.push(self.bond(
            "axon",
            Vec3::new(-0.75, 0.0, 0.0),
            axon_end,
            0.07,
            membrane.clone(),
        ));
        let sheaths = self.detail(3, 5);
        for i in 0..sheaths {
            let x = -0.4 + i as f32 * (2.2 / sheaths as f32);
            children.push(
                self.bond(
                    &format!("myelin{i}"),
                    Vec3::new(x, 0.0, 0.0),
                    Vec3::new(x + 0.3, 0.0, 0.0),
                    0.14,
                    Material::standard([0.92, 0.92, 0.85]).with_roughness(0.7),
                ),
            );
        }
        for i in 0..3 {
            let a = (i as f32 - 1.0) * 0.6;
            children.push(
                Node::mesh(
                    format!("terminal{i}"),
                    self.bead_shape(0.1),
                    Material::standard([0.4, 0.8, 0.95]).with_emissive([0.1, 0.3, 0.4]),
                )
                .at(axon_end + Vec3::new(0.25, a.sin() * 0.4, a.cos() * 0.2)),
            );
        }
        let root = Node::group("neuron")
            .at(Vec3::Y * MODEL_HEIGHT)
            .with_children(children);
        CatalogEntry::new(
            "neuron",
            "Neuron",
            "Dendrites gather signals, the soma integrates them and the myelinated axon carries the impulse onward.",
            root,
            smallvec![
                Motion::Pulse {
                    amount: 0.04,
                    speed: 3.0,
                    vertical_only: false
                },
                Motion::Bob {
                    amplitude: 0.1,
                    speed: 0.9
                }
            ],
        )
    }

    // ---------------- chemistry ----------------

    fn atom(&self) -> CatalogEntry {
        let mut nucleus = Node::group("nucleus");
        let nucleons = [
            Vec3::new(0.12, 0.0, 0.0),
            Vec3::new(-0.12, 0.0, 0.0),
            Vec3::new(0.0, 0.12, 0.05),
            Vec3::new(0.0, -0.12, 0.05),
            Vec3::new(0.0, 0.0, 0.14),
            Vec3::new(0.0, 0.0, -0.14),
        ];
        for (i, p) in nucleons.iter().enumerate() {
            let color = if i % 2 == 0 {
                [0.95, 0.3, 0.3]
            } else {
                [0.6, 0.6, 0.65]
            };
            nucleus = nucleus.with_child(
                Node::mesh(format!("nucleon{i}"), self.bead_shape(0.14), Material::standard(color))
                    .at(*p),
            );
        }
        let mut root = Node::group("atom").at(Vec3::Y * MODEL_HEIGHT).with_child(nucleus);
        for (i, tilt) in [0.0f32, 1.05, -1.05].into_iter().enumerate() {
            let radius = 1.2 + i as f32 * 0.15;
            root = root.with_child(
                Node::mesh(
                    format!("shell{i}"),
                    self.ring_shape(radius, 0.012),
                    Material::standard([0.5, 0.7, 0.95]).with_opacity(0.5),
                )
                .rotated(Vec3::new(FRAC_PI_2 + tilt, 0.0, 0.0)),
            );
            root = root.with_child(
                Node::mesh(
                    format!("electron{i}"),
                    self.bead_shape(0.08),
                    Material::standard([0.4, 0.75, 1.0]).with_emissive([0.2, 0.4, 0.8]),
                )
                .with_orbit(Orbit {
                    phase: i as f32 * 2.1,
                    radius,
                    speed: 2.0 + i as f32 * 0.5,
                    height: 0.0,
                    tilt,
                }),
            );
        }
        CatalogEntry::new(
            "atom",
            "Atom",
            "A dense nucleus of protons and neutrons surrounded by electrons in orbital shells.",
            root,
            smallvec![Motion::Orbit],
        )
    }

    fn water(&self) -> CatalogEntry {
        let half_angle = 104.5f32.to_radians() * 0.5;
        let oxygen = Vec3::ZERO;
        let bond_len = 1.0;
        let h1 = Vec3::new(half_angle.sin(), -half_angle.cos(), 0.0) * bond_len;
        let h2 = Vec3::new(-half_angle.sin(), -half_angle.cos(), 0.0) * bond_len;
        let bond = Material::standard([0.85, 0.85, 0.85]);
        let root = Node::group("water")
            .at(Vec3::Y * (MODEL_HEIGHT + 0.3))
            .with_child(
                Node::mesh(
                    "oxygen",
                    self.sphere_shape(0.55),
                    Material::standard([0.92, 0.25, 0.25]),
                )
                .at(oxygen),
            )
            .with_child(
                Node::mesh(
                    "hydrogen1",
                    self.bead_shape(0.32),
                    Material::standard([0.95, 0.95, 0.95]),
                )
                .at(h1),
            )
            .with_child(
                Node::mesh(
                    "hydrogen2",
                    self.bead_shape(0.32),
                    Material::standard([0.95, 0.95, 0.95]),
                )
                .at(h2),
            )
            .with_child(self.bond("bond1", oxygen, h1, 0.08, bond.clone()))
            .with_child(self.bond("bond2", oxygen, h2, 0.08, bond));
        CatalogEntry::new(
            "water",
            "Water Molecule",
            "H₂O: one oxygen bonded to two hydrogens at about 104.5°, giving the molecule its polarity.",
            root,
            smallvec![
                Motion::Bob {
                    amplitude: 0.12,
                    speed: 1.3
                },
                Motion::Swing {
                    amplitude: 0.15,
                    speed: 0.8
                }
            ],
        )
    }

    fn methane(&self) -> CatalogEntry {
        let bond_len = 1.1;
        let mut root = Node::group("methane")
            .at(Vec3::Y * MODEL_HEIGHT)
            .with_child(Node::mesh(
                "carbon",
                self.sphere_shape(0.45),
                Material::standard([0.2, 0.2, 0.22]).with_roughness(0.4),
            ));
        let dirs = [
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(-1.0, -1.0, 1.0),
        ];
        for (i, d) in dirs.iter().enumerate() {
            let p = d.normalize() * bond_len;
            root = root
                .with_child(
                    Node::mesh(
                        format!("hydrogen{i}"),
                        self.bead_shape(0.28),
                        Material::standard([0.95, 0.95, 0.95]),
                    )
                    .at(p),
                )
                .with_child(self.bond(
                    &format!("bond{i}"),
                    Vec3::ZERO,
                    p,
                    0.07,
                    Material::standard([0.8, 0.8, 0.8]),
                ));
        }
        CatalogEntry::new(
            "methane",
            "Methane",
            "CH₄: a carbon atom at the centre of a tetrahedron of four hydrogens, bond angles 109.5°.",
            root,
            smallvec![
                Motion::Twist { rate: 0.3 },
                Motion::Bob {
                    amplitude: 0.1,
                    speed: 1.0
                }
            ],
        )
    }

    fn crystal(&self) -> CatalogEntry {
        let n = 3i32;
        let step = 0.7;
        let offset = (n - 1) as f32 * step * 0.5;
        let mut children = Vec::new();
        let at = |x: i32, y: i32, z: i32| {
            Vec3::new(x as f32 * step - offset, y as f32 * step - offset, z as f32 * step - offset)
        };
        let link = Material::standard([0.7, 0.7, 0.75]).with_opacity(0.6);
        for x in 0..n {
            for y in 0..n {
                for z in 0..n {
                    let p = at(x, y, z);
                    let (name, color, r) = if (x + y + z) % 2 == 0 {
                        ("sodium", [0.6, 0.4, 0.9], 0.14)
                    } else {
                        ("chloride", [0.35, 0.9, 0.45], 0.2)
                    };
                    children.push(
                        Node::mesh(
                            format!("{name}_{x}{y}{z}"),
                            self.bead_shape(r),
                            Material::standard(color),
                        )
                        .at(p),
                    );
                    for (dx, dy, dz) in [(1, 0, 0), (0, 1, 0), (0, 0, 1)] {
                        if x + dx < n && y + dy < n && z + dz < n {
                            children.push(self.bond(
                                &format!("link_{x}{y}{z}_{dx}{dy}{dz}"),
                                p,
                                at(x + dx, y + dy, z + dz),
                                0.025,
                                link.clone(),
                            ));
                        }
                    }
                }
            }
        }
        let root = Node::group("crystal")
            .at(Vec3::Y * MODEL_HEIGHT)
            .with_children(children);
        CatalogEntry::new(
            "crystal",
            "Crystal Lattice",
            "Sodium chloride: alternating Na⁺ and Cl⁻ ions repeating in a cubic lattice.",
            root,
            smallvec![
                Motion::Twist { rate: 0.2 },
                Motion::Bob {
                    amplitude: 0.1,
                    speed: 0.8
                }
            ],
        )
    }

    // ---------------- physics ----------------

    fn solar_system(&self) -> CatalogEntry {
        let sun = Node::mesh(
            "sun",
            self.sphere_shape(0.7),
            Material::standard([1.0, 0.8, 0.3]).with_emissive([1.0, 0.6, 0.1]),
        );
        let planets: [(&str, f32, f32, f32, [f32; 3]); 4] = [
            ("mercury", 1.3, 0.08, 1.6, [0.7, 0.65, 0.6]),
            ("venus", 1.8, 0.13, 1.2, [0.95, 0.8, 0.5]),
            ("earth", 2.4, 0.15, 0.9, [0.3, 0.55, 0.95]),
            ("mars", 3.0, 0.11, 0.7, [0.9, 0.4, 0.25]),
        ];
        let mut root = Node::group("solar_system")
            .at(Vec3::Y * MODEL_HEIGHT)
            .with_child(sun);
        for (i, (name, radius, size, speed, color)) in planets.into_iter().enumerate() {
            let mut planet = Node::mesh(name, self.bead_shape(size), Material::standard(color))
                .with_orbit(Orbit {
                    phase: i as f32 * 1.7,
                    radius,
                    speed,
                    height: 0.0,
                    tilt: 0.0,
                });
            if name == "earth" {
                planet = planet.with_child(
                    Node::mesh(
                        "moon",
                        self.bead_shape(0.05),
                        Material::standard([0.85, 0.85, 0.85]),
                    )
                    .with_orbit(Orbit {
                        phase: 0.0,
                        radius: 0.3,
                        speed: 4.0,
                        height: 0.0,
                        tilt: 0.3,
                    }),
                );
            }
            root = root
                .with_child(
                    Node::mesh(
                        format!("{name}_path"),
                        self.ring_shape(radius, 0.008),
                        Material::standard([0.6, 0.65, 0.8]).with_opacity(0.35),
                    )
                    .rotated(Vec3::new(FRAC_PI_2, 0.0, 0.0)),
                )
                .with_child(planet);
        }
        CatalogEntry::new(
            "solar_system",
            "Solar System",
            "The inner planets orbit the Sun; closer planets travel faster, as Kepler's third law predicts.",
            root,
            smallvec![Motion::Orbit],
        )
    }

    fn pendulum(&self) -> CatalogEntry {
        let length = 2.2;
        let root = Node::group("pendulum")
            .at(Vec3::Y * 3.4)
            .with_child(Node::mesh(
                "pivot",
                self.bead_shape(0.1),
                Material::standard([0.75, 0.75, 0.8]).with_metalness(0.7),
            ))
            .with_child(self.bond(
                "rod",
                Vec3::ZERO,
                Vec3::new(0.0, -length, 0.0),
                0.03,
                Material::standard([0.8, 0.8, 0.85]).with_metalness(0.6),
            ))
            .with_child(
                Node::mesh(
                    "bob",
                    self.sphere_shape(0.35),
                    Material::standard([0.85, 0.65, 0.2])
                        .with_metalness(0.8)
                        .with_roughness(0.3),
                )
                .at(Vec3::new(0.0, -length, 0.0)),
            );
        CatalogEntry::new(
            "pendulum",
            "Pendulum",
            "A mass on a rod trading potential for kinetic energy; the period is 2π·√(L/g).",
            root,
            smallvec![Motion::Swing {
                amplitude: 0.5,
                speed: 2.1
            }],
        )
    }

    fn spring(&self) -> CatalogEntry {
        let coils = self.detail(8, 12);
        let pitch = 0.18;
        let coil = Material::standard([0.75, 0.78, 0.85])
            .with_metalness(0.8)
            .with_roughness(0.3);
        let mut root = Node::group("spring").at(Vec3::Y * 3.4).with_child(Node::mesh(
            "anchor",
            Shape::Box {
                width: 1.2,
                height: 0.1,
                depth: 1.2,
            },
            Material::standard([0.4, 0.42, 0.48]),
        ));
        for i in 0..coils {
            root = root.with_child(
                Node::mesh(format!("coil{i}"), self.ring_shape(0.3, 0.03), coil.clone())
                    .at(Vec3::new(0.0, -0.15 - i as f32 * pitch, 0.0))
                    .rotated(Vec3::new(FRAC_PI_2, 0.0, 0.0)),
            );
        }
        let bottom = -0.15 - coils as f32 * pitch;
        root = root.with_child(
            Node::mesh(
                "mass",
                Shape::Box {
                    width: 0.6,
                    height: 0.5,
                    depth: 0.6,
                },
                Material::standard([0.3, 0.6, 0.9]),
            )
            .at(Vec3::new(0.0, bottom - 0.25, 0.0)),
        );
        CatalogEntry::new(
            "spring",
            "Spring",
            "Simple harmonic motion: the restoring force F = −k·x makes the mass oscillate about equilibrium.",
            root,
            smallvec![Motion::Pulse {
                amount: 0.22,
                speed: 3.0,
                vertical_only: true
            }],
        )
    }

    fn wave(&self) -> CatalogEntry {
        let points = self.detail(16, 32);
        let span = 6.0;
        let children = (0..points).map(|i| {
            let x = -span * 0.5 + i as f32 * span / (points - 1) as f32;
            Node::mesh(
                format!("particle{i}"),
                self.bead_shape(0.09),
                Material::standard([0.3, 0.75, 0.95]).with_emissive([0.05, 0.2, 0.3]),
            )
            .at(Vec3::new(x, 0.0, 0.0))
        });
        let root = Node::group("wave")
            .at(Vec3::Y * MODEL_HEIGHT)
            .with_children(children.collect::<Vec<_>>());
        CatalogEntry::new(
            "wave",
            "Wave",
            "A transverse wave: each particle moves up and down while the disturbance travels along the line.",
            root,
            smallvec![Motion::Ripple {
                amplitude: 0.5,
                wavelength: 3.0,
                speed: 3.0
            }],
        )
    }
}

fn random_direction(rng: &mut StdRng) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        let len2 = v.length_squared();
        if len2 > 1e-4 && len2 <= 1.0 {
            return v / len2.sqrt();
        }
    }
}

/// Evenly spread unit vectors.
fn fibonacci_sphere(n: usize) -> Vec<Vec3> {
    let golden = std::f32::consts::PI * (3.0 - 5.0f32.sqrt());
    (0..n)
        .map(|i| {
            let y = 1.0 - (i as f32 + 0.5) / n as f32 * 2.0;
            let r = (1.0 - y * y).sqrt();
            let theta = golden * i as f32;
            Vec3::new(theta.cos() * r, y, theta.sin() * r)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subjects_parse_case_insensitively() {
        assert_eq!("Biology".parse::<Subject>(), Ok(Subject::Biology));
        assert_eq!(" physics ".parse::<Subject>(), Ok(Subject::Physics));
        assert_eq!(
            "history".parse::<Subject>(),
            Err(SceneError::UnknownSubject("history".into()))
        );
    }

    #[test]
    fn every_subject_has_four_entries() {
        for subject in Subject::ALL {
            let entries = build_catalog(subject, &QualityProfile::HIGH);
            assert_eq!(entries.len(), 4, "{subject}");
            for e in &entries {
                assert!(e.root.mesh_count() > 0, "{} has no meshes", e.key);
                assert!(!e.motions.is_empty(), "{} never moves", e.key);
            }
        }
    }

    #[test]
    fn low_quality_catalog_is_lighter() {
        let verts = |q: &QualityProfile| {
            build_catalog(Subject::Biology, q)
                .iter()
                .map(|e| {
                    let mut n = 0;
                    e.root.visit_meshes(glam::Mat4::IDENTITY, &mut |m, _| {
                        n += m.geometry.tessellate().vertex_count()
                    });
                    n
                })
                .sum::<usize>()
        };
        assert!(verts(&QualityProfile::LOW) < verts(&QualityProfile::HIGH));
    }

    #[test]
    fn prepare_marks_shadows_per_quality() {
        let check = |q: &QualityProfile| {
            for e in build_catalog(Subject::Chemistry, q) {
                e.root.visit_meshes(glam::Mat4::IDENTITY, &mut |m, _| {
                    assert_eq!(m.cast_shadow, q.shadows);
                    assert_eq!(m.receive_shadow, q.shadows);
                });
            }
        };
        check(&QualityProfile::LOW);
        check(&QualityProfile::HIGH);
    }

    #[test]
    fn biology_starts_with_cell_then_dna() {
        let entries = build_catalog(Subject::Biology, &QualityProfile::LOW);
        let keys: Vec<_> = entries.iter().map(|e| e.key).collect();
        assert_eq!(keys, ["cell", "dna", "virus", "neuron"]);
        assert_eq!(entries[1].name, "DNA");
    }

    #[test]
    fn bonds_span_their_endpoints() {
        let b = Builder::new(&QualityProfile::LOW);
        let from = Vec3::new(0.0, 0.0, 0.0);
        let to = Vec3::new(1.0, 1.0, 1.0);
        let node = b.bond("b", from, to, 0.1, Material::standard([1.0; 3]));
        let m = node.transform.matrix();
        let top = m.transform_point3(Vec3::new(0.0, to.distance(from) * 0.5, 0.0));
        assert!((top - to).length() < 1e-4);
    }

    #[test]
    fn fibonacci_directions_are_unit() {
        for v in fibonacci_sphere(24) {
            assert!((v.length() - 1.0).abs() < 1e-5);
        }
    }
}
