//! Per-entry animation strategies.
//!
//! Every catalog entry owns a short list of [`Motion`]s. All motions are driven
//! by wall-clock seconds so visual speed does not depend on frame rate.

use crate::scene::Node;
use std::f32::consts::TAU;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Motion {
    /// Vertical bob around the rest height.
    Bob { amplitude: f32, speed: f32 },
    /// Scale oscillation; `vertical_only` stretches along Y like a spring.
    Pulse {
        amount: f32,
        speed: f32,
        vertical_only: bool,
    },
    /// Moves every descendant that carries an [`Orbit`](crate::scene::Orbit).
    Orbit,
    /// Pendulum swing around Z.
    Swing { amplitude: f32, speed: f32 },
    /// Extra spin around Y on top of the baseline, radians per second.
    Twist { rate: f32 },
    /// Travelling wave over the direct children, keyed by their rest X.
    Ripple {
        amplitude: f32,
        wavelength: f32,
        speed: f32,
    },
}

impl Motion {
    pub fn apply(&self, root: &mut Node, t: f32, dt: f32) {
        match *self {
            Motion::Bob { amplitude, speed } => {
                root.transform.translation.y =
                    root.rest.translation.y + (t * speed).sin() * amplitude;
            }
            Motion::Pulse {
                amount,
                speed,
                vertical_only,
            } => {
                let k = 1.0 + (t * speed).sin() * amount;
                if vertical_only {
                    root.transform.scale.y = root.rest.scale.y * k;
                } else {
                    root.transform.scale = root.rest.scale * k;
                }
            }
            Motion::Orbit => {
                root.for_each_node_mut(&mut |node| {
                    if let Some(orbit) = node.orbit {
                        node.transform.translation = orbit.position_at(t);
                    }
                });
            }
            Motion::Swing { amplitude, speed } => {
                root.transform.rotation.z = root.rest.rotation.z + (t * speed).sin() * amplitude;
            }
            Motion::Twist { rate } => {
                root.transform.rotation.y += rate * dt;
            }
            Motion::Ripple {
                amplitude,
                wavelength,
                speed,
            } => {
                for child in &mut root.children {
                    let phase = child.rest.translation.x / wavelength * TAU - t * speed;
                    child.transform.translation.y =
                        child.rest.translation.y + phase.sin() * amplitude;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Orbit;
    use approx::assert_relative_eq;
    use glam::Vec3;

    #[test]
    fn bob_is_time_based() {
        let mut a = Node::group("a").at(Vec3::new(0.0, 1.0, 0.0));
        let mut b = a.clone();
        let bob = Motion::Bob {
            amplitude: 0.5,
            speed: 2.0,
        };
        // same wall-clock time, different frame spacing
        bob.apply(&mut a, 0.75, 1.0 / 60.0);
        bob.apply(&mut b, 0.75, 1.0 / 30.0);
        assert_eq!(a.transform, b.transform);
        assert_relative_eq!(a.transform.translation.y, 1.0 + (1.5f32).sin() * 0.5);
    }

    #[test]
    fn orbit_moves_nested_satellites() {
        let orbit = Orbit {
            phase: 0.0,
            radius: 1.0,
            speed: 1.0,
            height: 0.0,
            tilt: 0.0,
        };
        let mut root = Node::group("sun")
            .with_child(Node::group("earth").with_orbit(orbit).with_child(
                Node::group("moon").with_orbit(Orbit {
                    radius: 0.3,
                    speed: 4.0,
                    ..orbit
                }),
            ));
        Motion::Orbit.apply(&mut root, 1.0, 0.016);
        let earth = &root.children[0];
        assert_relative_eq!(earth.transform.translation.x, 1.0f32.cos(), epsilon = 1e-5);
        assert_relative_eq!(
            earth.children[0].transform.translation.z,
            4.0f32.sin() * 0.3,
            epsilon = 1e-5
        );
    }

    #[test]
    fn pulse_vertical_only_keeps_width() {
        let mut spring = Node::group("spring");
        Motion::Pulse {
            amount: 0.2,
            speed: 1.0,
            vertical_only: true,
        }
        .apply(&mut spring, std::f32::consts::FRAC_PI_2, 0.0);
        assert_relative_eq!(spring.transform.scale.y, 1.2, epsilon = 1e-5);
        assert_eq!(spring.transform.scale.x, 1.0);
    }

    #[test]
    fn ripple_offsets_children_by_position() {
        let mut wave = Node::group("wave").with_children(
            (0..4).map(|i| Node::group(format!("p{i}")).at(Vec3::new(i as f32, 0.0, 0.0))),
        );
        Motion::Ripple {
            amplitude: 1.0,
            wavelength: 4.0,
            speed: 0.0,
        }
        .apply(&mut wave, 0.0, 0.0);
        assert_relative_eq!(wave.children[1].transform.translation.y, 1.0, epsilon = 1e-5);
        assert_relative_eq!(wave.children[3].transform.translation.y, -1.0, epsilon = 1e-5);
    }
}
