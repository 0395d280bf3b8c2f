//! Do a tick of motion integration to a rigid body.

use super::body::RigidBody;
use crate::{
    axis::{
        Axis,
        PerAxis,
        Pole,
        Side,
        AXES,
    },
    scene::BodyKey,
    vector::VectorExt,
};
use vek::*;


/// Snapshot of a peer registered on one of the integrating body's sides, taken from the previous
/// collision pass.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Contact {
    pub side: Side,
    pub key: BodyKey,
    pub mass: f32,
    pub vel: Vec3<f32>,
    pub friction: Vec3<f32>,
    /// Peer is both pushable and kinematic. Momentum is only exchanged if the integrating body
    /// is pushable too; otherwise the contact stops it.
    pub pushable: bool,
}

/// New velocity for a peer on one axis, produced by a momentum exchange.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PeerImpulse {
    pub key: BodyKey,
    pub axis: Axis,
    pub vel: f32,
}

impl RigidBody {
    /// Advance jerk, acceleration, velocity and position by one tick.
    ///
    /// `contacts` is only consulted if the previous collision pass left this body colliding, so
    /// friction and blocking lag one tick behind detection. A non-kinematic body never calls
    /// this, so `self` counts as kinematic for the pushable check. Each contact is assumed to name a
    /// distinct peer. Momentum exchanged with pushable peers is returned rather than applied, and
    /// must be written back to those peers before anything else reads their velocity.
    pub fn integrate(&mut self, contacts: &[Contact]) -> Vec<PeerImpulse> {
        self.acc += self.jerk;
        let mut vel = self.vel + self.acc;

        for axis in AXES {
            let i = axis as usize;
            vel[i] = apply_gravity(vel[i], self.gravity[i], self.terminal_velocity[i]);
        }

        let mut impulses = Vec::new();
        let mut friction = Vec3::<f32>::zero();
        if self.colliding {
            let mut sums = PerAxis([0.0f32; 3]);
            let mut counts = PerAxis([0u32; 3]);
            for contact in contacts {
                let (axis, pole) = contact.side.to_axis_pole();
                let i = axis as usize;
                // only contacts we are moving into block us
                if Pole::of_f32(vel[i]) != Some(pole) {
                    continue;
                }

                if self.pushable && contact.pushable {
                    let (ours, theirs) = elastic_exchange(
                        self.mass,
                        vel[i],
                        contact.mass,
                        contact.vel[i],
                    );
                    trace!(
                        peer = ?contact.key,
                        ?axis,
                        before = vel[i],
                        after = ours,
                        peer_after = theirs,
                        "momentum exchange"
                    );
                    vel[i] = ours;
                    impulses.push(PeerImpulse {
                        key: contact.key,
                        axis,
                        vel: theirs,
                    });
                } else {
                    vel[i] = 0.0;
                }

                for other in axis.others() {
                    sums[other] += contact.friction.axis(other);
                    counts[other] += 1;
                }
            }

            for axis in AXES {
                if counts[axis] > 0 {
                    friction[axis as usize] =
                        (sums[axis] + self.friction.axis(axis)) / (counts[axis] + 1) as f32;
                }
            }
        }

        for axis in AXES {
            let i = axis as usize;
            vel[i] = apply_damping(vel[i], self.drag[i], friction[i]);
        }

        self.vel = vel;
        self.set_position(self.pos + vel);
        impulses
    }
}

/// 1-D elastic collision between masses `m1` and `m2` moving at `v1` and `v2`. Returns the new
/// velocities, in the same order.
pub fn elastic_exchange(m1: f32, v1: f32, m2: f32, v2: f32) -> (f32, f32) {
    let sum = m1 + m2;
    let diff = m1 - m2;
    (
        (diff / sum) * v1 + (2.0 * m2 / sum) * v2,
        (-diff / sum) * v2 + (2.0 * m1 / sum) * v1,
    )
}

/// Accelerate `v` by gravity `g` without pushing past `terminal` in gravity's direction. Speed
/// already beyond the bound is left alone.
fn apply_gravity(v: f32, g: f32, terminal: f32) -> f32 {
    if v > -terminal && g < 0.0 {
        (v + g).max(-terminal)
    } else if v < terminal && g > 0.0 {
        (v + g).min(terminal)
    } else {
        v
    }
}

/// Pull `v` toward zero by `drag + friction`, stopping at zero.
fn apply_damping(v: f32, drag: f32, friction: f32) -> f32 {
    if v < 0.0 {
        (v + drag + friction).min(0.0)
    } else if v > 0.0 {
        (v - drag - friction).max(0.0)
    } else {
        v
    }
}


#[cfg(test)]
fn free_body(vel: [f32; 3]) -> RigidBody {
    let mut body = RigidBody::new();
    body.set_gravity([0.0, 0.0, 0.0]).unwrap();
    body.set_drag([0.0, 0.0, 0.0]).unwrap();
    body.set_friction([0.0, 0.0, 0.0]).unwrap();
    body.set_velocity(vel);
    body
}

#[test]
fn test_constant_velocity() {
    let start = Vec3::new(1.0, -2.0, 0.5);
    let vel = Vec3::new(0.25, -0.5, 1.0);
    let mut body = free_body([0.25, -0.5, 1.0]);
    body.set_position(start);
    for n in 1..=40 {
        assert!(body.integrate(&[]).is_empty());
        assert_eq!(body.position(), start + vel * n as f32);
        assert_eq!(body.bounding_box().pos(), body.position());
        assert_eq!(body.velocity(), vel);
    }
}

#[test]
fn test_jerk_then_acceleration() {
    let mut body = free_body([0.0, 0.0, 0.0]);
    body.set_jerk([1.0, 0.0, 0.0]);
    body.integrate(&[]);
    assert_eq!(body.acceleration().x, 1.0);
    assert_eq!(body.velocity().x, 1.0);
    assert_eq!(body.position().x, 1.0);
    body.integrate(&[]);
    assert_eq!(body.acceleration().x, 2.0);
    assert_eq!(body.velocity().x, 3.0);
    assert_eq!(body.position().x, 4.0);
}

#[test]
fn test_terminal_velocity_clamp() {
    let mut body = free_body([0.0, 0.0, 0.0]);
    body.set_gravity([0.0, -0.1, 0.3]).unwrap();
    body.set_terminal_velocity([10.0, 1.0, 2.0]).unwrap();
    for _ in 0..100 {
        body.integrate(&[]);
        let vel = body.velocity();
        assert!(vel.y >= -1.0);
        assert!(vel.z <= 2.0);
        assert_eq!(vel.x, 0.0);
    }
    assert!(body.velocity().y <= -1.0 + 0.1);
    assert_eq!(body.velocity().y, -1.0);
    assert_eq!(body.velocity().z, 2.0);
}

#[test]
fn test_gravity_leaves_excess_speed() {
    let mut body = free_body([0.0, -5.0, 0.0]);
    body.set_gravity([0.0, -0.1, 0.0]).unwrap();
    body.set_terminal_velocity([1.0, 1.0, 1.0]).unwrap();
    body.integrate(&[]);
    assert_eq!(body.velocity().y, -5.0);
}

#[test]
fn test_drag_never_flips_sign() {
    for start in [0.003f32, -0.003, 0.5, -0.5, 0.01, -0.0125] {
        let mut body = free_body([start, start, start]);
        body.set_drag([0.01, 0.02, 0.005]).unwrap();
        let mut prev = body.velocity();
        for _ in 0..200 {
            body.integrate(&[]);
            let vel = body.velocity();
            for i in 0..3 {
                assert!(vel[i] * start >= 0.0, "sign flipped: {} -> {}", start, vel[i]);
                assert!(vel[i].abs() <= prev[i].abs());
            }
            prev = vel;
        }
        assert_eq!(body.velocity(), Vec3::zero());
    }
}

#[test]
fn test_elastic_exchange() {
    let (a, b) = elastic_exchange(1.0, 0.75, 1.0, 0.0);
    assert_eq!((a, b), (0.0, 0.75));

    for &(m1, v1, m2, v2) in &[
        (2.0f32, 0.5f32, 1.0f32, -0.25f32),
        (1.0, 3.0, 7.0, 0.0),
        (0.3, -1.5, 4.2, 2.25),
    ] {
        let (u1, u2) = elastic_exchange(m1, v1, m2, v2);
        let before = m1 * v1 + m2 * v2;
        let after = m1 * u1 + m2 * u2;
        assert!((before - after).abs() < 1e-4, "momentum {} -> {}", before, after);
        let e_before = m1 * v1 * v1 + m2 * v2 * v2;
        let e_after = m1 * u1 * u1 + m2 * u2 * u2;
        assert!((e_before - e_after).abs() < 1e-3, "energy {} -> {}", e_before, e_after);
    }
}

#[test]
fn test_contacts_ignored_unless_colliding() {
    let mut body = free_body([-0.5, 0.0, 0.0]);
    let contact = Contact {
        side: Side::Left,
        key: BodyKey::dangling(),
        mass: 1.0,
        vel: Vec3::zero(),
        friction: Vec3::zero(),
        pushable: false,
    };
    body.integrate(&[contact]);
    assert_eq!(body.velocity().x, -0.5);

    body.colliding = true;
    body.integrate(&[contact]);
    assert_eq!(body.velocity().x, 0.0);
}

#[test]
fn test_contact_only_blocks_motion_into_it() {
    let mut body = free_body([0.5, 0.0, 0.0]);
    body.colliding = true;
    let contact = Contact {
        side: Side::Left,
        key: BodyKey::dangling(),
        mass: 1.0,
        vel: Vec3::zero(),
        friction: Vec3::new(1.0, 1.0, 1.0),
        pushable: false,
    };
    body.integrate(&[contact]);
    assert_eq!(body.velocity().x, 0.5);
}

#[test]
fn test_contact_friction_average() {
    // resting on two floors while sliding along x
    let mut body = free_body([0.5, -0.25, 0.0]);
    body.set_friction([0.1, 0.1, 0.1]).unwrap();
    body.colliding = true;
    let floor = |friction: f32| Contact {
        side: Side::Bottom,
        key: BodyKey::dangling(),
        mass: 1.0,
        vel: Vec3::zero(),
        friction: Vec3::new(friction, friction, friction),
        pushable: false,
    };
    let impulses = body.integrate(&[floor(0.05), floor(0.15)]);
    assert!(impulses.is_empty());
    assert_eq!(body.velocity().y, 0.0);
    // the first floor stops our fall, so the second no longer sees us moving into it and only
    // the first contributes: (0.05 + 0.1) / 2
    assert!((body.velocity().x - (0.5 - 0.075)).abs() < 1e-6);
}

#[test]
fn test_pushable_contact_yields_impulse() {
    let mut body = free_body([0.75, 0.0, 0.0]);
    body.set_pushable(true);
    body.colliding = true;
    let contact = Contact {
        side: Side::Right,
        key: BodyKey::dangling(),
        mass: 1.0,
        vel: Vec3::zero(),
        friction: Vec3::zero(),
        pushable: true,
    };
    let impulses = body.integrate(&[contact]);
    assert_eq!(body.velocity().x, 0.0);
    assert_eq!(
        impulses,
        vec![PeerImpulse { key: BodyKey::dangling(), axis: Axis::X, vel: 0.75 }],
    );
}

#[test]
fn test_non_pushable_stops_at_pushable_contact() {
    let mut body = free_body([0.75, 0.0, 0.0]);
    body.colliding = true;
    let contact = Contact {
        side: Side::Right,
        key: BodyKey::dangling(),
        mass: 1.0,
        vel: Vec3::zero(),
        friction: Vec3::zero(),
        pushable: true,
    };
    assert!(body.integrate(&[contact]).is_empty());
    assert_eq!(body.velocity().x, 0.0);
}
