//! Overlap resolution between two rigid bodies.
//!
//! Resolution pushes a body out along the side of least penetration. Only the body being
//! resolved moves; its peer gets its own turn when its collision pass runs.

use super::{
    aa_box::AaBox,
    body::RigidBody,
};
use crate::{
    axis::{
        PerSide,
        Side,
        SIDES,
    },
    scene::BodyKey,
    vector::VectorExt,
};
use vek::*;


/// Distance from each face of `a` to the opposing face of `b`, indexed by `a`'s side.
///
/// For overlapping boxes the smallest of these is the shortest way out.
pub fn penetration_depths(a: &AaBox, b: &AaBox) -> PerSide<f32> {
    let (a_min, a_max) = (a.min(), a.max());
    let (b_min, b_max) = (b.min(), b.max());
    PerSide([
        (a_min.x - b_max.x).abs(),
        (a_max.x - b_min.x).abs(),
        (a_min.y - b_max.y).abs(),
        (a_max.y - b_min.y).abs(),
        (a_min.z - b_max.z).abs(),
        (a_max.z - b_min.z).abs(),
    ])
}

/// Side and distance of least penetration. Ties go to the earliest side.
///
/// Returns `None` if more than one depth is exactly zero: the boxes are touching along an edge or
/// corner, or are flat against each other, and do not count as colliding.
pub fn least_penetration(depths: &PerSide<f32>) -> Option<(Side, f32)> {
    let mut zeros = 0;
    let mut side = Side::Left;
    let mut distance = depths[Side::Left];
    for s in SIDES {
        if depths[s] < distance {
            distance = depths[s];
            side = s;
        }
        if depths[s] == 0.0 {
            zeros += 1;
        }
    }
    if zeros > 1 {
        None
    } else {
        Some((side, distance))
    }
}

impl RigidBody {
    /// Resolve an overlap with `peer`, whose box and velocity are given.
    ///
    /// Marks self colliding and files the peer under the side of least penetration. If self is
    /// moving into the peer on that axis it is moved back out by its share of the two bodies'
    /// combined speed, so a fast body yields less than a slow one and a body at rest is not
    /// displaced at all. Returns the side, or `None` for a degenerate touch, which changes
    /// nothing.
    pub fn resolve_against(
        &mut self,
        peer: BodyKey,
        peer_box: &AaBox,
        peer_vel: Vec3<f32>,
    ) -> Option<Side> {
        let (side, distance) = least_penetration(&penetration_depths(&self.bbox, peer_box))?;
        self.colliding = true;

        let (axis, pole) = side.to_axis_pole();
        let dir = pole.to_f32();
        let ours = self.vel.axis(axis);
        if ours * dir > 0.0 {
            let speed = ours.abs() + peer_vel.axis(axis).abs();
            // unreachable with `ours` non-zero, but a zero here would poison the position
            if speed > 0.0 {
                let correction = distance * (ours.abs() / speed);
                let pos = self.pos.axis(axis) - correction * dir;
                self.set_position(self.pos.with_axis(axis, pos));
            }
        }

        self.contacts[side].push(peer);
        Some(side)
    }
}


#[cfg(test)]
fn test_box(pos: [f32; 3]) -> AaBox {
    AaBox::new([1.0, 1.0, 1.0], pos).unwrap()
}

#[test]
fn test_depths() {
    let a = test_box([0.0, 0.0, 0.0]);
    let b = test_box([0.75, 0.0, 0.0]);
    let depths = penetration_depths(&a, &b);
    assert_eq!(depths[Side::Left], 1.75);
    assert_eq!(depths[Side::Right], 0.25);
    assert_eq!(depths[Side::Bottom], 1.0);
    assert_eq!(depths[Side::Top], 1.0);
    assert_eq!(least_penetration(&depths), Some((Side::Right, 0.25)));

    let c = test_box([0.0, -0.875, 0.0]);
    assert_eq!(
        least_penetration(&penetration_depths(&a, &c)),
        Some((Side::Bottom, 0.125)),
    );
}

#[test]
fn test_face_touch_resolves() {
    let a = test_box([0.0, 0.0, 0.0]);
    let b = test_box([0.0, 1.0, 0.0]);
    assert_eq!(
        least_penetration(&penetration_depths(&a, &b)),
        Some((Side::Top, 0.0)),
    );
}

#[test]
fn test_edge_touch_is_degenerate() {
    let a = test_box([0.0, 0.0, 0.0]);
    let b = test_box([1.0, 1.0, 0.0]);
    assert!(a.overlaps(&b));
    assert_eq!(least_penetration(&penetration_depths(&a, &b)), None);
    let c = test_box([-1.0, 1.0, 1.0]);
    assert_eq!(least_penetration(&penetration_depths(&a, &c)), None);
}

#[test]
fn test_resolve_moving_into_peer() {
    let mut body = RigidBody::new();
    body.set_position([0.75, 0.0, 0.0]);
    body.set_velocity([0.75, 0.0, 0.0]);
    let peer = test_box([1.5, 0.0, 0.0]);

    let side = body.resolve_against(BodyKey::dangling(), &peer, Vec3::zero());
    assert_eq!(side, Some(Side::Right));
    assert!(body.is_colliding());
    assert!(body.collides_with_on(BodyKey::dangling(), Side::Right));
    assert_eq!(body.position().x, 0.5);
    assert_eq!(body.bounding_box().max().x, peer.min().x);
}

#[test]
fn test_resolve_shares_correction_by_speed() {
    let mut body = RigidBody::new();
    body.set_position([0.75, 0.0, 0.0]);
    body.set_velocity([0.25, 0.0, 0.0]);
    let peer = test_box([1.5, 0.0, 0.0]);

    body.resolve_against(BodyKey::dangling(), &peer, Vec3::new(-0.75, 0.0, 0.0));
    // overlap 0.25, our share 0.25 / (0.25 + 0.75)
    assert_eq!(body.position().x, 0.6875);
}

#[test]
fn test_resolve_at_rest_is_not_displaced() {
    let mut body = RigidBody::new();
    body.set_position([0.75, 0.0, 0.0]);
    body.set_velocity([0.0, 0.0, 0.0]);
    let peer = test_box([1.5, 0.0, 0.0]);

    assert_eq!(
        body.resolve_against(BodyKey::dangling(), &peer, Vec3::new(-3.0, 0.0, 0.0)),
        Some(Side::Right),
    );
    assert!(body.is_colliding());
    assert_eq!(body.position().x, 0.75);
}

#[test]
fn test_resolve_moving_away() {
    let mut body = RigidBody::new();
    body.set_position([0.75, 0.0, 0.0]);
    body.set_velocity([-0.5, 0.0, 0.0]);
    let peer = test_box([1.5, 0.0, 0.0]);

    body.resolve_against(BodyKey::dangling(), &peer, Vec3::zero());
    assert!(body.is_colliding());
    assert!(body.collides_on(Side::Right));
    assert_eq!(body.position().x, 0.75);
}

#[test]
fn test_resolve_degenerate_changes_nothing() {
    let mut body = RigidBody::new();
    body.set_velocity([0.5, 0.5, 0.0]);
    let peer = test_box([1.0, 1.0, 0.0]);

    assert_eq!(body.resolve_against(BodyKey::dangling(), &peer, Vec3::zero()), None);
    assert!(!body.is_colliding());
    assert!(!body.collides_with(BodyKey::dangling()));
    assert_eq!(body.position(), Vec3::zero());
}
