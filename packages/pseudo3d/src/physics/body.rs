//! Rigid body state and the read-only collision query surface.

use super::aa_box::AaBox;
use crate::{
    axis::{
        PerSide,
        Side,
    },
    scene::BodyKey,
    settings::PhysicsSettings,
    vector::VectorExt,
};
use anyhow::*;
use vek::*;


/// Axis-aligned rigid body.
///
/// Units are scene units and ticks: velocity is per tick, acceleration per tick squared, and so
/// on. Gravity, drag and friction are all expressed as per-tick accelerations.
#[derive(Debug)]
pub struct RigidBody {
    pub(super) pos: Vec3<f32>,
    pub(super) vel: Vec3<f32>,
    pub(super) acc: Vec3<f32>,
    pub(super) jerk: Vec3<f32>,
    pub(super) gravity: Vec3<f32>,
    /// Symmetric per-axis bound on gravity-driven speed.
    pub(super) terminal_velocity: Vec3<f32>,
    pub(super) drag: Vec3<f32>,
    pub(super) friction: Vec3<f32>,
    pub(super) mass: f32,
    pub(super) collidable: bool,
    pub(super) kinematic: bool,
    pub(super) pushable: bool,
    pub(super) colliding: bool,
    pub(super) overlapping: bool,
    /// Peers touching each side as of the last collision pass. Rebuilt from scratch every pass.
    pub(super) contacts: PerSide<Vec<BodyKey>>,
    /// Own key, while this body is in a scene.
    pub(super) membership: Option<BodyKey>,
    pub(super) bbox: AaBox,
}

impl RigidBody {
    /// Construct with the default tunables.
    pub fn new() -> Self {
        let settings = PhysicsSettings::default();
        RigidBody {
            pos: Vec3::zero(),
            vel: Vec3::zero(),
            acc: Vec3::zero(),
            jerk: Vec3::zero(),
            gravity: settings.gravity,
            terminal_velocity: settings.terminal_velocity,
            drag: settings.drag,
            friction: settings.friction,
            mass: settings.mass,
            collidable: settings.collidable,
            kinematic: settings.kinematic,
            pushable: settings.pushable,
            colliding: false,
            overlapping: false,
            contacts: PerSide::default(),
            membership: None,
            bbox: AaBox::UNIT_BOX,
        }
    }

    /// Construct from (validated) settings.
    pub fn from_settings(settings: &PhysicsSettings) -> Result<Self> {
        settings.validate()?;
        let mut body = RigidBody::new();
        body.gravity = settings.gravity;
        body.terminal_velocity = settings.terminal_velocity;
        body.drag = settings.drag;
        body.friction = settings.friction;
        body.mass = settings.mass;
        body.collidable = settings.collidable;
        body.kinematic = settings.kinematic;
        body.pushable = settings.pushable;
        body.bbox.set_ext(settings.dimensions)?;
        Ok(body)
    }

    pub fn position(&self) -> Vec3<f32> {
        self.pos
    }

    /// Set the position, keeping the bounding box centered on it.
    pub fn set_position<V: Into<Vec3<f32>>>(&mut self, pos: V) {
        self.pos = pos.into();
        self.bbox.set_pos(self.pos);
    }

    pub fn velocity(&self) -> Vec3<f32> {
        self.vel
    }

    pub fn set_velocity<V: Into<Vec3<f32>>>(&mut self, vel: V) {
        self.vel = vel.into();
    }

    pub fn acceleration(&self) -> Vec3<f32> {
        self.acc
    }

    pub fn set_acceleration<V: Into<Vec3<f32>>>(&mut self, acc: V) {
        self.acc = acc.into();
    }

    pub fn jerk(&self) -> Vec3<f32> {
        self.jerk
    }

    pub fn set_jerk<V: Into<Vec3<f32>>>(&mut self, jerk: V) {
        self.jerk = jerk.into();
    }

    pub fn gravity(&self) -> Vec3<f32> {
        self.gravity
    }

    /// Gravity may point any way, but must be finite.
    pub fn set_gravity<V: Into<Vec3<f32>>>(&mut self, gravity: V) -> Result<()> {
        let gravity = gravity.into();
        check_gravity(gravity)?;
        self.gravity = gravity;
        Ok(())
    }

    pub fn terminal_velocity(&self) -> Vec3<f32> {
        self.terminal_velocity
    }

    pub fn set_terminal_velocity<V: Into<Vec3<f32>>>(&mut self, terminal_velocity: V) -> Result<()> {
        let terminal_velocity = terminal_velocity.into();
        check_tunable("terminal velocity", terminal_velocity)?;
        self.terminal_velocity = terminal_velocity;
        Ok(())
    }

    pub fn drag(&self) -> Vec3<f32> {
        self.drag
    }

    pub fn set_drag<V: Into<Vec3<f32>>>(&mut self, drag: V) -> Result<()> {
        let drag = drag.into();
        check_tunable("drag", drag)?;
        self.drag = drag;
        Ok(())
    }

    pub fn friction(&self) -> Vec3<f32> {
        self.friction
    }

    pub fn set_friction<V: Into<Vec3<f32>>>(&mut self, friction: V) -> Result<()> {
        let friction = friction.into();
        check_tunable("friction", friction)?;
        self.friction = friction;
        Ok(())
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn set_mass(&mut self, mass: f32) -> Result<()> {
        check_mass(mass)?;
        self.mass = mass;
        Ok(())
    }

    pub fn is_collidable(&self) -> bool {
        self.collidable
    }

    pub fn set_collidable(&mut self, collidable: bool) {
        self.collidable = collidable;
    }

    /// Non-kinematic bodies are skipped by both tick phases but can still be collided with.
    pub fn is_kinematic(&self) -> bool {
        self.kinematic
    }

    pub fn set_kinematic(&mut self, kinematic: bool) {
        self.kinematic = kinematic;
    }

    pub fn is_pushable(&self) -> bool {
        self.pushable
    }

    pub fn set_pushable(&mut self, pushable: bool) {
        self.pushable = pushable;
    }

    pub fn bounding_box(&self) -> &AaBox {
        &self.bbox
    }

    /// Replace the bounding box, re-centered on this body's position.
    pub fn set_bounding_box(&mut self, bbox: AaBox) {
        self.bbox = bbox;
        self.bbox.set_pos(self.pos);
    }

    /// Resize the bounding box. On error self is unchanged.
    pub fn set_dimensions(&mut self, width: f32, height: f32, depth: f32) -> Result<()> {
        self.bbox.set_ext(Extent3::new(width, height, depth))
    }

    /// Key of this body in the scene it was added to, if any.
    pub fn key(&self) -> Option<BodyKey> {
        self.membership
    }

    /// Whether the last collision pass resolved a (non-degenerate) collision.
    pub fn is_colliding(&self) -> bool {
        self.colliding
    }

    /// Whether the last collision pass found an overlap with a non-collidable pairing.
    pub fn is_overlapping(&self) -> bool {
        self.overlapping
    }

    /// Is `peer` touching any side?
    pub fn collides_with(&self, peer: BodyKey) -> bool {
        self.contacts.iter().any(|keys| keys.contains(&peer))
    }

    /// Is anything touching `side`?
    pub fn collides_on(&self, side: Side) -> bool {
        !self.contacts[side].is_empty()
    }

    /// Is `peer` touching `side`?
    pub fn collides_with_on(&self, peer: BodyKey, side: Side) -> bool {
        self.contacts[side].contains(&peer)
    }

    /// Peers touching `side`, in the order they were found.
    pub fn contacts(&self, side: Side) -> &[BodyKey] {
        &self.contacts[side]
    }

    pub(crate) fn set_membership(&mut self, membership: Option<BodyKey>) {
        self.membership = membership;
    }

    /// Reset the per-pass collision status.
    pub(crate) fn reset_collisions(&mut self) {
        self.colliding = false;
        self.overlapping = false;
        for keys in self.contacts.iter_mut() {
            keys.clear();
        }
    }

    pub(crate) fn mark_overlapping(&mut self) {
        self.overlapping = true;
    }

    /// Drop every reference to `peer` from the contact mapping.
    pub(crate) fn forget_contact(&mut self, peer: BodyKey) {
        for keys in self.contacts.iter_mut() {
            keys.retain(|&key| key != peer);
        }
    }
}

impl Default for RigidBody {
    fn default() -> Self {
        RigidBody::new()
    }
}

/// Copies motion state, tunables, flags and box. The copy belongs to no scene and touches
/// nothing.
impl Clone for RigidBody {
    fn clone(&self) -> Self {
        RigidBody {
            pos: self.pos,
            vel: self.vel,
            acc: self.acc,
            jerk: self.jerk,
            gravity: self.gravity,
            terminal_velocity: self.terminal_velocity,
            drag: self.drag,
            friction: self.friction,
            mass: self.mass,
            collidable: self.collidable,
            kinematic: self.kinematic,
            pushable: self.pushable,
            colliding: self.colliding,
            overlapping: self.overlapping,
            contacts: PerSide::default(),
            membership: None,
            bbox: self.bbox,
        }
    }
}

pub(crate) fn check_gravity(gravity: Vec3<f32>) -> Result<()> {
    ensure!(gravity.all_finite(), "gravity must be finite, got {:?}", gravity);
    Ok(())
}

pub(crate) fn check_tunable(name: &str, v: Vec3<f32>) -> Result<()> {
    ensure!(
        v.all_finite() && v.all_non_negative(),
        "{} must be finite and non-negative, got {:?}",
        name,
        v,
    );
    Ok(())
}

pub(crate) fn check_mass(mass: f32) -> Result<()> {
    ensure!(mass.is_finite() && mass > 0.0, "mass must be positive and finite, got {}", mass);
    Ok(())
}


#[test]
fn test_defaults() {
    let body = RigidBody::new();
    assert_eq!(body.gravity(), Vec3::new(0.0, -0.1, 0.0));
    assert_eq!(body.mass(), 1.0);
    assert!(body.is_kinematic());
    assert!(!body.is_pushable());
    assert!(body.is_collidable());
    assert!(!body.is_colliding());
    assert!(!body.is_overlapping());
    assert!(body.key().is_none());
}

#[test]
fn test_position_moves_box() {
    let mut body = RigidBody::new();
    body.set_dimensions(2.0, 2.0, 2.0).unwrap();
    body.set_position([1.0, 2.0, 3.0]);
    assert_eq!(body.bounding_box().pos(), Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(body.bounding_box().min(), Vec3::new(0.0, 1.0, 2.0));

    body.set_bounding_box(AaBox::UNIT_BOX);
    assert_eq!(body.bounding_box().pos(), Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn test_reject_bad_setters() {
    let mut body = RigidBody::new();
    assert!(body.set_mass(0.0).is_err());
    assert!(body.set_mass(-2.0).is_err());
    assert!(body.set_mass(f32::NAN).is_err());
    assert_eq!(body.mass(), 1.0);
    assert!(body.set_mass(3.0).is_ok());
    assert_eq!(body.mass(), 3.0);

    assert!(body.set_gravity([0.0, f32::NAN, 0.0]).is_err());
    assert!(body.set_gravity([f32::NEG_INFINITY, 0.0, 0.0]).is_err());
    assert_eq!(body.gravity(), Vec3::new(0.0, -0.1, 0.0));
    assert!(body.set_gravity([0.0, 0.5, 0.0]).is_ok());
    assert_eq!(body.gravity(), Vec3::new(0.0, 0.5, 0.0));

    assert!(body.set_drag([0.0, -0.1, 0.0]).is_err());
    assert!(body.set_friction([f32::INFINITY, 0.0, 0.0]).is_err());
    assert!(body.set_terminal_velocity([1.0, -1.0, 1.0]).is_err());
    assert!(body.set_dimensions(1.0, -1.0, 1.0).is_err());
    assert_eq!(body.bounding_box().ext(), Extent3::new(1.0, 1.0, 1.0));
}

#[test]
fn test_clone_has_no_membership() {
    let mut body = RigidBody::new();
    body.set_velocity([1.0, 0.0, 0.0]);
    body.set_pushable(true);
    body.membership = Some(BodyKey::dangling());
    body.contacts[Side::Bottom].push(BodyKey::dangling());

    let copy = body.clone();
    assert_eq!(copy.velocity(), body.velocity());
    assert!(copy.is_pushable());
    assert!(copy.key().is_none());
    assert!(!copy.collides_on(Side::Bottom));
    assert!(body.collides_on(Side::Bottom));
}
