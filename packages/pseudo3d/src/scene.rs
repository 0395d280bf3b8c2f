//! Collections of simulated bodies, and the tick that drives them.

use crate::{
    physics::{
        aa_box::AaBox,
        body::RigidBody,
        motion::Contact,
    },
    axis::SIDES,
    vector::VectorExt,
};
use std::{
    fmt::{self, Debug, Formatter},
    ops::{Index, IndexMut},
    sync::atomic::{
        AtomicU64,
        Ordering,
    },
};
use anyhow::*;
use slab::Slab;
use vek::*;


static NEXT_SCENE_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique scene identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SceneId(u64);

/// Handle to a body within a scene.
///
/// Keys are not generational: once a body is removed its key may be handed out again to a later
/// insertion into the same scene.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BodyKey {
    scene: SceneId,
    idx: usize,
}

impl BodyKey {
    /// Scene this key belongs to.
    pub fn scene(self) -> SceneId {
        self.scene
    }

    #[cfg(test)]
    pub(crate) fn dangling() -> Self {
        BodyKey {
            scene: SceneId(u64::MAX),
            idx: usize::MAX,
        }
    }
}

/// Handle to a loop injection within a scene.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct InjectionKey(usize);

/// Code run against the scene at the start of every tick.
pub type Injection = Box<dyn FnMut(&mut Scene)>;

struct InjectionSlot {
    // only `None` while the injection is running
    injection: Option<Injection>,
    // registered while injections were running, so it waits for the next tick
    fresh: bool,
}

/// Ordered collection of rigid bodies simulated together.
pub struct Scene {
    id: SceneId,
    bodies: Slab<RigidBody>,
    // iteration order, which is insertion order
    order: Vec<BodyKey>,
    injections: Slab<InjectionSlot>,
    running_injections: bool,
    ticks: u64,
}

impl Scene {
    pub fn new() -> Self {
        Scene {
            id: SceneId(NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed)),
            bodies: Slab::new(),
            order: Vec::new(),
            injections: Slab::new(),
            running_injections: false,
            ticks: 0,
        }
    }

    pub fn id(&self) -> SceneId {
        self.id
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Add a body to the end of the scene, returning its key.
    ///
    /// Whatever contacts the body remembers from a previous scene are dropped.
    pub fn add(&mut self, mut body: RigidBody) -> BodyKey {
        let entry = self.bodies.vacant_entry();
        let key = BodyKey {
            scene: self.id,
            idx: entry.key(),
        };
        body.reset_collisions();
        body.set_membership(Some(key));
        entry.insert(body);
        self.order.push(key);
        debug!(?key, "added body");
        key
    }

    /// Remove a body from the scene, if present.
    ///
    /// Every other body forgets about it as a contact, so a later body reusing the key is never
    /// mistaken for it.
    pub fn remove(&mut self, key: BodyKey) -> Option<RigidBody> {
        if !self.contains(key) {
            return None;
        }
        let mut body = self.bodies.remove(key.idx);
        body.set_membership(None);
        self.order.retain(|&k| k != key);
        for (_, other) in self.bodies.iter_mut() {
            other.forget_contact(key);
        }
        debug!(?key, "removed body");
        Some(body)
    }

    pub fn contains(&self, key: BodyKey) -> bool {
        key.scene == self.id && self.bodies.contains(key.idx)
    }

    pub fn get(&self, key: BodyKey) -> Option<&RigidBody> {
        if key.scene == self.id {
            self.bodies.get(key.idx)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, key: BodyKey) -> Option<&mut RigidBody> {
        if key.scene == self.id {
            self.bodies.get_mut(key.idx)
        } else {
            None
        }
    }

    /// Keys of all bodies, in scene order.
    pub fn keys(&self) -> &[BodyKey] {
        &self.order
    }

    /// All bodies, in scene order.
    pub fn bodies(&self) -> impl Iterator<Item=(BodyKey, &RigidBody)> + '_ {
        self.order.iter().map(move |&key| (key, &self.bodies[key.idx]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Register code to run at the start of every tick, before any motion.
    pub fn add_injection<F>(&mut self, injection: F) -> InjectionKey
    where
        F: FnMut(&mut Scene) + 'static,
    {
        let key = InjectionKey(self.injections.insert(InjectionSlot {
            injection: Some(Box::new(injection)),
            fresh: self.running_injections,
        }));
        debug!(?key, "added loop injection");
        key
    }

    /// Unregister an injection. Returns whether it was registered.
    pub fn remove_injection(&mut self, key: InjectionKey) -> bool {
        let removed = self.injections.try_remove(key.0).is_some();
        if removed {
            debug!(?key, "removed loop injection");
        }
        removed
    }

    /// Do one tick: run injections, then integrate motion for every body, then resolve
    /// collisions for every body.
    ///
    /// The two passes are never interleaved. Collision resolution sees every body's integrated
    /// position, and integration sees the contacts from the previous tick's resolution.
    pub fn tick(&mut self) {
        trace!(tick = self.ticks, bodies = self.order.len(), "tick");
        self.run_injections();
        for i in 0..self.order.len() {
            let key = self.order[i];
            self.motion(key);
        }
        for i in 0..self.order.len() {
            let key = self.order[i];
            self.collisions(key);
        }
        self.ticks += 1;
    }

    /// Integrate one body's motion alone. Errors if the body is not in this scene.
    ///
    /// May change the velocity of pushable peers the body is moving into.
    pub fn tick_motion(&mut self, key: BodyKey) -> Result<()> {
        self.ensure_member(key)?;
        self.motion(key);
        Ok(())
    }

    /// Detect and resolve one body's collisions alone. Errors if the body is not in this scene.
    pub fn tick_collisions(&mut self, key: BodyKey) -> Result<()> {
        self.ensure_member(key)?;
        self.collisions(key);
        Ok(())
    }

    /// Other bodies whose boxes overlap the box with half-extents `radius` centered on the
    /// body at `key`, in scene order.
    pub fn nearby<V: Into<Vec3<f32>>>(&self, key: BodyKey, radius: V) -> Result<Vec<BodyKey>> {
        self.ensure_member(key)?;
        let radius = radius.into();
        let area = AaBox::new(
            Extent3::new(radius.x * 2.0, radius.y * 2.0, radius.z * 2.0),
            self[key].position(),
        )?;
        Ok(self.bodies()
            .filter(|&(other, body)| other != key && body.bounding_box().overlaps(&area))
            .map(|(other, _)| other)
            .collect())
    }

    fn ensure_member(&self, key: BodyKey) -> Result<()> {
        if !self.contains(key) {
            warn!(?key, scene = ?self.id, "body is not in this scene");
            bail!("body {:?} is not in scene {:?}", key, self.id);
        }
        Ok(())
    }

    fn run_injections(&mut self) {
        let keys = self.injections
            .iter()
            .map(|(key, _)| key)
            .collect::<Vec<_>>();
        self.running_injections = true;
        for key in keys {
            // take it out so it can borrow the scene mutably. a fresh slot is one an earlier
            // injection freed and refilled this tick.
            let taken = self.injections
                .get_mut(key)
                .filter(|slot| !slot.fresh)
                .and_then(|slot| slot.injection.take());
            if let Some(mut injection) = taken {
                injection(self);
                // put it back unless it was removed while running
                if let Some(slot) = self.injections.get_mut(key) {
                    if slot.injection.is_none() {
                        slot.injection = Some(injection);
                    }
                }
            }
        }
        self.running_injections = false;
        for (_, slot) in self.injections.iter_mut() {
            slot.fresh = false;
        }
    }

    fn motion(&mut self, key: BodyKey) {
        let body = &self.bodies[key.idx];
        if !body.is_kinematic() {
            return;
        }

        let mut contacts = Vec::new();
        if body.is_colliding() {
            for side in SIDES {
                for &peer_key in body.contacts(side) {
                    if let Some(peer) = self.get(peer_key) {
                        contacts.push(Contact {
                            side,
                            key: peer_key,
                            mass: peer.mass(),
                            vel: peer.velocity(),
                            friction: peer.friction(),
                            pushable: peer.is_pushable() && peer.is_kinematic(),
                        });
                    }
                }
            }
        }

        let impulses = self.bodies[key.idx].integrate(&contacts);
        for impulse in impulses {
            if let Some(peer) = self.get_mut(impulse.key) {
                let vel = peer.velocity().with_axis(impulse.axis, impulse.vel);
                peer.set_velocity(vel);
            }
        }
    }

    fn collisions(&mut self, key: BodyKey) {
        // a body made non-kinematic keeps no stale contacts
        self.bodies[key.idx].reset_collisions();
        if !self.bodies[key.idx].is_kinematic() {
            return;
        }

        for i in 0..self.order.len() {
            let peer_key = self.order[i];
            if peer_key == key {
                continue;
            }
            let peer = &self.bodies[peer_key.idx];
            let peer_box = *peer.bounding_box();
            let peer_vel = peer.velocity();
            let peer_collidable = peer.is_collidable();

            let body = &mut self.bodies[key.idx];
            if !body.bounding_box().overlaps(&peer_box) {
                continue;
            }
            if body.is_collidable() && peer_collidable {
                if let Some(side) = body.resolve_against(peer_key, &peer_box, peer_vel) {
                    trace!(?key, peer = ?peer_key, ?side, "collision");
                }
            } else {
                body.mark_overlapping();
            }
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Scene::new()
    }
}

impl Debug for Scene {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.id)
            .field("bodies", &self.order.len())
            .field("injections", &self.injections.len())
            .field("ticks", &self.ticks)
            .finish()
    }
}

impl Index<BodyKey> for Scene {
    type Output = RigidBody;

    fn index(&self, key: BodyKey) -> &RigidBody {
        match self.get(key) {
            Some(body) => body,
            None => panic!("body {:?} not present in scene {:?}", key, self.id),
        }
    }
}

impl IndexMut<BodyKey> for Scene {
    fn index_mut(&mut self, key: BodyKey) -> &mut RigidBody {
        let id = self.id;
        match self.get_mut(key) {
            Some(body) => body,
            None => panic!("body {:?} not present in scene {:?}", key, id),
        }
    }
}


#[cfg(test)]
use crate::axis::Side;
#[cfg(test)]
use std::{
    cell::Cell,
    rc::Rc,
};

#[cfg(test)]
fn frictionless(pos: [f32; 3], vel: [f32; 3]) -> RigidBody {
    let mut body = RigidBody::new();
    body.set_gravity([0.0, 0.0, 0.0]).unwrap();
    body.set_drag([0.0, 0.0, 0.0]).unwrap();
    body.set_friction([0.0, 0.0, 0.0]).unwrap();
    body.set_position(pos);
    body.set_velocity(vel);
    body
}

#[cfg(test)]
fn floor_block(pos: [f32; 3]) -> RigidBody {
    let mut body = RigidBody::new();
    body.set_kinematic(false);
    body.set_position(pos);
    body
}

#[test]
fn test_falling_body_comes_to_rest() {
    let mut scene = Scene::new();
    let mut body = RigidBody::new();
    body.set_position([0.0, 3.0, 0.0]);
    let a = scene.add(body);
    let f = scene.add(floor_block([0.0, 0.0, 0.0]));

    let mut landed = false;
    for _ in 0..30 {
        scene.tick();
        if scene[a].collides_with_on(f, Side::Bottom) {
            landed = true;
            break;
        }
    }
    assert!(landed, "never landed: {:?}", scene[a].position());

    // first tick after landing the contact stops the fall
    for _ in 0..20 {
        scene.tick();
        assert!(scene[a].is_colliding());
        assert!(scene[a].collides_with_on(f, Side::Bottom));
        assert!(scene[a].collides_with(f));
        assert!(!scene[a].collides_on(Side::Top));
        assert_eq!(scene[a].velocity().y, 0.0);
        assert!((scene[a].position().y - 1.0).abs() < 1e-5);
    }

    // the floor never ticks
    assert_eq!(scene[f].position(), Vec3::zero());
    assert!(!scene[f].is_colliding());
}

#[test]
fn test_equal_mass_push_swaps_velocities() {
    let mut scene = Scene::new();
    let mut a = frictionless([0.0, 0.0, 0.0], [0.75, 0.0, 0.0]);
    let mut b = frictionless([1.5, 0.0, 0.0], [0.0, 0.0, 0.0]);
    a.set_pushable(true);
    b.set_pushable(true);
    let a = scene.add(a);
    let b = scene.add(b);

    scene.tick();
    assert!(scene[a].collides_with_on(b, Side::Right));
    assert!(scene[b].collides_with_on(a, Side::Left));
    // a was moved back flush against b
    assert_eq!(scene[a].position().x, 0.5);
    assert_eq!(scene[a].velocity().x, 0.75);

    scene.tick();
    assert_eq!(scene[a].velocity().x, 0.0);
    assert_eq!(scene[b].velocity().x, 0.75);
    assert_eq!(scene[a].position().x, 0.5);
    assert_eq!(scene[b].position().x, 2.25);
}

#[test]
fn test_head_on_push_conserves_momentum() {
    for reversed in [false, true] {
        let mut scene = Scene::new();
        let mut a = frictionless([0.0, 0.0, 0.0], [0.5, 0.0, 0.0]);
        let mut b = frictionless([1.5, 0.0, 0.0], [-0.25, 0.0, 0.0]);
        a.set_pushable(true);
        a.set_mass(2.0).unwrap();
        b.set_pushable(true);
        let (a, b) = if reversed {
            let b = scene.add(b);
            (scene.add(a), b)
        } else {
            let a = scene.add(a);
            (a, scene.add(b))
        };

        let momentum = |scene: &Scene| {
            scene[a].mass() * scene[a].velocity().x + scene[b].mass() * scene[b].velocity().x
        };
        let before = momentum(&scene);
        scene.tick();
        assert!(scene[a].is_colliding() && scene[b].is_colliding());
        scene.tick();

        // (1/3)(0.5) + (2/3)(-0.25) and (-1/3)(-0.25) + (4/3)(0.5)
        assert!(scene[a].velocity().x.abs() < 1e-6);
        assert!((scene[b].velocity().x - 0.75).abs() < 1e-6);
        assert!((momentum(&scene) - before).abs() < 1e-5);
    }
}

#[test]
fn test_edge_touch_does_not_collide() {
    let mut scene = Scene::new();
    let a = scene.add(frictionless([0.0, 0.0, 0.0], [0.0, 0.0, 0.0]));
    let b = scene.add(frictionless([1.0, 1.0, 0.0], [0.0, 0.0, 0.0]));
    scene.tick();
    for key in [a, b] {
        assert!(!scene[key].is_colliding());
        assert!(!scene[key].is_overlapping());
        for side in SIDES {
            assert!(!scene[key].collides_on(side));
        }
    }
    assert_eq!(scene[a].position(), Vec3::zero());
    assert_eq!(scene[b].position(), Vec3::new(1.0, 1.0, 0.0));
}

#[test]
fn test_face_touch_registers_without_moving() {
    let mut scene = Scene::new();
    let a = scene.add(frictionless([0.0, 0.0, 0.0], [0.0, 0.0, 0.0]));
    let b = scene.add(frictionless([1.0, 0.0, 0.0], [0.0, 0.0, 0.0]));
    scene.tick();
    assert!(scene[a].collides_with_on(b, Side::Right));
    assert!(scene[b].collides_with_on(a, Side::Left));
    assert_eq!(scene[a].position(), Vec3::zero());
    assert_eq!(scene[b].position(), Vec3::new(1.0, 0.0, 0.0));
}

#[test]
fn test_non_collidable_overlaps() {
    let mut scene = Scene::new();
    let mut ghost = frictionless([0.0, 0.0, 0.0], [0.25, 0.0, 0.0]);
    ghost.set_collidable(false);
    let ghost = scene.add(ghost);
    let wall = scene.add(frictionless([0.5, 0.0, 0.0], [0.0, 0.0, 0.0]));

    scene.tick();
    assert!(scene[ghost].is_overlapping());
    assert!(!scene[ghost].is_colliding());
    assert!(scene[wall].is_overlapping());
    assert!(!scene[wall].collides_with(ghost));
    assert_eq!(scene[ghost].position().x, 0.25);

    // passes straight through
    for _ in 0..10 {
        scene.tick();
    }
    assert_eq!(scene[ghost].position().x, 2.75);
    assert!(!scene[ghost].is_overlapping());
}

#[test]
fn test_non_kinematic_never_moves() {
    let mut scene = Scene::new();
    let mut body = floor_block([0.0, 0.0, 0.0]);
    body.set_velocity([1.0, 1.0, 1.0]);
    let key = scene.add(body);
    for _ in 0..5 {
        scene.tick();
    }
    assert_eq!(scene[key].position(), Vec3::zero());
    assert_eq!(scene[key].velocity(), Vec3::new(1.0, 1.0, 1.0));
    assert_eq!(scene.ticks(), 5);
}

#[test]
fn test_remove_forgets_contacts() {
    let mut scene = Scene::new();
    let mut body = RigidBody::new();
    body.set_position([0.0, 1.0, 0.0]);
    let a = scene.add(body);
    let f = scene.add(floor_block([0.0, 0.0, 0.0]));
    scene.tick();
    assert!(scene[a].collides_with_on(f, Side::Bottom));

    let floor = scene.remove(f).unwrap();
    assert!(floor.key().is_none());
    assert!(!scene[a].collides_with(f));
    assert!(!scene.contains(f));
    assert!(scene.remove(f).is_none());
    assert_eq!(scene.keys(), &[a]);
    assert!(scene.tick_motion(f).is_err());
    assert!(scene.tick_collisions(f).is_err());

    // slot reuse hands out the same key again, but nothing refers to it
    let g = scene.add(floor_block([10.0, 0.0, 0.0]));
    assert_eq!(g, f);
    assert!(!scene[a].collides_with(g));
}

#[test]
fn test_keys_from_other_scenes_rejected() {
    let mut one = Scene::new();
    let mut two = Scene::new();
    let a = one.add(RigidBody::new());
    let b = two.add(RigidBody::new());
    assert_ne!(one.id(), two.id());
    assert_eq!(a.scene(), one.id());
    assert!(one.contains(a));
    assert!(!one.contains(b));
    assert!(one.get(b).is_none());
    assert!(one.tick_motion(b).is_err());
    assert!(one.tick_collisions(b).is_err());
    assert!(one.nearby(b, [1.0, 1.0, 1.0]).is_err());
    assert!(one.tick_motion(a).is_ok());
}

#[test]
fn test_moving_between_scenes() {
    let mut one = Scene::new();
    let mut two = Scene::new();
    let mut body = RigidBody::new();
    body.set_position([0.0, 1.0, 0.0]);
    let a = one.add(body);
    one.add(floor_block([0.0, 0.0, 0.0]));
    one.tick();
    assert!(one[a].is_colliding());

    let body = one.remove(a).unwrap();
    let b = two.add(body);
    assert_eq!(two[b].key(), Some(b));
    assert!(!two[b].is_colliding());
    assert!(!two[b].collides_on(Side::Bottom));
}

#[test]
fn test_per_body_phases() {
    let mut scene = Scene::new();
    let a = scene.add(frictionless([0.0, 0.0, 0.0], [0.75, 0.0, 0.0]));
    let b = scene.add(frictionless([1.5, 0.0, 0.0], [0.0, 0.0, 0.0]));
    scene.tick_motion(a).unwrap();
    assert_eq!(scene[a].position().x, 0.75);
    scene.tick_collisions(a).unwrap();
    assert_eq!(scene[a].position().x, 0.5);
    assert!(scene[a].collides_with_on(b, Side::Right));
    assert!(!scene[b].is_colliding());

    // not pushable, so the next integration stops a dead
    scene.tick_motion(a).unwrap();
    assert_eq!(scene[a].velocity().x, 0.0);
    assert_eq!(scene[b].velocity().x, 0.0);
}

#[test]
fn test_injections_run_before_motion() {
    let mut scene = Scene::new();
    let key = scene.add(frictionless([0.0, 0.0, 0.0], [0.0, 0.0, 0.0]));
    let runs = Rc::new(Cell::new(0));
    let injection = {
        let runs = Rc::clone(&runs);
        scene.add_injection(move |scene| {
            runs.set(runs.get() + 1);
            scene[key].set_velocity([0.5, 0.0, 0.0]);
        })
    };

    scene.tick();
    assert_eq!(runs.get(), 1);
    assert_eq!(scene[key].position().x, 0.5);
    scene.tick();
    assert_eq!(runs.get(), 2);
    assert_eq!(scene[key].position().x, 1.0);

    assert!(scene.remove_injection(injection));
    assert!(!scene.remove_injection(injection));
    scene.tick();
    assert_eq!(runs.get(), 2);
}

#[test]
fn test_injection_can_edit_scene() {
    let mut scene = Scene::new();
    let spawned = Rc::new(Cell::new(None));
    let runs = Rc::new(Cell::new(0));
    {
        let spawned = Rc::clone(&spawned);
        let runs = Rc::clone(&runs);
        let own_key = Rc::new(Cell::new(None));
        let own_key_inner = Rc::clone(&own_key);
        let key = scene.add_injection(move |scene| {
            runs.set(runs.get() + 1);
            spawned.set(Some(scene.add(RigidBody::new())));
            // a freshly added injection waits for the next tick
            scene.add_injection(|_| ());
            if let Some(key) = own_key_inner.get() {
                scene.remove_injection(key);
            }
        });
        own_key.set(Some(key));
    }

    scene.tick();
    assert_eq!(runs.get(), 1);
    assert_eq!(scene.len(), 1);
    let body = spawned.get().unwrap();
    // spawned before the motion pass, so it already fell
    assert!(scene[body].velocity().y < 0.0);

    scene.tick();
    assert_eq!(runs.get(), 1);
    assert_eq!(scene.len(), 1);
}

#[test]
fn test_nearby() {
    let mut scene = Scene::new();
    let center = scene.add(floor_block([0.0, 0.0, 0.0]));
    let close = scene.add(floor_block([2.0, 0.0, 0.0]));
    let far = scene.add(floor_block([5.0, 0.0, 0.0]));
    let above = scene.add(floor_block([0.0, 2.0, 0.0]));

    assert_eq!(scene.nearby(center, [2.0, 0.5, 0.5]).unwrap(), vec![close]);
    assert_eq!(scene.nearby(center, [2.0, 2.0, 0.5]).unwrap(), vec![close, above]);
    assert_eq!(scene.nearby(center, [10.0, 10.0, 10.0]).unwrap(), vec![close, far, above]);
    assert!(scene.nearby(center, [-1.0, 1.0, 1.0]).is_err());
}

#[test]
fn test_iteration_order_is_insertion_order() {
    let mut scene = Scene::new();
    let keys = (0..5)
        .map(|i| scene.add(floor_block([i as f32 * 3.0, 0.0, 0.0])))
        .collect::<Vec<_>>();
    scene.remove(keys[1]);
    let again = scene.add(floor_block([0.0, 9.0, 0.0]));
    let expected = vec![keys[0], keys[2], keys[3], keys[4], again];
    assert_eq!(scene.keys(), expected.as_slice());
    assert_eq!(scene.bodies().map(|(key, _)| key).collect::<Vec<_>>(), expected);
}

#[test]
fn test_non_pushable_does_not_push() {
    let mut scene = Scene::new();
    let a = scene.add(frictionless([0.0, 0.0, 0.0], [0.75, 0.0, 0.0]));
    let mut b = frictionless([1.5, 0.0, 0.0], [0.0, 0.0, 0.0]);
    b.set_pushable(true);
    let b = scene.add(b);

    scene.tick();
    assert!(scene[a].collides_with_on(b, Side::Right));
    scene.tick();
    assert_eq!(scene[a].velocity().x, 0.0);
    assert_eq!(scene[b].velocity().x, 0.0);
    assert_eq!(scene[b].position().x, 1.5);
}

#[test]
fn test_injection_refilling_freed_slot_waits() {
    let mut scene = Scene::new();
    let runs = Rc::new(Cell::new(0));
    let victim = Rc::new(Cell::new(None));
    {
        let runs = Rc::clone(&runs);
        let victim = Rc::clone(&victim);
        scene.add_injection(move |scene| {
            if let Some(key) = victim.take() {
                assert!(scene.remove_injection(key));
                let runs = Rc::clone(&runs);
                scene.add_injection(move |_| runs.set(runs.get() + 1));
            }
        });
    }
    victim.set(Some(scene.add_injection(|_| ())));

    scene.tick();
    assert_eq!(runs.get(), 0);
    scene.tick();
    assert_eq!(runs.get(), 1);
    scene.tick();
    assert_eq!(runs.get(), 2);
}

#[test]
fn test_made_non_kinematic_drops_contacts() {
    let mut scene = Scene::new();
    let mut body = RigidBody::new();
    body.set_position([0.0, 1.0, 0.0]);
    let a = scene.add(body);
    let f = scene.add(floor_block([0.0, 0.0, 0.0]));
    scene.tick();
    assert!(scene[a].collides_with_on(f, Side::Bottom));

    scene[a].set_kinematic(false);
    scene[f].set_position([100.0, 0.0, 0.0]);
    scene.tick();
    assert!(!scene[a].is_colliding());
    assert!(!scene[a].collides_with(f));
    for side in SIDES {
        assert!(scene[a].contacts(side).is_empty());
    }
}

#[test]
fn test_chain_push_depends_on_order() {
    // three pushable blocks in a row, leftmost starts moving into the others
    let run = |reversed: bool| {
        let mut scene = Scene::new();
        let mut bodies = (0..3)
            .map(|i| {
                let mut body = frictionless([i as f32, 0.0, 0.0], [0.0, 0.0, 0.0]);
                body.set_pushable(true);
                body
            })
            .collect::<Vec<_>>();
        if reversed {
            bodies.reverse();
        }
        let mut keys = bodies.into_iter().map(|body| scene.add(body)).collect::<Vec<_>>();
        if reversed {
            keys.reverse();
        }

        // face touches register contacts without moving anything
        scene.tick();
        assert!(scene[keys[1]].collides_with_on(keys[0], Side::Left));
        assert!(scene[keys[1]].collides_with_on(keys[2], Side::Right));

        scene[keys[0]].set_velocity([0.75, 0.0, 0.0]);
        scene.tick();
        keys.iter().map(|&key| scene[key].velocity().x).collect::<Vec<_>>()
    };

    // left to right: the middle block hands its new velocity on in the same pass
    assert_eq!(run(false), vec![0.0, 0.0, 0.75]);
    // right to left: the middle block already integrated before it was hit
    assert_eq!(run(true), vec![0.0, 0.75, 0.0]);
}
