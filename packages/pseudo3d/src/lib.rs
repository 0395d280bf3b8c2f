//! Axis-aligned rigid body physics for pseudo-3D scenes.
//!
//! Bodies live in a [`Scene`](scene::Scene), which advances them one discrete tick at a time:
//! first every body integrates its motion, then every body detects and resolves its collisions
//! against the rest.

#[macro_use]
extern crate tracing;

pub mod axis;
pub mod vector;
pub mod physics;
pub mod scene;
pub mod settings;
pub mod logging;


/// Commonly needed types.
pub mod prelude {
    pub use crate::{
        axis::{
            Axis,
            Pole,
            Side,
            PerSide,
            SIDES,
        },
        vector::{
            Vector,
            VectorExt,
        },
        physics::prelude::*,
        scene::{
            Scene,
            SceneId,
            BodyKey,
            InjectionKey,
        },
        settings::PhysicsSettings,
    };
}
