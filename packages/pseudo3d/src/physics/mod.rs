//! Rigid body state and the two per-tick phases that move it.
//!
//! - `motion` integrates a body's velocity and position, reacting to the contacts left over from
//!   the previous collision pass.
//! - `collision` detects overlaps and pushes a body back out.
//!
//! Both are methods on [`RigidBody`](body::RigidBody) which see only one body at a time. The
//! scene feeds them snapshots of the peers involved.

pub mod aa_box;
pub mod body;
pub mod motion;
pub mod collision;


pub mod prelude {
    pub use super::{
        aa_box::AaBox,
        body::RigidBody,
        motion::elastic_exchange,
    };
}
