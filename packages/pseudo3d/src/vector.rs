//! The 3-component vector every kinematic quantity is expressed in.
//!
//! This is just `vek::Vec3<f32>`, which is `Copy` and has value semantics, so "setters" are
//! functional: they return a new vector and leave the original alone.

use crate::axis::Axis;
use vek::*;


/// Position, velocity, acceleration, jerk, and the per-axis tunables.
pub type Vector = Vec3<f32>;

/// Per-axis functional access to a `Vector`.
pub trait VectorExt: Sized {
    /// Component on `axis`.
    fn axis(self, axis: Axis) -> f32;

    /// Copy of self with the component on `axis` replaced.
    fn with_axis(self, axis: Axis, val: f32) -> Self;

    fn with_x(self, x: f32) -> Self {
        self.with_axis(Axis::X, x)
    }

    fn with_y(self, y: f32) -> Self {
        self.with_axis(Axis::Y, y)
    }

    fn with_z(self, z: f32) -> Self {
        self.with_axis(Axis::Z, z)
    }

    /// No component is NaN or infinite.
    fn all_finite(self) -> bool;

    /// Every component is `>= 0`.
    fn all_non_negative(self) -> bool;
}

impl VectorExt for Vector {
    fn axis(self, axis: Axis) -> f32 {
        self[axis as usize]
    }

    fn with_axis(mut self, axis: Axis, val: f32) -> Self {
        self[axis as usize] = val;
        self
    }

    fn all_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    fn all_non_negative(self) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.z >= 0.0
    }
}


#[test]
fn test_with_axis_leaves_original() {
    let a = Vector::new(1.0, 2.0, 3.0);
    let b = a.with_y(-4.0);
    assert_eq!(a, Vector::new(1.0, 2.0, 3.0));
    assert_eq!(b, Vector::new(1.0, -4.0, 3.0));
    assert_eq!(b.axis(Axis::Y), -4.0);
    assert_eq!(a.with_x(0.0).with_z(0.0), Vector::new(0.0, 2.0, 0.0));
}

#[test]
fn test_vector_checks() {
    assert!(Vector::new(0.0, 0.5, 10.0).all_non_negative());
    assert!(!Vector::new(0.0, -0.5, 10.0).all_non_negative());
    assert!(Vector::new(-1.0, 0.5, 10.0).all_finite());
    assert!(!Vector::new(f32::NAN, 0.5, 10.0).all_finite());
    assert!(!Vector::new(0.0, f32::INFINITY, 10.0).all_finite());
}
