//! Axis-aligned box.

use crate::vector::VectorExt;
use anyhow::*;
use serde::{Serialize, Deserialize};
use vek::*;


/// Axis-aligned box, centered on its owner's position.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct AaBox {
    /// Box center position.
    pos: Vec3<f32>,
    /// Full width, height, and depth. Non-negative and finite.
    ext: Extent3<f32>,
}

impl AaBox {
    /// Unit cube centered at the origin.
    pub const UNIT_BOX: AaBox = AaBox {
        pos: Vec3 { x: 0.0, y: 0.0, z: 0.0 },
        ext: Extent3 { w: 1.0, h: 1.0, d: 1.0 },
    };

    /// Construct, rejecting negative or non-finite extents.
    pub fn new<E, V>(ext: E, pos: V) -> Result<Self>
    where
        E: Into<Extent3<f32>>,
        V: Into<Vec3<f32>>,
    {
        let ext = ext.into();
        check_extent(ext)?;
        Ok(AaBox {
            pos: pos.into(),
            ext,
        })
    }

    pub fn pos(&self) -> Vec3<f32> {
        self.pos
    }

    pub fn ext(&self) -> Extent3<f32> {
        self.ext
    }

    pub fn set_pos<V: Into<Vec3<f32>>>(&mut self, pos: V) {
        self.pos = pos.into();
    }

    /// Replace the extents. On error self is unchanged.
    pub fn set_ext<E: Into<Extent3<f32>>>(&mut self, ext: E) -> Result<()> {
        let ext = ext.into();
        check_extent(ext)?;
        self.ext = ext;
        Ok(())
    }

    fn half_ext(&self) -> Vec3<f32> {
        Vec3::new(self.ext.w, self.ext.h, self.ext.d) * 0.5
    }

    /// Minimum corner.
    pub fn min(&self) -> Vec3<f32> {
        self.pos - self.half_ext()
    }

    /// Maximum corner.
    pub fn max(&self) -> Vec3<f32> {
        self.pos + self.half_ext()
    }

    /// Translate self by `v`.
    pub fn translate<V: Into<Vec3<f32>>>(mut self, v: V) -> Self {
        self.pos += v.into();
        self
    }

    /// Do the closed intervals of self and `rhs` intersect on every axis?
    ///
    /// Boxes that merely share a face count as overlapping here.
    pub fn overlaps(&self, rhs: &AaBox) -> bool {
        let (min, max) = (self.min(), self.max());
        let (rhs_min, rhs_max) = (rhs.min(), rhs.max());
        for i in 0..3 {
            if min[i] > rhs_max[i] || max[i] < rhs_min[i] {
                return false;
            }
        }
        true
    }
}

impl Default for AaBox {
    fn default() -> Self {
        AaBox::UNIT_BOX
    }
}

fn check_extent(ext: Extent3<f32>) -> Result<()> {
    let v = Vec3::new(ext.w, ext.h, ext.d);
    ensure!(
        v.all_finite() && v.all_non_negative(),
        "box extents must be finite and non-negative, got {:?}",
        ext,
    );
    Ok(())
}


#[test]
fn test_min_max() {
    let b = AaBox::new([2.0, 4.0, 1.0], [1.0, 0.0, -1.0]).unwrap();
    assert_eq!(b.min(), Vec3::new(0.0, -2.0, -1.5));
    assert_eq!(b.max(), Vec3::new(2.0, 2.0, -0.5));
    assert_eq!(b.translate([1.0, 1.0, 1.0]).min(), Vec3::new(1.0, -1.0, -0.5));
}

#[test]
fn test_reject_bad_extent() {
    assert!(AaBox::new([1.0, -1.0, 1.0], [0.0, 0.0, 0.0]).is_err());
    assert!(AaBox::new([1.0, f32::NAN, 1.0], [0.0, 0.0, 0.0]).is_err());
    assert!(AaBox::new([0.0, 0.0, 0.0], [0.0, 0.0, 0.0]).is_ok());

    let mut b = AaBox::UNIT_BOX;
    assert!(b.set_ext([1.0, 1.0, -0.5]).is_err());
    assert_eq!(b, AaBox::UNIT_BOX);
}

#[test]
fn test_overlap_symmetry() {
    let a = AaBox::new([1.0, 2.0, 1.0], [0.0, 0.0, 0.0]).unwrap();
    let mut n = 0;
    for x in -6..=6 {
        for y in -6..=6 {
            for z in -3..=3 {
                let b = AaBox::new(
                    [0.5, 1.0, 1.5],
                    [x as f32 * 0.25, y as f32 * 0.25, z as f32 * 0.5],
                ).unwrap();
                assert_eq!(a.overlaps(&b), b.overlaps(&a));
                if a.overlaps(&b) {
                    n += 1;
                }
            }
        }
    }
    // make sure the grid actually hit both cases
    assert!(n > 0);
    assert!(n < 13 * 13 * 7);
}

#[test]
fn test_touching_faces_overlap() {
    let a = AaBox::UNIT_BOX;
    let b = AaBox::UNIT_BOX.translate([1.0, 0.0, 0.0]);
    assert!(a.overlaps(&b));
    let c = AaBox::UNIT_BOX.translate([1.0, 1.0, 0.0]);
    assert!(a.overlaps(&c));
    let d = AaBox::UNIT_BOX.translate([1.25, 0.0, 0.0]);
    assert!(!a.overlaps(&d));
}
