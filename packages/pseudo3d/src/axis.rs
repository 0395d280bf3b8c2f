//! Axes, poles, and the six sides of an axis-aligned box.

use std::ops::{
    Index,
    IndexMut,
    Neg,
};


macro_rules! axis_enum {
    (
        $(#[$attr:meta])*
        $name:ident,
        $num_constant:ident = $num:expr,
        $per_name:ident,
        $all_constant:ident,
        ($(
            $variant:ident,
        )*),
    )=>{
        $(#[$attr])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(u8)]
        pub enum $name {$(
            $variant,
        )*}

        pub const $num_constant: usize = $num;

        /// One value per variant, indexable by the variant.
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
        pub struct $per_name<T>(pub [T; $num_constant]);

        /// All variants, in declaration order.
        pub const $all_constant: [$name; $num_constant] = [$(
            $name::$variant,
        )*];

        impl<T> Index<$name> for $per_name<T> {
            type Output = T;

            fn index(&self, i: $name) -> &Self::Output {
                &self.0[i as usize]
            }
        }

        impl<T> IndexMut<$name> for $per_name<T> {
            fn index_mut(&mut self, i: $name) -> &mut Self::Output {
                &mut self.0[i as usize]
            }
        }

        impl<T> $per_name<T> {
            pub fn iter(&self) -> impl Iterator<Item=&T> {
                self.0.iter()
            }

            pub fn iter_mut(&mut self) -> impl Iterator<Item=&mut T> {
                self.0.iter_mut()
            }

            pub fn map<B, F>(self, f: F) -> $per_name<B>
            where
                F: FnMut(T) -> B,
            {
                $per_name(self.0.map(f))
            }
        }

        impl<T: Clone> $per_name<T> {
            pub fn repeat(val: T) -> Self {
                $per_name(std::array::from_fn(|_| val.clone()))
            }
        }

        impl<T> IntoIterator for $per_name<T> {
            type Item = T;
            type IntoIter = <[T; $num_constant] as IntoIterator>::IntoIter;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }
    };
}

axis_enum!(
    /// Coordinate axis.
    Axis,
    NUM_AXES = 3,
    PerAxis,
    AXES,
    (
        X,
        Y,
        Z,
    ),
);

axis_enum!(
    /// Direction along an axis.
    Pole,
    NUM_POLES = 2,
    PerPole,
    POLES,
    (
        Neg,
        Pos,
    ),
);

axis_enum!(
    /// Directed face of a box. Doubles as the slot a touching peer is filed under.
    Side,
    NUM_SIDES = 6,
    PerSide,
    SIDES,
    (
        Left,
        Right,
        Bottom,
        Top,
        Back,
        Front,
    ),
);

impl Axis {
    /// The two axes orthogonal to self, in ascending order.
    pub const fn others(self) -> [Axis; 2] {
        match self {
            Axis::X => [Axis::Y, Axis::Z],
            Axis::Y => [Axis::X, Axis::Z],
            Axis::Z => [Axis::X, Axis::Y],
        }
    }
}

impl Pole {
    pub const fn to_f32(self) -> f32 {
        match self {
            Pole::Neg => -1.0,
            Pole::Pos => 1.0,
        }
    }

    /// Direction a scalar points in, or `None` for zero (and NaN).
    pub fn of_f32(n: f32) -> Option<Self> {
        if n > 0.0 {
            Some(Pole::Pos)
        } else if n < 0.0 {
            Some(Pole::Neg)
        } else {
            None
        }
    }
}

impl Neg for Pole {
    type Output = Self;

    fn neg(self) -> Self {
        match self {
            Pole::Neg => Pole::Pos,
            Pole::Pos => Pole::Neg,
        }
    }
}

impl Side {
    pub const fn to_axis_pole(self) -> (Axis, Pole) {
        match self {
            Side::Left => (Axis::X, Pole::Neg),
            Side::Right => (Axis::X, Pole::Pos),
            Side::Bottom => (Axis::Y, Pole::Neg),
            Side::Top => (Axis::Y, Pole::Pos),
            Side::Back => (Axis::Z, Pole::Neg),
            Side::Front => (Axis::Z, Pole::Pos),
        }
    }

    pub const fn from_axis_pole(axis: Axis, pole: Pole) -> Self {
        match (axis, pole) {
            (Axis::X, Pole::Neg) => Side::Left,
            (Axis::X, Pole::Pos) => Side::Right,
            (Axis::Y, Pole::Neg) => Side::Bottom,
            (Axis::Y, Pole::Pos) => Side::Top,
            (Axis::Z, Pole::Neg) => Side::Back,
            (Axis::Z, Pole::Pos) => Side::Front,
        }
    }

    pub const fn axis(self) -> Axis {
        self.to_axis_pole().0
    }

    pub const fn pole(self) -> Pole {
        self.to_axis_pole().1
    }
}

impl Neg for Side {
    type Output = Self;

    fn neg(self) -> Self {
        let (axis, pole) = self.to_axis_pole();
        Side::from_axis_pole(axis, -pole)
    }
}


#[test]
fn test_side_axis_pole() {
    for side in SIDES {
        let (axis, pole) = side.to_axis_pole();
        assert_eq!(Side::from_axis_pole(axis, pole), side);
        assert_eq!((-side).axis(), axis);
        assert_ne!(-side, side);
        assert_eq!(-(-side), side);
    }
    assert_eq!(-Side::Bottom, Side::Top);
    assert_eq!(-Side::Left, Side::Right);
    assert_eq!(-Side::Front, Side::Back);
}

#[test]
fn test_side_order_matches_index() {
    // contact iteration order depends on this
    assert_eq!(
        SIDES,
        [Side::Left, Side::Right, Side::Bottom, Side::Top, Side::Back, Side::Front],
    );
    let mut per = PerSide::repeat(0);
    per[Side::Top] = 3;
    assert_eq!(per.0, [0, 0, 0, 3, 0, 0]);
}

#[test]
fn test_axis_others() {
    for axis in AXES {
        let others = axis.others();
        assert!(!others.contains(&axis));
        assert_ne!(others[0], others[1]);
    }
}

#[test]
fn test_pole_of_f32() {
    assert_eq!(Pole::of_f32(0.5), Some(Pole::Pos));
    assert_eq!(Pole::of_f32(-0.5), Some(Pole::Neg));
    assert_eq!(Pole::of_f32(0.0), None);
    assert_eq!(Pole::of_f32(-0.0), None);
    assert_eq!(Pole::Neg.to_f32(), -1.0);
}
