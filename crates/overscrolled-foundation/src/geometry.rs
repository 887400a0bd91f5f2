//! Geometric primitives for overscroll: Offset, Velocity

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use overscrolled_animation::{Lerp, SpringScalar};

use crate::scrollable::Orientation;

/// 2D displacement in pixels. The zero vector is the rest state of an
/// overscroll gesture.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Offset {
    pub x: f32,
    pub y: f32,
}

impl Offset {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const ZERO: Offset = Offset { x: 0.0, y: 0.0 };

    /// Scalar component along the given orientation's main axis.
    pub fn along(&self, orientation: Orientation) -> f32 {
        match orientation {
            Orientation::Horizontal => self.x,
            Orientation::Vertical => self.y,
        }
    }

    /// Euclidean length.
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Offset {
    fn add_assign(&mut self, rhs: Offset) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Offset {
    type Output = Offset;

    fn sub(self, rhs: Offset) -> Offset {
        Offset::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Offset {
    type Output = Offset;

    fn neg(self) -> Offset {
        Offset::new(-self.x, -self.y)
    }
}

impl Mul<f32> for Offset {
    type Output = Offset;

    fn mul(self, factor: f32) -> Offset {
        Offset::new(self.x * factor, self.y * factor)
    }
}

impl Lerp for Offset {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        Offset::new(
            self.x + (target.x - self.x) * fraction,
            self.y + (target.y - self.y) * fraction,
        )
    }
}

impl SpringScalar for Offset {
    /// Projects onto the distance-from-origin axis; the settle-back spring
    /// runs along the segment from the current offset to zero, so magnitude
    /// is the natural scalar for progress normalization.
    fn to_f32(&self) -> f32 {
        self.magnitude()
    }
}

/// 2D velocity in pixels per second, as released by a fling gesture.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

impl Velocity {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const ZERO: Velocity = Velocity { x: 0.0, y: 0.0 };

    /// Scalar component along the given orientation's main axis.
    pub fn along(&self, orientation: Orientation) -> f32 {
        match orientation {
            Orientation::Horizontal => self.x,
            Orientation::Vertical => self.y,
        }
    }
}
