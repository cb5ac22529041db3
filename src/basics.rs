//! Foundation types shared by every stage of the painter.
//!
//! Rounding helpers, the generic point and rectangle types, the filling
//! rule and angle conversions. Nothing in here depends on any other
//! module of the crate.

use core::ops::{Add, AddAssign, Mul, Neg, Sub};

// ============================================================================
// Rounding and conversion functions
// ============================================================================

/// Round to the nearest integer (half away from zero).
#[inline]
pub fn iround(v: f64) -> i32 {
    if v < 0.0 {
        (v - 0.5) as i32
    } else {
        (v + 0.5) as i32
    }
}

/// Floor toward negative infinity.
#[inline]
pub fn ifloor(v: f64) -> i32 {
    let i = v as i32;
    i - (i as f64 > v) as i32
}

/// Ceiling as a signed integer.
#[inline]
pub fn iceil(v: f64) -> i32 {
    v.ceil() as i32
}

// ============================================================================
// Filling rule
// ============================================================================

/// Rule deciding whether an accumulated winding number counts as inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillingRule {
    /// Inside while the winding number is non-zero.
    #[default]
    NonZero,
    /// Inside while the winding number is odd.
    EvenOdd,
}

impl FillingRule {
    #[inline]
    pub fn is_inside(self, winding: i32) -> bool {
        match self {
            FillingRule::NonZero => winding != 0,
            FillingRule::EvenOdd => winding & 1 != 0,
        }
    }
}

// ============================================================================
// Angles
// ============================================================================

pub const PI: f64 = std::f64::consts::PI;

#[inline]
pub fn deg2rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

#[inline]
pub fn rad2deg(rad: f64) -> f64 {
    rad * 180.0 / PI
}

// ============================================================================
// Point
// ============================================================================

/// A 2D point or vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PointBase<T: Copy> {
    pub x: T,
    pub y: T,
}

impl<T: Copy> PointBase<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: Copy + Add<Output = T>> Add for PointBase<T> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<T: Copy + Add<Output = T>> AddAssign for PointBase<T> {
    fn add_assign(&mut self, rhs: Self) {
        self.x = self.x + rhs.x;
        self.y = self.y + rhs.y;
    }
}

impl<T: Copy + Sub<Output = T>> Sub for PointBase<T> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<T: Copy + Neg<Output = T>> Neg for PointBase<T> {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<f64> for PointD {
    type Output = PointD;
    fn mul(self, k: f64) -> PointD {
        PointD::new(self.x * k, self.y * k)
    }
}

impl PointD {
    /// Midpoint between `self` and `other`.
    #[inline]
    pub fn mid(self, other: PointD) -> PointD {
        PointD::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    /// Round both coordinates to the nearest device pixel.
    #[inline]
    pub fn round(self) -> PointI {
        PointI::new(iround(self.x), iround(self.y))
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<PointI> for PointD {
    fn from(p: PointI) -> Self {
        PointD::new(p.x as f64, p.y as f64)
    }
}

pub type PointI = PointBase<i32>;
pub type PointD = PointBase<f64>;

// ============================================================================
// Rect
// ============================================================================

/// A rectangle defined by two corner points.
///
/// Integer rectangles used for device output are half-open:
/// `x1..x2` by `y1..y2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect<T: Copy> {
    pub x1: T,
    pub y1: T,
    pub x2: T,
    pub y2: T,
}

impl<T: Copy + PartialOrd> Rect<T> {
    pub fn new(x1: T, y1: T, x2: T, y2: T) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Normalize so that x1 <= x2 and y1 <= y2, swapping if needed.
    pub fn normalize(&mut self) -> &Self {
        if self.x1 > self.x2 {
            core::mem::swap(&mut self.x1, &mut self.x2);
        }
        if self.y1 > self.y2 {
            core::mem::swap(&mut self.y1, &mut self.y2);
        }
        self
    }

    /// Clip this rectangle to the intersection with `r`.
    /// Returns `true` if anything is left.
    pub fn clip(&mut self, r: &Self) -> bool {
        if self.x2 > r.x2 {
            self.x2 = r.x2;
        }
        if self.y2 > r.y2 {
            self.y2 = r.y2;
        }
        if self.x1 < r.x1 {
            self.x1 = r.x1;
        }
        if self.y1 < r.y1 {
            self.y1 = r.y1;
        }
        self.x1 < self.x2 && self.y1 < self.y2
    }

    /// `true` if the rectangle encloses a non-empty area.
    pub fn is_empty(&self) -> bool {
        !(self.x1 < self.x2 && self.y1 < self.y2)
    }

    /// `true` if this rectangle overlaps `r` with non-zero area.
    pub fn overlaps(&self, r: &Self) -> bool {
        self.x1 < r.x2 && r.x1 < self.x2 && self.y1 < r.y2 && r.y1 < self.y2
    }
}

impl RectI {
    #[inline]
    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x < self.x2 && y >= self.y1 && y < self.y2
    }

    /// Shift by `(dx, dy)`.
    pub fn translated(&self, dx: i32, dy: i32) -> RectI {
        RectI::new(self.x1 + dx, self.y1 + dy, self.x2 + dx, self.y2 + dy)
    }
}

pub type RectI = Rect<i32>;
pub type RectD = Rect<f64>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iround() {
        assert_eq!(iround(0.5), 1);
        assert_eq!(iround(0.49), 0);
        assert_eq!(iround(-0.5), -1);
        assert_eq!(iround(-1.5), -2);
    }

    #[test]
    fn test_ifloor_iceil() {
        assert_eq!(ifloor(1.7), 1);
        assert_eq!(ifloor(-1.7), -2);
        assert_eq!(ifloor(-1.0), -1);
        assert_eq!(iceil(1.1), 2);
        assert_eq!(iceil(-1.1), -1);
    }

    #[test]
    fn test_filling_rule() {
        assert!(FillingRule::NonZero.is_inside(2));
        assert!(!FillingRule::NonZero.is_inside(0));
        assert!(!FillingRule::EvenOdd.is_inside(2));
        assert!(FillingRule::EvenOdd.is_inside(-1));
        assert_eq!(FillingRule::default(), FillingRule::NonZero);
    }

    #[test]
    fn test_point_ops() {
        let a = PointD::new(1.0, 2.0);
        let b = PointD::new(3.0, 5.0);
        assert_eq!(a + b, PointD::new(4.0, 7.0));
        assert_eq!(b - a, PointD::new(2.0, 3.0));
        assert_eq!(a * 2.0, PointD::new(2.0, 4.0));
        assert_eq!(a.mid(b), PointD::new(2.0, 3.5));
        assert_eq!(PointD::new(1.6, -1.6).round(), PointI::new(2, -2));
    }

    #[test]
    fn test_rect_normalize_and_clip() {
        let mut r = RectI::new(30, 40, 10, 20);
        r.normalize();
        assert_eq!(r, RectI::new(10, 20, 30, 40));
        assert!(r.clip(&RectI::new(15, 0, 100, 25)));
        assert_eq!(r, RectI::new(15, 20, 30, 25));
        assert!(!r.clip(&RectI::new(50, 50, 60, 60)));
    }

    #[test]
    fn test_rect_half_open() {
        let r = RectI::new(0, 0, 10, 10);
        assert!(r.contains(9, 9));
        assert!(!r.contains(10, 5));
        assert_eq!(r.width(), 10);
        assert!(!r.overlaps(&RectI::new(10, 0, 20, 10)));
        assert!(r.overlaps(&RectI::new(9, 9, 20, 20)));
        assert!(RectI::new(5, 5, 5, 9).is_empty());
    }
}
