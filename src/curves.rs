//! Bézier curve flattening.
//!
//! Quadratic ("conic") and cubic segments are approximated by straight
//! chords through recursive midpoint subdivision. A piece is accepted as
//! flat once every control point lies within the tolerance of its chord
//! segment. The piece stays inside the hull of its control points, so it
//! is then within the tolerance of the chord too, even when a control
//! point is collinear but past the chord's ends.
//! Subdivision stops at a fixed depth no matter what, so degenerate or
//! non-finite control points still terminate with a chord.

use crate::basics::PointD;
use crate::contour::Contour;
use crate::math::calc_segment_point_distance;

/// Default flattening tolerance, in device pixels.
pub const DEFAULT_FLATNESS: f64 = 0.25;

/// Default subdivision depth ceiling.
pub const DEFAULT_RECURSION_LIMIT: u32 = 16;

/// Recursive curve subdivider.
///
/// The flattener never emits the start point of a segment: the caller's
/// contour already ends there. It appends the interior chord ends and
/// finally the segment's end point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flattener {
    tolerance: f64,
    max_depth: u32,
}

impl Flattener {
    pub fn new() -> Self {
        Self {
            tolerance: DEFAULT_FLATNESS,
            max_depth: DEFAULT_RECURSION_LIMIT,
        }
    }

    pub fn with_tolerance(tolerance: f64, max_depth: u32) -> Self {
        let mut f = Self::new();
        f.set_tolerance(tolerance);
        f.set_max_depth(max_depth);
        f
    }

    /// Maximum control point distance from the chord, in device pixels.
    /// Non-positive or non-finite values fall back to the default.
    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.tolerance = if tolerance.is_finite() && tolerance > 0.0 {
            tolerance
        } else {
            DEFAULT_FLATNESS
        };
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn set_max_depth(&mut self, depth: u32) {
        self.max_depth = depth;
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    // ========================================================================
    // Quadratic
    // ========================================================================

    /// Append a quadratic from `p1` through control `p2` to `p3`.
    pub fn conic(&self, p1: PointD, p2: PointD, p3: PointD, out: &mut Contour) {
        self.recursive_conic(p1, p2, p3, 0, out);
    }

    fn recursive_conic(&self, p1: PointD, p2: PointD, p3: PointD, depth: u32, out: &mut Contour) {
        // A failed comparison (NaN) keeps subdividing until the ceiling.
        if depth >= self.max_depth || calc_segment_point_distance(p1, p3, p2) <= self.tolerance {
            out.push(p3);
            return;
        }

        let p12 = p1.mid(p2);
        let p23 = p2.mid(p3);
        let p123 = p12.mid(p23);

        self.recursive_conic(p1, p12, p123, depth + 1, out);
        self.recursive_conic(p123, p23, p3, depth + 1, out);
    }

    // ========================================================================
    // Cubic
    // ========================================================================

    /// Append a cubic from `p1` through controls `p2`, `p3` to `p4`.
    pub fn cubic(&self, p1: PointD, p2: PointD, p3: PointD, p4: PointD, out: &mut Contour) {
        self.recursive_cubic(p1, p2, p3, p4, 0, out);
    }

    fn recursive_cubic(
        &self,
        p1: PointD,
        p2: PointD,
        p3: PointD,
        p4: PointD,
        depth: u32,
        out: &mut Contour,
    ) {
        if depth >= self.max_depth
            || (calc_segment_point_distance(p1, p4, p2) <= self.tolerance
                && calc_segment_point_distance(p1, p4, p3) <= self.tolerance)
        {
            out.push(p4);
            return;
        }

        let p12 = p1.mid(p2);
        let p23 = p2.mid(p3);
        let p34 = p3.mid(p4);
        let p123 = p12.mid(p23);
        let p234 = p23.mid(p34);
        let p1234 = p123.mid(p234);

        self.recursive_cubic(p1, p12, p123, p1234, depth + 1, out);
        self.recursive_cubic(p1234, p234, p34, p4, depth + 1, out);
    }
}

impl Default for Flattener {
    fn default() -> Self {
        Self::new()
    }
}

/// Point on a quadratic at parameter `t`.
pub fn conic_point(p1: PointD, p2: PointD, p3: PointD, t: f64) -> PointD {
    let mt = 1.0 - t;
    p1 * (mt * mt) + p2 * (2.0 * mt * t) + p3 * (t * t)
}

/// Point on a cubic at parameter `t`.
pub fn cubic_point(p1: PointD, p2: PointD, p3: PointD, p4: PointD, t: f64) -> PointD {
    let mt = 1.0 - t;
    p1 * (mt * mt * mt) + p2 * (3.0 * mt * mt * t) + p3 * (3.0 * mt * t * t) + p4 * (t * t * t)
}
