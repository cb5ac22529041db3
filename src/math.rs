//! Geometric math utilities.
//!
//! Distances and cross products used by the curve flattener and the arc
//! generator.

use crate::basics::PointD;

/// Coinciding points maximal distance (epsilon).
pub const VERTEX_DIST_EPSILON: f64 = 1e-14;

/// Cross product of `(b - a)` and `(c - a)`.
/// Positive when `c` lies to the left of `a -> b` in a y-up frame.
#[inline]
pub fn cross_product(a: PointD, b: PointD, c: PointD) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Euclidean distance between two points.
#[inline]
pub fn calc_distance(a: PointD, b: PointD) -> f64 {
    calc_sq_distance(a, b).sqrt()
}

/// Squared Euclidean distance between two points.
#[inline]
pub fn calc_sq_distance(a: PointD, b: PointD) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dx * dx + dy * dy
}

/// Unsigned distance from `p` to the infinite line through `a -> b`.
///
/// A degenerate line (length below `VERTEX_DIST_EPSILON`) measures the
/// distance to `a` instead.
#[inline]
pub fn calc_line_point_distance(a: PointD, b: PointD, p: PointD) -> f64 {
    let d = calc_distance(a, b);
    if d < VERTEX_DIST_EPSILON {
        return calc_distance(a, p);
    }
    (cross_product(a, b, p) / d).abs()
}

/// Shortest distance from `p` to the segment `a -> b`.
pub fn calc_segment_point_distance(a: PointD, b: PointD, p: PointD) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len2 = dx * dx + dy * dy;
    if len2 < VERTEX_DIST_EPSILON {
        return calc_distance(a, p);
    }
    let u = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
    calc_distance(PointD::new(a.x + u * dx, a.y + u * dy), p)
}

/// Signed area of a closed polygon (shoelace formula).
/// Positive for counter-clockwise order in a y-up frame.
pub fn calc_polygon_area(points: &[PointD]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    let mut prev = points[points.len() - 1];
    for &p in points {
        sum += prev.x * p.y - p.x * prev.y;
        prev = p;
    }
    sum * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> PointD {
        PointD::new(x, y)
    }

    #[test]
    fn test_distance() {
        assert!((calc_distance(p(0.0, 0.0), p(3.0, 4.0)) - 5.0).abs() < 1e-12);
        assert!((calc_sq_distance(p(0.0, 0.0), p(3.0, 4.0)) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_line_point_distance() {
        let d = calc_line_point_distance(p(0.0, 0.0), p(10.0, 0.0), p(5.0, 3.0));
        assert!((d - 3.0).abs() < 1e-12);
        // Degenerate line falls back to point distance
        let d = calc_line_point_distance(p(1.0, 1.0), p(1.0, 1.0), p(4.0, 5.0));
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_segment_point_distance_clamps() {
        let d = calc_segment_point_distance(p(0.0, 0.0), p(10.0, 0.0), p(13.0, 4.0));
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_polygon_area() {
        let square = [p(0.0, 0.0), p(2.0, 0.0), p(2.0, 2.0), p(0.0, 2.0)];
        assert!((calc_polygon_area(&square) - 4.0).abs() < 1e-12);
        let rev: Vec<_> = square.iter().rev().copied().collect();
        assert!((calc_polygon_area(&rev) + 4.0).abs() < 1e-12);
        assert_eq!(calc_polygon_area(&square[..2]), 0.0);
    }
}
