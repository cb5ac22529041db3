//! Contours: the only geometry the rasterizer understands.
//!
//! A contour is an ordered sequence of device-space points. For filling
//! it is always treated as closed (the last point connects back to the
//! first). The `closed` flag only matters for stroking: an open contour
//! strokes as a polyline, a closed one returns to its first point.

use crate::basics::{PointD, PointI, RectD};
use crate::matrix::Matrix;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contour {
    points: Vec<PointD>,
    closed: bool,
}

impl Contour {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            points: Vec::with_capacity(n),
            closed: false,
        }
    }

    /// A closed contour from a point list.
    pub fn from_points(points: Vec<PointD>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    /// Axis-aligned rectangle spanning two corners, clockwise on a y-down
    /// device starting at `v1`.
    pub fn rectangle(v1: PointD, v2: PointD) -> Self {
        Self::from_points(vec![
            v1,
            PointD::new(v2.x, v1.y),
            v2,
            PointD::new(v1.x, v2.y),
        ])
    }

    #[inline]
    pub fn push(&mut self, p: PointD) {
        self.points.push(p);
    }

    pub fn points(&self) -> &[PointD] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<PointD> {
        self.points.last().copied()
    }

    pub fn first(&self) -> Option<PointD> {
        self.points.first().copied()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn set_closed(&mut self, closed: bool) {
        self.closed = closed;
    }

    /// Fewer than three points enclose no area.
    pub fn is_fillable(&self) -> bool {
        self.points.len() >= 3
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.closed = false;
    }

    /// Bounding box, `None` for an empty contour.
    pub fn bounds(&self) -> Option<RectD> {
        let first = self.first()?;
        let mut r = RectD::new(first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            r.x1 = r.x1.min(p.x);
            r.y1 = r.y1.min(p.y);
            r.x2 = r.x2.max(p.x);
            r.y2 = r.y2.max(p.y);
        }
        Some(r)
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        for p in &mut self.points {
            p.x += dx;
            p.y += dy;
        }
    }

    pub fn transform(&mut self, m: &Matrix) {
        for p in &mut self.points {
            *p = m.transform(*p);
        }
    }

    /// Device pixel polyline for stroking. Closed contours repeat their
    /// first point at the end.
    pub fn to_polyline(&self) -> Vec<PointI> {
        let mut out: Vec<PointI> = self.points.iter().map(|p| p.round()).collect();
        if self.closed && self.points.len() > 1 {
            out.push(self.points[0].round());
        }
        out
    }
}

impl From<Vec<PointD>> for Contour {
    fn from(points: Vec<PointD>) -> Self {
        Self::from_points(points)
    }
}
