//! Circular arc contour synthesis.
//!
//! Angles are in degrees, measured counter-clockwise on screen from the
//! positive x axis (0 is 3 o'clock, 90 is 12 o'clock). The angular span
//! is cut into equal steps whose size follows the device-space radius,
//! so small arcs get few points and large ones stay smooth. The number
//! of steps is bounded.

use crate::basics::{deg2rad, PointD, PI};
use crate::contour::Contour;
use crate::matrix::Matrix;

/// Default upper bound on the number of segments of one arc.
pub const DEFAULT_MAX_ARC_SEGMENTS: u32 = 256;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    center: PointD,
    radius: f64,
    angle1: f64,
    angle2: f64,
    pie: bool,
    scale: f64,
    max_segments: u32,
}

impl Arc {
    pub fn new(center: PointD, radius: f64, angle1: f64, angle2: f64, pie: bool) -> Self {
        Self {
            center,
            radius,
            angle1,
            angle2,
            pie,
            scale: 1.0,
            max_segments: DEFAULT_MAX_ARC_SEGMENTS,
        }
    }

    /// Full 360 degree arc without radii.
    pub fn circle(center: PointD, radius: f64) -> Self {
        Self::new(center, radius, 0.0, 360.0, false)
    }

    /// Set approximation scale (affects step size).
    pub fn set_approximation_scale(&mut self, s: f64) {
        self.scale = s;
    }

    pub fn approximation_scale(&self) -> f64 {
        self.scale
    }

    pub fn set_max_segments(&mut self, n: u32) {
        self.max_segments = n.max(1);
    }

    pub fn max_segments(&self) -> u32 {
        self.max_segments
    }

    pub fn center(&self) -> PointD {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn is_pie(&self) -> bool {
        self.pie
    }

    /// Signed sweep in radians, limited to one full turn.
    fn sweep(&self) -> f64 {
        deg2rad(self.angle2 - self.angle1).clamp(-2.0 * PI, 2.0 * PI)
    }

    /// Number of chords for the arc once mapped through `m`.
    ///
    /// Zero for an empty span or a degenerate radius.
    pub fn segment_count(&self, m: &Matrix) -> u32 {
        let sweep = self.sweep().abs();
        let ra = self.radius.abs() * m.scale_factor();
        let drawable = sweep > 0.0 && ra > 0.0 && ra.is_finite();
        if !drawable {
            return 0;
        }
        let scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        let da = (ra / (ra + 0.125 / scale)).acos() * 2.0;
        let n = if da > 0.0 { (sweep / da).ceil() } else { f64::INFINITY };
        n.clamp(1.0, self.max_segments as f64) as u32
    }

    /// Generate the arc through `m` into a device-space contour.
    ///
    /// A pie contour starts at the center and is closed; a plain arc is
    /// left open so it strokes as a curve and fills chord-closed.
    pub fn to_contour(&self, m: &Matrix) -> Contour {
        let n = self.segment_count(m);
        let mut c = Contour::with_capacity(n as usize + 2);
        if self.pie {
            c.push(m.transform(self.center));
        }

        let start = deg2rad(self.angle1);
        let sweep = self.sweep();
        for i in 0..=n {
            let a = if n == 0 {
                start
            } else {
                start + sweep * i as f64 / n as f64
            };
            let p = PointD::new(
                self.center.x + a.cos() * self.radius,
                self.center.y - a.sin() * self.radius,
            );
            c.push(m.transform(p));
        }
        c.set_closed(self.pie);
        c
    }
}
