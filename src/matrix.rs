//! Affine transformation matrix.
//!
//! The current transform of a drawing state. Points issued by path
//! building calls are mapped through it into device space before they
//! are buffered, so flattening tolerances are measured in device pixels.

use crate::basics::{deg2rad, PointD};

/// Epsilon for matrix comparisons.
pub const MATRIX_EPSILON: f64 = 1e-14;

/// 2D affine transformation matrix.
///
/// ```text
///   | sx  shx tx |
///   | shy  sy ty |
///   |  0    0  1 |
/// ```
///
/// Transform: `x' = x*sx + y*shx + tx`, `y' = x*shy + y*sy + ty`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub sx: f64,
    pub shy: f64,
    pub shx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        sx: 1.0,
        shy: 0.0,
        shx: 0.0,
        sy: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn new(sx: f64, shy: f64, shx: f64, sy: f64, tx: f64, ty: f64) -> Self {
        Self {
            sx,
            shy,
            shx,
            sy,
            tx,
            ty,
        }
    }

    pub fn translation(x: f64, y: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    pub fn scaling(x: f64, y: f64) -> Self {
        Self::new(x, 0.0, 0.0, y, 0.0, 0.0)
    }

    /// Rotation by `degrees` (clockwise on a y-down device).
    pub fn rotation(degrees: f64) -> Self {
        let (sa, ca) = deg2rad(degrees).sin_cos();
        Self::new(ca, sa, -sa, ca, 0.0, 0.0)
    }

    // ====================================================================
    // Composition
    // ====================================================================

    /// `self = self * m`: `m` is applied after `self`.
    pub fn multiply(&mut self, m: &Matrix) -> &mut Self {
        let t0 = self.sx * m.sx + self.shy * m.shx;
        let t2 = self.shx * m.sx + self.sy * m.shx;
        let t4 = self.tx * m.sx + self.ty * m.shx + m.tx;
        self.shy = self.sx * m.shy + self.shy * m.sy;
        self.sy = self.shx * m.shy + self.sy * m.sy;
        self.ty = self.tx * m.shy + self.ty * m.sy + m.ty;
        self.sx = t0;
        self.shx = t2;
        self.tx = t4;
        self
    }

    /// `self = m * self`: `m` is applied before `self`.
    ///
    /// This is how the painter's `translate`/`scale`/`rotate` compose:
    /// the new operation acts in the current user space.
    pub fn premultiply(&mut self, m: &Matrix) -> &mut Self {
        let mut t = *m;
        t.multiply(self);
        *self = t;
        self
    }

    /// Invert in place. A singular matrix is left untouched and `false`
    /// is returned.
    pub fn invert(&mut self) -> bool {
        let det = self.determinant();
        if det.abs() < MATRIX_EPSILON {
            return false;
        }
        let d = 1.0 / det;
        let t0 = self.sy * d;
        self.sy = self.sx * d;
        self.shy = -self.shy * d;
        self.shx = -self.shx * d;
        let t4 = -self.tx * t0 - self.ty * self.shx;
        self.ty = -self.tx * self.shy - self.ty * self.sy;
        self.sx = t0;
        self.tx = t4;
        true
    }

    // ====================================================================
    // Application
    // ====================================================================

    #[inline]
    pub fn transform(&self, p: PointD) -> PointD {
        PointD::new(
            p.x * self.sx + p.y * self.shx + self.tx,
            p.x * self.shy + p.y * self.sy + self.ty,
        )
    }

    /// Transform a direction vector (no translation).
    #[inline]
    pub fn transform_vector(&self, v: PointD) -> PointD {
        PointD::new(v.x * self.sx + v.y * self.shx, v.x * self.shy + v.y * self.sy)
    }

    // ====================================================================
    // Queries
    // ====================================================================

    #[inline]
    pub fn determinant(&self) -> f64 {
        self.sx * self.sy - self.shy * self.shx
    }

    /// Average scale factor, used to pick arc subdivision density.
    pub fn scale_factor(&self) -> f64 {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let x = s * self.sx + s * self.shx;
        let y = s * self.shy + s * self.sy;
        (x * x + y * y).sqrt()
    }

    pub fn is_identity(&self) -> bool {
        self.is_translation_only()
            && self.tx.abs() < MATRIX_EPSILON
            && self.ty.abs() < MATRIX_EPSILON
    }

    /// `true` when the linear part is the identity.
    pub fn is_translation_only(&self) -> bool {
        (self.sx - 1.0).abs() < MATRIX_EPSILON
            && (self.sy - 1.0).abs() < MATRIX_EPSILON
            && self.shx.abs() < MATRIX_EPSILON
            && self.shy.abs() < MATRIX_EPSILON
    }

    /// `true` when axis-aligned rectangles stay axis-aligned.
    pub fn is_axis_aligned(&self) -> bool {
        self.shx.abs() < MATRIX_EPSILON && self.shy.abs() < MATRIX_EPSILON
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl core::ops::Mul for Matrix {
    type Output = Matrix;
    fn mul(self, rhs: Matrix) -> Matrix {
        let mut m = self;
        m.multiply(&rhs);
        m
    }
}
