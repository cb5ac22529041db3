//! Drawing state and the save/restore stack.
//!
//! [`SaveStack`] is never empty. `push` duplicates the top entry and
//! `pop` removes it again, except for the last one which stays put. The
//! painter keeps two of them: one of [`DrawState`] and one of
//! [`WindowState`](crate::window::WindowState).

use std::rc::Rc;

use crate::basics::PointD;
use crate::color::Color;
use crate::font::Font;
use crate::matrix::Matrix;

// ============================================================================
// Paint
// ============================================================================

/// Raster operation applied when pixels are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Operator {
    /// Overwrite with the paint color.
    #[default]
    Copy,
    /// Write transparent black.
    Clear,
    /// Blend the paint color over the destination by its alpha.
    Source,
    /// Invert the destination color.
    Not,
    /// XOR the destination with the paint color.
    Xor,
    /// Write opaque white.
    Set,
}

/// Fill paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brush {
    pub color: Color,
}

impl Brush {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Default for Brush {
    fn default() -> Self {
        Self::new(Color::BLACK)
    }
}

impl From<Color> for Brush {
    fn from(color: Color) -> Self {
        Self::new(color)
    }
}

/// Stroke paint and width in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    pub color: Color,
    pub width: f64,
}

impl Pen {
    pub fn new(color: Color, width: f64) -> Self {
        Self { color, width }
    }
}

impl Default for Pen {
    fn default() -> Self {
        Self::new(Color::BLACK, 1.0)
    }
}

// ============================================================================
// DrawState
// ============================================================================

/// One level of the drawing state stack.
#[derive(Debug, Clone, Default)]
pub struct DrawState {
    /// Current point, in user space.
    pub position: PointD,
    pub matrix: Matrix,
    pub oper: Operator,
    pub font: Option<Rc<dyn Font>>,
    pub brush: Brush,
    pub pen: Pen,
}

impl PartialEq for DrawState {
    fn eq(&self, other: &Self) -> bool {
        let same_font = match (&self.font, &other.font) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_font
            && self.position == other.position
            && self.matrix == other.matrix
            && self.oper == other.oper
            && self.brush == other.brush
            && self.pen == other.pen
    }
}

// ============================================================================
// SaveStack
// ============================================================================

/// Stack of states with a floor of one entry.
#[derive(Debug, Clone)]
pub struct SaveStack<T: Clone> {
    items: Vec<T>,
}

impl<T: Clone> SaveStack<T> {
    pub fn new(base: T) -> Self {
        Self::with_capacity(base, 1)
    }

    pub fn with_capacity(base: T, capacity: usize) -> Self {
        let mut items = Vec::with_capacity(capacity.max(1));
        items.push(base);
        Self { items }
    }

    /// Duplicate the top entry.
    pub fn push(&mut self) {
        let top = self.top().clone();
        self.items.push(top);
    }

    /// Drop the top entry. The last entry is never removed; returns
    /// `false` in that case.
    pub fn pop(&mut self) -> bool {
        if self.items.len() > 1 {
            self.items.pop();
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn top(&self) -> &T {
        // The floor of one entry keeps this in bounds.
        &self.items[self.items.len() - 1]
    }

    #[inline]
    pub fn top_mut(&mut self) -> &mut T {
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    pub fn depth(&self) -> usize {
        self.items.len()
    }

    /// Capacity hint; no observable effect.
    pub fn reserve(&mut self, additional: usize) {
        self.items.reserve(additional);
    }

    /// Drop everything above the bottom entry and replace it with `base`.
    pub fn reset(&mut self, base: T) {
        self.items.truncate(1);
        self.items[0] = base;
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T: Clone + Default> Default for SaveStack<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
