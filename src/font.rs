//! Font boundary.
//!
//! The painter does not read font files. It holds an opaque, shared
//! [`Font`] handle and asks it for metrics, advances and glyph outlines
//! when a text run is flushed. Selecting a font goes through a
//! [`FontResolver`], which may fail.

use std::fmt;
use std::rc::Rc;

use crate::basics::PointD;
use crate::error::Result;

/// Receives a glyph outline.
///
/// Coordinates are in pixels relative to the glyph origin on the
/// baseline, y growing downward.
pub trait OutlineSink {
    fn move_to(&mut self, p: PointD);
    fn line_to(&mut self, p: PointD);
    fn quad_to(&mut self, c: PointD, p: PointD);
    fn cubic_to(&mut self, c1: PointD, c2: PointD, p: PointD);
    fn close(&mut self);
}

/// Vertical metrics of a sized font, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FontMetrics {
    /// Distance from the baseline up to the top of the tallest glyph.
    pub ascent: f64,
    /// Distance from the baseline down to the bottom of the lowest glyph.
    pub descent: f64,
    pub line_gap: f64,
}

impl FontMetrics {
    pub fn height(&self) -> f64 {
        self.ascent + self.descent
    }

    pub fn line_height(&self) -> f64 {
        self.height() + self.line_gap
    }
}

/// A selected, sized font.
pub trait Font: fmt::Debug {
    fn metrics(&self) -> FontMetrics;

    /// Horizontal advance of `ch`, in pixels.
    fn advance(&self, ch: char) -> f64;

    /// Emit the outline of `ch`. Returns `false` when the glyph has none
    /// (space, missing glyph).
    fn outline(&self, ch: char, sink: &mut dyn OutlineSink) -> bool;

    /// Sum of the advances of every char of `text`.
    fn text_width(&self, text: &str) -> f64 {
        text.chars().map(|ch| self.advance(ch)).sum()
    }
}

/// What a caller asks for when selecting a font.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    /// Pixel size (em height).
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            size,
            bold: false,
            italic: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

/// Turns a [`FontSpec`] into a usable font. Fallback policy lives here,
/// never in the painter.
pub trait FontResolver {
    fn resolve(&self, spec: &FontSpec) -> Result<Rc<dyn Font>>;
}
