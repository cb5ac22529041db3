//! Pending drawing primitives and their lowering to contours.
//!
//! Each payload carries just enough to rebuild the drawing intent at
//! flush time. Contour batches are already in device space; arcs,
//! rectangles and text runs keep the matrix that was current when they
//! were issued and are transformed while lowering.

use std::rc::Rc;

use crate::arc::Arc;
use crate::basics::{PointD, RectD, RectI};
use crate::contour::Contour;
use crate::curves::Flattener;
use crate::font::{Font, OutlineSink};
use crate::matrix::Matrix;
use crate::pixmap::Pixmap;

/// Reset hook for pooled payloads. Releases what the payload holds on
/// to without giving up the slot itself.
pub trait Recycle: Default {
    fn free(&mut self);
}

// ============================================================================
// Contour batch
// ============================================================================

/// Device-space contours committed by path building calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContourBatch {
    pub contours: Vec<Contour>,
}

impl ContourBatch {
    pub fn lower(&self, out: &mut Vec<Contour>) {
        out.extend(self.contours.iter().filter(|c| !c.is_empty()).cloned());
    }
}

impl Recycle for ContourBatch {
    fn free(&mut self) {
        // Keep the outer vector's capacity for the next batch.
        self.contours.clear();
    }
}

// ============================================================================
// Arc
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ArcPrimitive {
    pub arc: Arc,
    pub matrix: Matrix,
}

impl Default for ArcPrimitive {
    fn default() -> Self {
        Self {
            arc: Arc::circle(PointD::new(0.0, 0.0), 0.0),
            matrix: Matrix::IDENTITY,
        }
    }
}

impl ArcPrimitive {
    pub fn lower(&self, out: &mut Vec<Contour>) {
        out.push(self.arc.to_contour(&self.matrix));
    }
}

impl Recycle for ArcPrimitive {
    fn free(&mut self) {}
}

// ============================================================================
// Rectangle
// ============================================================================

/// Axis-aligned rectangle in user space. The corner radius is recorded
/// but not realized geometrically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RectPrimitive {
    pub v1: PointD,
    pub v2: PointD,
    pub radius: f64,
    pub matrix: Matrix,
}

impl RectPrimitive {
    pub fn lower(&self, out: &mut Vec<Contour>) {
        let mut c = Contour::rectangle(self.v1, self.v2);
        c.transform(&self.matrix);
        out.push(c);
    }

    /// Device rectangle when the matrix maps it onto one exactly (pure
    /// translation), `None` otherwise.
    pub fn device_rect(&self) -> Option<RectD> {
        if !self.matrix.is_translation_only() {
            return None;
        }
        let a = self.matrix.transform(self.v1);
        let b = self.matrix.transform(self.v2);
        let mut r = RectD::new(a.x, a.y, b.x, b.y);
        r.normalize();
        Some(r)
    }
}

impl Recycle for RectPrimitive {
    fn free(&mut self) {}
}

// ============================================================================
// Text run
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct TextRun {
    pub text: String,
    /// Baseline origin of the first glyph, in user space.
    pub origin: PointD,
    pub matrix: Matrix,
    pub font: Option<Rc<dyn Font>>,
}

impl TextRun {
    /// Outline every glyph through the run's matrix.
    pub fn lower(&self, flattener: &Flattener, out: &mut Vec<Contour>) {
        let font = match &self.font {
            Some(f) => f,
            None => return,
        };
        let mut pen_x = self.origin.x;
        for ch in self.text.chars() {
            let mut outliner = GlyphOutliner {
                matrix: &self.matrix,
                origin: PointD::new(pen_x, self.origin.y),
                flattener,
                current: Contour::new(),
                last: PointD::default(),
                out: &mut *out,
            };
            if font.outline(ch, &mut outliner) {
                outliner.finish();
            }
            pen_x += font.advance(ch);
        }
    }

    pub fn advance(&self) -> f64 {
        self.font
            .as_ref()
            .map_or(0.0, |f| f.text_width(&self.text))
    }
}

impl Recycle for TextRun {
    fn free(&mut self) {
        self.text.clear();
        self.font = None;
    }
}

/// Builds device-space contours from one glyph outline.
struct GlyphOutliner<'a> {
    matrix: &'a Matrix,
    origin: PointD,
    flattener: &'a Flattener,
    current: Contour,
    /// Last point, in device space.
    last: PointD,
    out: &'a mut Vec<Contour>,
}

impl GlyphOutliner<'_> {
    fn map(&self, p: PointD) -> PointD {
        self.matrix.transform(self.origin + p)
    }

    fn finish(&mut self) {
        if !self.current.is_empty() {
            let mut done = std::mem::take(&mut self.current);
            done.set_closed(true);
            self.out.push(done);
        }
    }
}

impl OutlineSink for GlyphOutliner<'_> {
    fn move_to(&mut self, p: PointD) {
        self.finish();
        self.last = self.map(p);
        self.current.push(self.last);
    }

    fn line_to(&mut self, p: PointD) {
        self.last = self.map(p);
        self.current.push(self.last);
    }

    fn quad_to(&mut self, c: PointD, p: PointD) {
        let (c, p) = (self.map(c), self.map(p));
        self.flattener.conic(self.last, c, p, &mut self.current);
        self.last = p;
    }

    fn cubic_to(&mut self, c1: PointD, c2: PointD, p: PointD) {
        let (c1, c2, p) = (self.map(c1), self.map(c2), self.map(p));
        self.flattener.cubic(self.last, c1, c2, p, &mut self.current);
        self.last = p;
    }

    fn close(&mut self) {
        self.finish();
    }
}

// ============================================================================
// Pixmap blit
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct PixmapBlit {
    pub pixmap: Option<Rc<Pixmap>>,
    pub source: RectI,
    /// Top-left destination, in device space before the window offset.
    pub dest: PointD,
    pub transparent: bool,
}

impl Recycle for PixmapBlit {
    fn free(&mut self) {
        self.pixmap = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontMetrics;

    /// Every glyph is a 4x8 box sitting on the baseline.
    #[derive(Debug)]
    struct BoxFont;

    impl Font for BoxFont {
        fn metrics(&self) -> FontMetrics {
            FontMetrics {
                ascent: 8.0,
                descent: 0.0,
                line_gap: 0.0,
            }
        }

        fn advance(&self, _ch: char) -> f64 {
            5.0
        }

        fn outline(&self, ch: char, sink: &mut dyn OutlineSink) -> bool {
            if ch == ' ' {
                return false;
            }
            sink.move_to(PointD::new(0.0, 0.0));
            sink.line_to(PointD::new(0.0, -8.0));
            sink.quad_to(PointD::new(2.0, -8.0), PointD::new(4.0, -8.0));
            sink.line_to(PointD::new(4.0, 0.0));
            sink.close();
            true
        }
    }

    #[test]
    fn test_batch_skips_empty_contours() {
        let mut batch = ContourBatch::default();
        batch.contours.push(Contour::new());
        batch
            .contours
            .push(Contour::rectangle(PointD::new(0.0, 0.0), PointD::new(1.0, 1.0)));
        let mut out = Vec::new();
        batch.lower(&mut out);
        assert_eq!(out.len(), 1);
        batch.free();
        assert!(batch.contours.is_empty());
    }

    #[test]
    fn test_rect_lowering_and_device_rect() {
        let r = RectPrimitive {
            v1: PointD::new(4.0, 4.0),
            v2: PointD::new(0.0, 0.0),
            radius: 2.0,
            matrix: Matrix::translation(10.0, 0.0),
        };
        let mut out = Vec::new();
        r.lower(&mut out);
        assert_eq!(out[0].first(), Some(PointD::new(14.0, 4.0)));
        assert_eq!(r.device_rect(), Some(RectD::new(10.0, 0.0, 14.0, 4.0)));

        let rotated = RectPrimitive {
            matrix: Matrix::rotation(10.0),
            ..r
        };
        assert_eq!(rotated.device_rect(), None);
    }

    #[test]
    fn test_text_run_lowering() {
        let run = TextRun {
            text: "a b".into(),
            origin: PointD::new(10.0, 20.0),
            matrix: Matrix::IDENTITY,
            font: Some(Rc::new(BoxFont)),
        };
        let mut out = Vec::new();
        run.lower(&Flattener::new(), &mut out);
        // The space has no outline
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].first(), Some(PointD::new(10.0, 20.0)));
        assert_eq!(out[1].first(), Some(PointD::new(20.0, 20.0)));
        assert!(out.iter().all(|c| c.is_closed() && c.is_fillable()));
        assert_eq!(run.advance(), 15.0);
    }

    #[test]
    fn test_text_run_free_releases_font() {
        let mut run = TextRun {
            text: "hello".into(),
            font: Some(Rc::new(BoxFont)),
            ..TextRun::default()
        };
        let cap = run.text.capacity();
        run.free();
        assert!(run.text.is_empty());
        assert_eq!(run.text.capacity(), cap);
        assert!(run.font.is_none());
        let mut out = Vec::new();
        run.lower(&Flattener::new(), &mut out);
        assert!(out.is_empty());
    }
}
