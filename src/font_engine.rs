//! TrueType/OpenType fonts through `ttf-parser`.
//!
//! [`TtfFont`] implements the [`Font`] boundary from raw face bytes at a
//! given pixel size. Outlines are scaled to pixels and flipped so that
//! glyphs sit on the baseline in y-down device space. [`TtfFontResolver`]
//! maps family names to face bytes.

use std::collections::HashMap;
use std::rc::Rc;

use crate::basics::PointD;
use crate::error::{Error, Result};
use crate::font::{Font, FontMetrics, FontResolver, FontSpec, OutlineSink};

// ============================================================================
// TtfFont
// ============================================================================

#[derive(Clone)]
pub struct TtfFont {
    data: Rc<[u8]>,
    face_index: u32,
    /// Em height in pixels.
    size: f64,
}

impl std::fmt::Debug for TtfFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtfFont")
            .field("bytes", &self.data.len())
            .field("face_index", &self.face_index)
            .field("size", &self.size)
            .finish()
    }
}

impl TtfFont {
    /// Validate `data` as a font face and size it at `size` pixels.
    pub fn from_data(data: impl Into<Rc<[u8]>>, face_index: u32, size: f64) -> Result<Self> {
        let data = data.into();
        ttf_parser::Face::parse(&data, face_index)
            .map_err(|e| Error::FontData(format!("{:?}", e)))?;
        Ok(Self {
            data,
            face_index,
            size,
        })
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    /// Same face at another pixel size. The bytes are shared.
    pub fn with_size(&self, size: f64) -> Self {
        Self {
            size,
            ..self.clone()
        }
    }

    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, self.face_index).ok()
    }

    fn scale(&self, face: &ttf_parser::Face<'_>) -> f64 {
        self.size / face.units_per_em().max(1) as f64
    }
}

impl Font for TtfFont {
    fn metrics(&self) -> FontMetrics {
        let face = match self.face() {
            Some(f) => f,
            None => return FontMetrics::default(),
        };
        let scale = self.scale(&face);
        FontMetrics {
            ascent: face.ascender() as f64 * scale,
            descent: -(face.descender() as f64) * scale,
            line_gap: face.line_gap() as f64 * scale,
        }
    }

    fn advance(&self, ch: char) -> f64 {
        let face = match self.face() {
            Some(f) => f,
            None => return 0.0,
        };
        let scale = self.scale(&face);
        face.glyph_index(ch)
            .and_then(|id| face.glyph_hor_advance(id))
            .map_or(0.0, |a| a as f64 * scale)
    }

    fn outline(&self, ch: char, sink: &mut dyn OutlineSink) -> bool {
        let face = match self.face() {
            Some(f) => f,
            None => return false,
        };
        let id = match face.glyph_index(ch) {
            Some(id) => id,
            None => return false,
        };
        let mut collector = OutlineCollector {
            scale: self.scale(&face),
            sink,
        };
        face.outline_glyph(id, &mut collector).is_some()
    }
}

// ============================================================================
// OutlineCollector
// ============================================================================

/// Forwards `ttf-parser` outline commands in pixel units, y flipped.
struct OutlineCollector<'a> {
    scale: f64,
    sink: &'a mut dyn OutlineSink,
}

impl OutlineCollector<'_> {
    #[inline]
    fn pt(&self, x: f32, y: f32) -> PointD {
        PointD::new(x as f64 * self.scale, -(y as f64) * self.scale)
    }
}

impl ttf_parser::OutlineBuilder for OutlineCollector<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.pt(x, y);
        self.sink.move_to(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.pt(x, y);
        self.sink.line_to(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (c, p) = (self.pt(x1, y1), self.pt(x, y));
        self.sink.quad_to(c, p);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (c1, c2, p) = (self.pt(x1, y1), self.pt(x2, y2), self.pt(x, y));
        self.sink.cubic_to(c1, c2, p);
    }

    fn close(&mut self) {
        self.sink.close();
    }
}

// ============================================================================
// TtfFontResolver
// ============================================================================

/// Family name to face bytes. Names match case-insensitively.
#[derive(Debug, Default)]
pub struct TtfFontResolver {
    families: HashMap<String, TtfFont>,
}

impl TtfFontResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `data` under `family`, replacing any previous face.
    pub fn add_family(&mut self, family: &str, data: impl Into<Rc<[u8]>>, face_index: u32) -> Result<()> {
        let font = TtfFont::from_data(data, face_index, 12.0)?;
        self.families.insert(family.to_lowercase(), font);
        Ok(())
    }

    pub fn has_family(&self, family: &str) -> bool {
        self.families.contains_key(&family.to_lowercase())
    }
}

impl FontResolver for TtfFontResolver {
    fn resolve(&self, spec: &FontSpec) -> Result<Rc<dyn Font>> {
        match self.families.get(&spec.family.to_lowercase()) {
            Some(font) => Ok(Rc::new(font.with_size(spec.size))),
            None => Err(Error::FontNotFound {
                family: spec.family.clone(),
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
