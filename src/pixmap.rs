//! Already-decoded pixel buffers handed to the painter for blitting.
//!
//! The painter never writes through a pixmap; primitives share it via
//! `Rc` until they are flushed.

use crate::basics::RectI;
use crate::color::Color;
use crate::error::{Error, Result};

/// Row-major pixel data with a resolved size and depth.
///
/// Supported depths: 32 (RGBA), 24 (RGB) and 8 (gray). Rows are tightly
/// packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pixmap {
    width: u32,
    height: u32,
    depth: u8,
    data: Vec<u8>,
}

impl Pixmap {
    pub fn new(width: u32, height: u32, depth: u8, data: Vec<u8>) -> Result<Self> {
        let bpp = Self::bytes_per_pixel(depth)?;
        let expected = width as usize * height as usize * bpp;
        if data.len() != expected {
            return Err(Error::PixmapSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            depth,
            data,
        })
    }

    /// A 32-bit pixmap filled with `c`.
    pub fn filled(width: u32, height: u32, c: Color) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..width as usize * height as usize {
            data.extend_from_slice(&[c.r, c.g, c.b, c.a]);
        }
        Self {
            width,
            height,
            depth: 32,
            data,
        }
    }

    fn bytes_per_pixel(depth: u8) -> Result<usize> {
        match depth {
            8 => Ok(1),
            24 => Ok(3),
            32 => Ok(4),
            d => Err(Error::UnsupportedDepth(d)),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn rect(&self) -> RectI {
        RectI::new(0, 0, self.width as i32, self.height as i32)
    }

    /// Pixel at `(x, y)` as RGBA, `None` outside the pixmap.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        if !self.rect().contains(x, y) {
            return None;
        }
        let bpp = (self.depth / 8) as usize;
        let i = (y as usize * self.width as usize + x as usize) * bpp;
        let p = self.data.get(i..i + bpp)?;
        Some(match p {
            [r, g, b, a] => Color::new(*r, *g, *b, *a),
            [r, g, b] => Color::opaque(*r, *g, *b),
            [v] => Color::opaque(*v, *v, *v),
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_checked() {
        assert!(Pixmap::new(2, 2, 32, vec![0; 16]).is_ok());
        assert_eq!(
            Pixmap::new(2, 2, 24, vec![0; 16]),
            Err(Error::PixmapSize {
                expected: 12,
                actual: 16
            })
        );
        assert_eq!(
            Pixmap::new(1, 1, 16, vec![0; 2]),
            Err(Error::UnsupportedDepth(16))
        );
    }

    #[test]
    fn test_pixel_depths() {
        let rgb = Pixmap::new(2, 1, 24, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(rgb.pixel(1, 0), Some(Color::opaque(4, 5, 6)));
        assert_eq!(rgb.pixel(2, 0), None);

        let gray = Pixmap::new(1, 2, 8, vec![10, 20]).unwrap();
        assert_eq!(gray.pixel(0, 1), Some(Color::opaque(20, 20, 20)));

        let rgba = Pixmap::filled(3, 3, Color::new(9, 8, 7, 6));
        assert_eq!(rgba.pixel(2, 2), Some(Color::new(9, 8, 7, 6)));
        assert_eq!(rgba.rect(), RectI::new(0, 0, 3, 3));
    }
}
