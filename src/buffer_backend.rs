//! In-memory RGBA backend.
//!
//! [`PixelBuffer`] is an owned, tightly packed RGBA8 image (row-major,
//! `width * 4` bytes per row). [`BufferBackend`] implements [`Backend`]
//! on top of it: every operation is clipped to the buffer and to the last
//! window state received through `update_clip`, and pixel writes go
//! through the current [`Operator`].

use log::warn;

use crate::backend::Backend;
use crate::basics::{iround, FillingRule, PointD, PointI, RectI};
use crate::color::Color;
use crate::pixmap::Pixmap;
use crate::rasterizer::Rasterizer;
use crate::state::{Operator, Pen};
use crate::window::WindowState;

// ============================================================================
// PixelBuffer
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// A buffer of transparent black pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rect(&self) -> RectI {
        RectI::new(0, 0, self.width as i32, self.height as i32)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Stride in bytes.
    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if self.rect().contains(x, y) {
            Some(y as usize * self.stride() + x as usize * 4)
        } else {
            None
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let i = self.offset(x, y)?;
        let p = &self.data[i..i + 4];
        Some(Color::new(p[0], p[1], p[2], p[3]))
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, c: Color) {
        if let Some(i) = self.offset(x, y) {
            self.data[i..i + 4].copy_from_slice(&[c.r, c.g, c.b, c.a]);
        }
    }

    pub fn clear(&mut self, c: Color) {
        for p in self.data.chunks_exact_mut(4) {
            p.copy_from_slice(&[c.r, c.g, c.b, c.a]);
        }
    }

    /// Combine `c` into the pixel at `(x, y)` with `oper`.
    pub fn apply_pixel(&mut self, x: i32, y: i32, c: Color, oper: Operator) {
        if let Some(dst) = self.pixel(x, y) {
            self.set_pixel(x, y, apply_operator(oper, c, dst));
        }
    }

    /// Apply `oper` to `x1..x2` on row `y`, clipped to the buffer.
    pub fn apply_hline(&mut self, x1: i32, x2: i32, y: i32, c: Color, oper: Operator) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let x1 = x1.max(0);
        let x2 = x2.min(self.width as i32);
        for x in x1..x2 {
            self.apply_pixel(x, y, c, oper);
        }
    }

    /// Count pixels equal to `c`.
    pub fn count(&self, c: Color) -> usize {
        self.data
            .chunks_exact(4)
            .filter(|p| *p == [c.r, c.g, c.b, c.a])
            .count()
    }
}

/// Result of writing `src` over `dst` with `oper`.
pub fn apply_operator(oper: Operator, src: Color, dst: Color) -> Color {
    match oper {
        Operator::Copy => src,
        Operator::Clear => Color::TRANSPARENT,
        Operator::Source => src.blend_over(dst),
        Operator::Not => Color::new(!dst.r, !dst.g, !dst.b, dst.a),
        Operator::Xor => Color::new(dst.r ^ src.r, dst.g ^ src.g, dst.b ^ src.b, dst.a),
        Operator::Set => Color::WHITE,
    }
}

// ============================================================================
// BufferBackend
// ============================================================================

#[derive(Debug, Clone)]
pub struct BufferBackend {
    buffer: PixelBuffer,
    oper: Operator,
    window: WindowState,
}

impl BufferBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_buffer(PixelBuffer::new(width, height))
    }

    pub fn from_buffer(buffer: PixelBuffer) -> Self {
        Self {
            buffer,
            oper: Operator::default(),
            window: WindowState::default(),
        }
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut PixelBuffer {
        &mut self.buffer
    }

    pub fn into_buffer(self) -> PixelBuffer {
        self.buffer
    }

    pub fn operator(&self) -> Operator {
        self.oper
    }

    /// Write `x1..x2` on row `y`, skipping obscured pixels.
    fn hline(&mut self, x1: i32, x2: i32, y: i32, c: Color) {
        if !self.window.visible {
            return;
        }
        for (a, b) in self.window.clip_span(y, x1, x2).into_iter().flatten() {
            self.buffer.apply_hline(a, b, y, c, self.oper);
        }
    }

    fn writable(&self, x: i32, y: i32) -> bool {
        self.window.visible
            && self.buffer.rect().contains(x, y)
            && !self.window.obscured.is_some_and(|r| r.contains(x, y))
    }

    /// Square dot of side `size` centred on `(x, y)`.
    fn dot(&mut self, x: i32, y: i32, size: i32, c: Color) {
        let x1 = x - (size - 1) / 2;
        let y1 = y - (size - 1) / 2;
        for yy in y1..y1 + size {
            self.hline(x1, x1 + size, yy, c);
        }
    }

    /// Bresenham line. `skip_first` and `skip_last` leave the end points
    /// to the neighbouring segments.
    fn line(&mut self, a: PointI, b: PointI, size: i32, c: Color, skip_first: bool, skip_last: bool) {
        let dx = (b.x - a.x).abs();
        let dy = -(b.y - a.y).abs();
        let sx = if a.x < b.x { 1 } else { -1 };
        let sy = if a.y < b.y { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (a.x, a.y);
        let mut first = true;
        loop {
            let at_end = x == b.x && y == b.y;
            if !((first && skip_first) || (at_end && skip_last)) {
                self.dot(x, y, size, c);
            }
            if at_end {
                break;
            }
            first = false;
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }
}

impl Backend for BufferBackend {
    fn fill_rectangles(&mut self, rects: &[RectI], color: Color) {
        for r in rects {
            let mut r = *r;
            if !r.clip(&self.buffer.rect()) {
                continue;
            }
            for y in r.y1..r.y2 {
                self.hline(r.x1, r.x2, y, color);
            }
        }
    }

    fn fill_polygon(&mut self, points: &[PointI], color: Color) {
        let pts: Vec<PointD> = points.iter().map(|&p| PointD::from(p)).collect();
        let mut ras = Rasterizer::new(FillingRule::NonZero);
        ras.set_clip_box(Some(self.buffer.rect()));
        ras.add_points(&pts);
        let mut spans = Vec::new();
        ras.sweep(&mut |y, x1, x2| spans.push((y, x1, x2)));
        for (y, x1, x2) in spans {
            self.hline(x1, x2, y, color);
        }
    }

    fn stroke_polyline(&mut self, points: &[PointI], pen: &Pen) {
        let size = iround(pen.width).max(1);
        // A closed polyline repeats its first point; plot it once.
        let closed = points.len() > 2 && points.first() == points.last();
        match points {
            [] => {}
            [p] => self.dot(p.x, p.y, size, pen.color),
            _ => {
                let last = points.len() - 2;
                for (i, w) in points.windows(2).enumerate() {
                    self.line(w[0], w[1], size, pen.color, i > 0, closed && i == last);
                }
            }
        }
    }

    fn stroke_rectangle(&mut self, rect: RectI, pen: &Pen) {
        let mut r = rect;
        r.normalize();
        if r.is_empty() {
            return;
        }
        let (x1, y1, x2, y2) = (r.x1, r.y1, r.x2 - 1, r.y2 - 1);
        self.stroke_polyline(
            &[
                PointI::new(x1, y1),
                PointI::new(x2, y1),
                PointI::new(x2, y2),
                PointI::new(x1, y2),
                PointI::new(x1, y1),
            ],
            pen,
        );
    }

    fn draw_pixmap(&mut self, pixmap: &Pixmap, source: RectI, dest: PointI, transparent: bool) {
        if !matches!(pixmap.depth(), 8 | 24 | 32) {
            warn!("cannot blit pixmap of depth {}", pixmap.depth());
            return;
        }
        let mut src = source;
        src.normalize();
        if !src.clip(&pixmap.rect()) {
            return;
        }
        // Shift by how much of the source was clipped away.
        let dx = dest.x + (src.x1 - source.x1.min(source.x2));
        let dy = dest.y + (src.y1 - source.y1.min(source.y2));
        for sy in src.y1..src.y2 {
            for sx in src.x1..src.x2 {
                let (x, y) = (dx + sx - src.x1, dy + sy - src.y1);
                if !self.writable(x, y) {
                    continue;
                }
                let c = match pixmap.pixel(sx, sy) {
                    Some(c) => c,
                    None => continue,
                };
                if transparent {
                    if let Some(dst) = self.buffer.pixel(x, y) {
                        self.buffer.set_pixel(x, y, c.blend_over(dst));
                    }
                } else {
                    self.buffer.set_pixel(x, y, c);
                }
            }
        }
    }

    fn update_clip(&mut self, window: &WindowState) {
        self.window = *window;
    }

    fn set_operator(&mut self, oper: Operator) {
        self.oper = oper;
    }

    fn clip_box(&self) -> Option<RectI> {
        Some(self.buffer.rect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::opaque(255, 0, 0);

    #[test]
    fn test_operators() {
        let dst = Color::new(10, 20, 30, 255);
        let src = Color::new(0xF0, 0x0F, 0xFF, 255);
        assert_eq!(apply_operator(Operator::Copy, src, dst), src);
        assert_eq!(apply_operator(Operator::Clear, src, dst), Color::TRANSPARENT);
        assert_eq!(apply_operator(Operator::Set, src, dst), Color::WHITE);
        assert_eq!(
            apply_operator(Operator::Not, src, dst),
            Color::new(245, 235, 225, 255)
        );
        assert_eq!(
            apply_operator(Operator::Xor, src, dst),
            Color::new(10 ^ 0xF0, 20 ^ 0x0F, 30 ^ 0xFF, 255)
        );
        assert_eq!(apply_operator(Operator::Source, src.with_alpha(0), dst), dst);
    }

    #[test]
    fn test_fill_rectangles_clipped() {
        let mut b = BufferBackend::new(8, 8);
        b.fill_rectangles(&[RectI::new(-2, -2, 3, 2), RectI::new(6, 7, 20, 20)], RED);
        assert_eq!(b.buffer().count(RED), 3 * 2 + 2);
        assert_eq!(b.buffer().pixel(0, 0), Some(RED));
        assert_eq!(b.buffer().pixel(3, 0), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_obscured_and_invisible() {
        let mut b = BufferBackend::new(10, 1);
        b.update_clip(&WindowState {
            obscured: Some(RectI::new(2, 0, 5, 1)),
            ..WindowState::default()
        });
        b.fill_rectangles(&[RectI::new(0, 0, 10, 1)], RED);
        assert_eq!(b.buffer().count(RED), 7);
        assert_eq!(b.buffer().pixel(3, 0), Some(Color::TRANSPARENT));

        b.update_clip(&WindowState {
            visible: false,
            ..WindowState::default()
        });
        b.buffer_mut().clear(Color::TRANSPARENT);
        b.fill_rectangles(&[RectI::new(0, 0, 10, 1)], RED);
        assert_eq!(b.buffer().count(RED), 0);
    }

    #[test]
    fn test_xor_twice_restores() {
        let mut b = BufferBackend::new(4, 4);
        b.buffer_mut().clear(Color::opaque(1, 2, 3));
        b.set_operator(Operator::Xor);
        let r = [RectI::new(0, 0, 4, 4)];
        b.fill_rectangles(&r, Color::opaque(0xAA, 0x55, 0xFF));
        assert_eq!(b.buffer().count(Color::opaque(1, 2, 3)), 0);
        b.fill_rectangles(&r, Color::opaque(0xAA, 0x55, 0xFF));
        assert_eq!(b.buffer().count(Color::opaque(1, 2, 3)), 16);
    }

    #[test]
    fn test_fill_polygon_triangle() {
        let mut b = BufferBackend::new(10, 10);
        b.fill_polygon(
            &[PointI::new(0, 0), PointI::new(10, 0), PointI::new(0, 10)],
            RED,
        );
        let n = b.buffer().count(RED);
        assert!(n > 40 && n < 60, "{}", n);
        assert_eq!(b.buffer().pixel(0, 0), Some(RED));
        assert_eq!(b.buffer().pixel(9, 9), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_stroke_rectangle_outline() {
        let mut b = BufferBackend::new(6, 6);
        b.set_operator(Operator::Xor);
        b.stroke_rectangle(RectI::new(1, 1, 5, 5), &Pen::new(RED, 1.0));
        // 4x4 outline, every pixel touched exactly once
        assert_eq!(b.buffer().count(Color::new(255, 0, 0, 0)), 12);
        assert_eq!(b.buffer().pixel(2, 2), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_stroke_polyline_width() {
        let mut b = BufferBackend::new(10, 10);
        b.stroke_polyline(&[PointI::new(1, 5), PointI::new(8, 5)], &Pen::new(RED, 3.0));
        // Dots of side 3 centred on x = 1..=8 cover columns 0..10
        assert_eq!(b.buffer().count(RED), 10 * 3);
        assert_eq!(b.buffer().pixel(4, 4), Some(RED));
        assert_eq!(b.buffer().pixel(4, 6), Some(RED));
        assert_eq!(b.buffer().pixel(4, 7), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_draw_pixmap() {
        let mut b = BufferBackend::new(4, 4);
        let pm = Pixmap::filled(3, 3, Color::new(0, 0, 255, 255));
        b.draw_pixmap(&pm, RectI::new(0, 0, 2, 2), PointI::new(3, 3), false);
        assert_eq!(b.buffer().count(Color::new(0, 0, 255, 255)), 1);
        assert_eq!(b.buffer().pixel(3, 3), Some(Color::new(0, 0, 255, 255)));

        // Transparent blit of a fully transparent pixmap changes nothing
        let clear = Pixmap::filled(2, 2, Color::new(255, 0, 0, 0));
        b.draw_pixmap(&clear, clear.rect(), PointI::new(0, 0), true);
        assert_eq!(b.buffer().pixel(0, 0), Some(Color::TRANSPARENT));
        b.draw_pixmap(&clear, clear.rect(), PointI::new(0, 0), false);
        assert_eq!(b.buffer().pixel(0, 0), Some(Color::new(255, 0, 0, 0)));
    }
}
