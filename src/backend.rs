//! Backend dispatch: the only place pixels are actually written.
//!
//! The painter and the rasterizer are written once against this trait.
//! A concrete surface (a native window, an in-memory buffer, a recorder
//! in tests) implements it once. All coordinates are device pixels with
//! the window offset already applied.

use crate::basics::{PointI, RectI};
use crate::color::Color;
use crate::pixmap::Pixmap;
use crate::state::{Operator, Pen};
use crate::window::WindowState;

pub trait Backend {
    /// Fill each rectangle (half-open) with `color`. The painter calls
    /// this once per inside run per scanline.
    fn fill_rectangles(&mut self, rects: &[RectI], color: Color);

    /// Fill a small simple polygon in one call.
    fn fill_polygon(&mut self, points: &[PointI], color: Color);

    /// Stroke connected segments through `points`.
    fn stroke_polyline(&mut self, points: &[PointI], pen: &Pen);

    /// Stroke the outline of `rect` (half-open: the right and bottom
    /// edges are drawn on `x2 - 1` and `y2 - 1`).
    fn stroke_rectangle(&mut self, rect: RectI, pen: &Pen);

    /// Copy `source` of `pixmap` with its top-left corner at `dest`.
    /// `transparent` honors the pixmap's alpha.
    fn draw_pixmap(&mut self, pixmap: &Pixmap, source: RectI, dest: PointI, transparent: bool);

    /// The window state changed visibility or obscured rectangle.
    fn update_clip(&mut self, window: &WindowState);

    /// Raster operation for the operations that follow.
    fn set_operator(&mut self, _oper: Operator) {}

    /// Device area worth rasterizing, if the surface is bounded.
    fn clip_box(&self) -> Option<RectI> {
        None
    }
}

impl<B: Backend + ?Sized> Backend for &mut B {
    fn fill_rectangles(&mut self, rects: &[RectI], color: Color) {
        (**self).fill_rectangles(rects, color)
    }

    fn fill_polygon(&mut self, points: &[PointI], color: Color) {
        (**self).fill_polygon(points, color)
    }

    fn stroke_polyline(&mut self, points: &[PointI], pen: &Pen) {
        (**self).stroke_polyline(points, pen)
    }

    fn stroke_rectangle(&mut self, rect: RectI, pen: &Pen) {
        (**self).stroke_rectangle(rect, pen)
    }

    fn draw_pixmap(&mut self, pixmap: &Pixmap, source: RectI, dest: PointI, transparent: bool) {
        (**self).draw_pixmap(pixmap, source, dest, transparent)
    }

    fn update_clip(&mut self, window: &WindowState) {
        (**self).update_clip(window)
    }

    fn set_operator(&mut self, oper: Operator) {
        (**self).set_operator(oper)
    }

    fn clip_box(&self) -> Option<RectI> {
        (**self).clip_box()
    }
}
