//! The painting engine facade.
//!
//! A [`Painter`] accumulates drawing state and pending primitives, and
//! turns them into backend calls when a fill, stroke or paint flushes.
//!
//! Path building calls map their points through the current matrix right
//! away, so the open subpath is kept in device space. It becomes a pooled
//! contour batch primitive when the next subpath starts, when it is
//! closed, when another primitive is added, or at a flush. Arcs,
//! rectangles and text runs remember the matrix that was current when
//! they were issued.
//!
//! Flushing walks the pending primitives in issue order. Everything up to
//! a pixmap blit is lowered to contours and emitted as one group, then
//! the blit follows, so output order matches call order.

use std::rc::Rc;

use log::{debug, warn};

use crate::arc::Arc;
use crate::backend::Backend;
use crate::basics::{iround, FillingRule, PointD, PointI, RectD, RectI};
use crate::color::Color;
use crate::config::PainterConfig;
use crate::contour::Contour;
use crate::curves::Flattener;
use crate::error::Result;
use crate::font::{Font, FontResolver, FontSpec};
use crate::matrix::Matrix;
use crate::pixmap::Pixmap;
use crate::pool::{PrimitiveId, PrimitivePool, PrimitiveRef};
use crate::primitive::PixmapBlit;
use crate::rasterizer::Rasterizer;
use crate::state::{Brush, DrawState, Operator, Pen, SaveStack};
use crate::window::WindowState;

/// Retained-mode painter drawing into a backend `B`.
pub struct Painter<B: Backend> {
    backend: Option<B>,
    config: PainterConfig,
    flattener: Flattener,
    states: SaveStack<DrawState>,
    windows: SaveStack<WindowState>,
    pool: PrimitivePool,
    pending: Vec<PrimitiveId>,
    /// Open subpath, device space.
    path: Contour,
    /// Start of the open subpath, user space.
    subpath_start: PointD,
}

impl<B: Backend> Painter<B> {
    /// A painter on `backend` with the default configuration.
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, PainterConfig::default())
    }

    /// A painter on `backend`. `config` is read once here.
    pub fn with_config(backend: B, config: PainterConfig) -> Self {
        let mut p = Self::pure(config);
        p.backend = Some(backend);
        p
    }

    /// A painter without a backend. Drawing calls are accepted and
    /// dropped with a warning.
    pub fn pure(config: PainterConfig) -> Self {
        Self {
            backend: None,
            config,
            flattener: Flattener::with_tolerance(config.flatness, config.max_flatten_depth),
            states: SaveStack::with_capacity(DrawState::default(), config.stack_reserve),
            windows: SaveStack::with_capacity(WindowState::default(), config.stack_reserve),
            pool: PrimitivePool::new(config.pool_capacity),
            pending: Vec::new(),
            path: Contour::new(),
            subpath_start: PointD::default(),
        }
    }

    /// Attach a backend, returning the previous one.
    pub fn bind(&mut self, backend: B) -> Option<B> {
        self.backend.replace(backend)
    }

    /// Detach the backend. The painter turns pure until the next bind.
    pub fn unbind(&mut self) -> Option<B> {
        self.backend.take()
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> Option<&mut B> {
        self.backend.as_mut()
    }

    /// `true` without a backend.
    pub fn is_pure(&self) -> bool {
        self.backend.is_none()
    }

    pub fn config(&self) -> &PainterConfig {
        &self.config
    }

    /// Storage of the pending primitives.
    pub fn pool(&self) -> &PrimitivePool {
        &self.pool
    }

    /// Number of primitives waiting for a flush, the open subpath
    /// included.
    pub fn pending(&self) -> usize {
        self.pending.len() + usize::from(!self.path.is_empty())
    }

    /// Back to baseline: one identity state, one default window, nothing
    /// pending.
    pub fn reset(&mut self) {
        self.clear();
        self.states.reset(DrawState::default());
        self.windows.reset(WindowState::default());
    }

    // ========================================================================
    // State stack
    // ========================================================================

    /// Save a copy of the current drawing state.
    pub fn push(&mut self) {
        self.states.push();
    }

    /// Restore the previous state. Never drops the last one.
    pub fn pop(&mut self) {
        self.states.pop();
    }

    /// Saved states plus the current one, never below one.
    pub fn depth(&self) -> usize {
        self.states.depth()
    }

    /// Make room for `n` more saved states.
    pub fn reserve_stack(&mut self, n: usize) {
        self.states.reserve(n);
    }

    /// The current drawing state.
    pub fn state(&self) -> &DrawState {
        self.states.top()
    }

    /// Current point, user space.
    pub fn position(&self) -> PointD {
        self.states.top().position
    }

    pub fn font(&self) -> Option<&Rc<dyn Font>> {
        self.states.top().font.as_ref()
    }

    /// Set the current font, `None` to drop it.
    pub fn set_font(&mut self, font: Option<Rc<dyn Font>>) {
        self.states.top_mut().font = font;
    }

    /// Resolve `spec` and make it the current font. On failure the
    /// current font is left alone.
    pub fn select_font(&mut self, resolver: &dyn FontResolver, spec: &FontSpec) -> Result<()> {
        let font = resolver.resolve(spec)?;
        self.states.top_mut().font = Some(font);
        Ok(())
    }

    pub fn pen(&self) -> Pen {
        self.states.top().pen
    }

    /// Pen used by the next stroke.
    pub fn set_pen(&mut self, pen: Pen) {
        self.states.top_mut().pen = pen;
    }

    pub fn brush(&self) -> Brush {
        self.states.top().brush
    }

    /// Brush used by the next fill. A plain [`Color`] converts.
    pub fn set_brush(&mut self, brush: impl Into<Brush>) {
        self.states.top_mut().brush = brush.into();
    }

    pub fn oper(&self) -> Operator {
        self.states.top().oper
    }

    /// Raster operator announced to the backend at the next flush.
    pub fn set_oper(&mut self, oper: Operator) {
        self.states.top_mut().oper = oper;
    }

    // ========================================================================
    // Transform
    // ========================================================================

    /// User to device transform.
    pub fn matrix(&self) -> Matrix {
        self.states.top().matrix
    }

    /// Replace the transform. Points already added are not moved.
    pub fn set_matrix(&mut self, m: Matrix) {
        self.states.top_mut().matrix = m;
    }

    pub fn reset_matrix(&mut self) {
        self.set_matrix(Matrix::IDENTITY);
    }

    /// Shift the user space by `(dx, dy)`, in current user units.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.states
            .top_mut()
            .matrix
            .premultiply(&Matrix::translation(dx, dy));
    }

    /// Scale the user space about its origin.
    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.states
            .top_mut()
            .matrix
            .premultiply(&Matrix::scaling(sx, sy));
    }

    /// Rotate the user space by `degrees`.
    pub fn rotate(&mut self, degrees: f64) {
        self.states
            .top_mut()
            .matrix
            .premultiply(&Matrix::rotation(degrees));
    }

    #[inline]
    fn device(&self, p: PointD) -> PointD {
        self.states.top().matrix.transform(p)
    }

    // ========================================================================
    // Path construction
    // ========================================================================

    /// Commit the open subpath and move the current point to `p`.
    pub fn move_to(&mut self, p: PointD) {
        self.commit_path();
        self.states.top_mut().position = p;
        self.subpath_start = p;
    }

    /// [`move_to`](Self::move_to) relative to the current point.
    pub fn move_rel(&mut self, d: PointD) {
        let p = self.position() + d;
        self.move_to(p);
    }

    /// Straight segment from the current point to `p`. Starts a
    /// subpath at the current point when none is open.
    pub fn line_to(&mut self, p: PointD) {
        self.start_path();
        let d = self.device(p);
        self.path.push(d);
        self.states.top_mut().position = p;
    }

    /// [`line_to`](Self::line_to) relative to the current point.
    pub fn line_rel(&mut self, d: PointD) {
        let p = self.position() + d;
        self.line_to(p);
    }

    /// Quadratic Bézier from the current point through `c` to `p`.
    pub fn conic_to(&mut self, c: PointD, p: PointD) {
        self.start_path();
        let from = self.path.last().unwrap_or_else(|| self.device(self.position()));
        let (dc, dp) = (self.device(c), self.device(p));
        self.flattener.conic(from, dc, dp, &mut self.path);
        self.states.top_mut().position = p;
    }

    /// Cubic Bézier from the current point through `c1`, `c2` to `p`.
    pub fn cubic_to(&mut self, c1: PointD, c2: PointD, p: PointD) {
        self.start_path();
        let from = self.path.last().unwrap_or_else(|| self.device(self.position()));
        let (d1, d2, dp) = (self.device(c1), self.device(c2), self.device(p));
        self.flattener.cubic(from, d1, d2, dp, &mut self.path);
        self.states.top_mut().position = p;
    }

    /// Close the open subpath. The current point returns to its start.
    pub fn close_path(&mut self) {
        if self.path.is_empty() {
            return;
        }
        self.path.set_closed(true);
        self.commit_path();
        self.states.top_mut().position = self.subpath_start;
    }

    /// Axis-aligned rectangle between two opposite corners.
    pub fn rectangle(&mut self, v1: PointD, v2: PointD) {
        self.rounded_rectangle(v1, v2, 0.0);
    }

    /// Rectangle with a recorded corner radius. The corners are drawn
    /// square.
    pub fn rounded_rectangle(&mut self, v1: PointD, v2: PointD, radius: f64) {
        self.commit_path();
        let matrix = self.matrix();
        let (id, rect) = self.pool.alloc_rect();
        rect.v1 = v1;
        rect.v2 = v2;
        rect.radius = radius;
        rect.matrix = matrix;
        self.pending.push(id);
    }

    /// Circular arc, angles in degrees. With `pie` the radii to the
    /// center are included.
    pub fn arc(&mut self, center: PointD, radius: f64, angle1: f64, angle2: f64, pie: bool) {
        self.commit_path();
        let mut arc = Arc::new(center, radius, angle1, angle2, pie);
        arc.set_approximation_scale(self.config.arc_approximation_scale);
        arc.set_max_segments(self.config.max_arc_segments);
        let matrix = self.matrix();
        let (id, prim) = self.pool.alloc_arc();
        prim.arc = arc;
        prim.matrix = matrix;
        self.pending.push(id);
    }

    /// Full circle as a closed arc.
    pub fn circle(&mut self, center: PointD, radius: f64) {
        self.arc(center, radius, 0.0, 360.0, false);
    }

    /// Add a copy of `ctr`, mapped through the current matrix.
    pub fn contour(&mut self, ctr: &Contour) {
        self.contour_owned(ctr.clone());
    }

    /// Add `ctr` by move, mapped through the current matrix.
    pub fn contour_owned(&mut self, mut ctr: Contour) {
        self.commit_path();
        if ctr.is_empty() {
            return;
        }
        let m = self.matrix();
        if !m.is_identity() {
            ctr.transform(&m);
        }
        let (id, batch) = self.pool.alloc_contours();
        batch.contours.push(ctr);
        self.pending.push(id);
    }

    /// Queue `text` at the current point with the current font and move
    /// the current point past it. Without a font nothing happens.
    pub fn show_text(&mut self, text: &str) {
        let font = match self.states.top().font.clone() {
            Some(f) => f,
            None => {
                debug!("show_text without a font");
                return;
            }
        };
        self.commit_path();
        let origin = self.position();
        let matrix = self.matrix();
        let advance = font.text_width(text);
        let (id, run) = self.pool.alloc_text();
        run.text.push_str(text);
        run.origin = origin;
        run.matrix = matrix;
        run.font = Some(font);
        self.pending.push(id);
        self.states.top_mut().position = PointD::new(origin.x + advance, origin.y);
    }

    /// Advance width of `text` in the current font, zero without one.
    pub fn text_width(&self, text: &str) -> f64 {
        self.font().map_or(0.0, |f| f.text_width(text))
    }

    /// Queue a blit of `source` from `pixmap` with its top-left corner at
    /// `dest`. Only the corner goes through the matrix; pixels are copied
    /// unscaled.
    pub fn draw_pixmap(&mut self, pixmap: Rc<Pixmap>, source: RectI, dest: PointD, transparent: bool) {
        self.commit_path();
        let dest = self.device(dest);
        let (id, blit) = self.pool.alloc_pixmap();
        blit.pixmap = Some(pixmap);
        blit.source = source;
        blit.dest = dest;
        blit.transparent = transparent;
        self.pending.push(id);
    }

    fn start_path(&mut self) {
        if self.path.is_empty() {
            let p = self.position();
            self.subpath_start = p;
            let d = self.device(p);
            self.path.push(d);
        }
    }

    fn commit_path(&mut self) {
        if self.path.is_empty() {
            return;
        }
        let path = std::mem::take(&mut self.path);
        let (id, batch) = self.pool.alloc_contours();
        batch.contours.push(path);
        self.pending.push(id);
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Fill pending primitives with the brush and drop them.
    pub fn fill(&mut self) {
        self.flush(Pass::FILL, false);
    }

    /// Fill pending primitives with the brush and keep them.
    pub fn fill_preserve(&mut self) {
        self.flush(Pass::FILL, true);
    }

    /// Stroke pending primitives with the pen and drop them.
    pub fn stroke(&mut self) {
        self.flush(Pass::STROKE, false);
    }

    /// Stroke pending primitives with the pen and keep them.
    pub fn stroke_preserve(&mut self) {
        self.flush(Pass::STROKE, true);
    }

    /// Fill then stroke pending primitives, and drop them.
    pub fn paint(&mut self) {
        self.flush(Pass::PAINT, false);
    }

    /// Drop all pending primitives without drawing. The state stacks are
    /// untouched.
    pub fn clear(&mut self) {
        self.path.clear();
        for id in self.pending.drain(..) {
            self.pool.release(id);
        }
    }

    /// Fill `points` right away through the backend's polygon path.
    /// Pending primitives are not affected.
    pub fn polygon(&mut self, points: &[PointD]) {
        if points.len() < 3 {
            return;
        }
        let window = *self.windows.top();
        let state = self.states.top();
        let backend = match self.backend.as_mut() {
            Some(b) => b,
            None => {
                warn!("polygon on a painter without backend");
                return;
            }
        };
        if !window.visible {
            return;
        }
        let pts: Vec<PointI> = points
            .iter()
            .map(|&p| {
                let d = state.matrix.transform(p).round();
                PointI::new(d.x + window.offset.x, d.y + window.offset.y)
            })
            .collect();
        backend.set_operator(state.oper);
        backend.fill_polygon(&pts, state.brush.color);
    }

    fn flush(&mut self, pass: Pass, preserve: bool) {
        self.commit_path();
        if self.pending.is_empty() {
            return;
        }
        let ids = if preserve {
            self.pending.clone()
        } else {
            std::mem::take(&mut self.pending)
        };

        match self.backend.as_mut() {
            None => warn!(
                "painter without backend, {} primitives not drawn",
                ids.len()
            ),
            Some(backend) => {
                let state = self.states.top();
                let mut out = Emitter {
                    backend,
                    window: *self.windows.top(),
                    rule: self.config.filling_rule,
                    color: state.brush.color,
                    pen: state.pen,
                    oper: state.oper,
                    oper_sent: false,
                    pass,
                };
                let mut group = Vec::new();
                let mut contours = 0;
                for &id in &ids {
                    match self.pool.get(id) {
                        Some(PrimitiveRef::Pixmap(blit)) => {
                            contours += group.len();
                            out.emit(&mut group);
                            out.blit(blit);
                        }
                        Some(prim) => lower(prim, &self.flattener, &mut group),
                        None => {}
                    }
                }
                contours += group.len();
                out.emit(&mut group);
                debug!("flushed {} primitives, {} contours", ids.len(), contours);
            }
        }

        if !preserve {
            for id in ids {
                self.pool.release(id);
            }
        }
    }

    // ========================================================================
    // Window state
    // ========================================================================

    /// The current window state.
    pub fn window(&self) -> &WindowState {
        self.windows.top()
    }

    /// Saved window states plus the current one.
    pub fn window_depth(&self) -> usize {
        self.windows.depth()
    }

    /// Save a copy of the current window state.
    pub fn push_window(&mut self) {
        self.windows.push();
    }

    /// Restore the previous window state. The backend hears about it
    /// when visibility or the obscured rectangle changes.
    pub fn pop_window(&mut self) {
        let before = *self.windows.top();
        if self.windows.pop() {
            self.clip_changed(before);
        }
    }

    /// Hidden windows consume flushes without drawing.
    pub fn set_visible(&mut self, visible: bool) {
        let before = *self.windows.top();
        self.windows.top_mut().visible = visible;
        self.clip_changed(before);
    }

    /// Device rectangle that must not be painted, or `None`.
    pub fn set_obscured(&mut self, obscured: Option<RectI>) {
        let before = *self.windows.top();
        self.windows.top_mut().obscured = obscured;
        self.clip_changed(before);
    }

    /// Offset added to every device coordinate at flush time.
    pub fn set_offset(&mut self, offset: PointI) {
        self.windows.top_mut().offset = offset;
    }

    fn clip_changed(&mut self, before: WindowState) {
        let now = self.windows.top();
        if now.visible == before.visible && now.obscured == before.obscured {
            return;
        }
        if let Some(backend) = self.backend.as_mut() {
            backend.update_clip(now);
        }
    }
}

// ============================================================================
// Flushing
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pass {
    fill: bool,
    stroke: bool,
}

impl Pass {
    const FILL: Pass = Pass {
        fill: true,
        stroke: false,
    };
    const STROKE: Pass = Pass {
        fill: false,
        stroke: true,
    };
    const PAINT: Pass = Pass {
        fill: true,
        stroke: true,
    };
}

/// A lowered device-space contour. Rectangles that map onto a device
/// rectangle keep it for `stroke_rectangle`.
struct Lowered {
    contour: Contour,
    rect: Option<RectD>,
}

fn lower(prim: PrimitiveRef<'_>, flattener: &Flattener, out: &mut Vec<Lowered>) {
    let mut contours = Vec::new();
    let rect = match prim {
        PrimitiveRef::Contours(batch) => {
            batch.lower(&mut contours);
            None
        }
        PrimitiveRef::Arc(arc) => {
            arc.lower(&mut contours);
            None
        }
        PrimitiveRef::Rectangle(r) => {
            r.lower(&mut contours);
            r.device_rect()
        }
        PrimitiveRef::Text(run) => {
            run.lower(flattener, &mut contours);
            None
        }
        PrimitiveRef::Pixmap(_) => None,
    };
    out.extend(contours.into_iter().map(|contour| Lowered { contour, rect }));
}

/// Backend-facing half of a flush.
struct Emitter<'a, B: Backend> {
    backend: &'a mut B,
    window: WindowState,
    rule: FillingRule,
    color: Color,
    pen: Pen,
    oper: Operator,
    oper_sent: bool,
    pass: Pass,
}

impl<B: Backend> Emitter<'_, B> {
    /// Announce the operator before the first real output. `false` when
    /// nothing may be drawn.
    fn begin(&mut self) -> bool {
        if !self.window.visible {
            return false;
        }
        if !self.oper_sent {
            self.backend.set_operator(self.oper);
            self.oper_sent = true;
        }
        true
    }

    fn emit(&mut self, group: &mut Vec<Lowered>) {
        if group.is_empty() {
            return;
        }
        let (ox, oy) = (self.window.offset.x as f64, self.window.offset.y as f64);
        if ox != 0.0 || oy != 0.0 {
            for l in group.iter_mut() {
                l.contour.translate(ox, oy);
                if let Some(r) = l.rect.as_mut() {
                    *r = RectD::new(r.x1 + ox, r.y1 + oy, r.x2 + ox, r.y2 + oy);
                }
            }
        }
        if self.pass.fill {
            self.fill(group);
        }
        if self.pass.stroke {
            self.stroke(group);
        }
        group.clear();
    }

    fn fill(&mut self, group: &[Lowered]) {
        let mut ras = Rasterizer::new(self.rule);
        ras.set_clip_box(self.backend.clip_box());
        for l in group {
            ras.add_contour(&l.contour);
        }
        if ras.profiles().is_empty() || !self.window.visible {
            return;
        }
        let window = self.window;
        let color = self.color;
        let oper = self.oper;
        let sent = &mut self.oper_sent;
        let backend = &mut *self.backend;
        // The operator goes out with the first piece that survives clipping
        ras.sweep(&mut |y, x1, x2| {
            for (a, b) in window.clip_span(y, x1, x2).into_iter().flatten() {
                if !*sent {
                    backend.set_operator(oper);
                    *sent = true;
                }
                backend.fill_rectangles(&[RectI::new(a, y, b, y + 1)], color);
            }
        });
    }

    fn stroke(&mut self, group: &[Lowered]) {
        for l in group {
            if let Some(r) = l.rect {
                let r = RectI::new(iround(r.x1), iround(r.y1), iround(r.x2), iround(r.y2));
                if !r.is_empty() && self.begin() {
                    self.backend.stroke_rectangle(r, &self.pen);
                }
                continue;
            }
            let poly = l.contour.to_polyline();
            if poly.len() >= 2 && self.begin() {
                self.backend.stroke_polyline(&poly, &self.pen);
            }
        }
    }

    fn blit(&mut self, blit: &PixmapBlit) {
        let pixmap = match &blit.pixmap {
            Some(p) => p,
            None => return,
        };
        let dest = PointI::new(
            iround(blit.dest.x) + self.window.offset.x,
            iround(blit.dest.y) + self.window.offset.y,
        );
        let area = RectI::new(
            dest.x,
            dest.y,
            dest.x + blit.source.width(),
            dest.y + blit.source.height(),
        );
        if self.window.hides(&area) || !self.begin() {
            return;
        }
        self.backend
            .draw_pixmap(pixmap, blit.source, dest, blit.transparent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer_backend::BufferBackend;

    const BLUE: Color = Color::opaque(0, 0, 255);

    fn p(x: f64, y: f64) -> PointD {
        PointD::new(x, y)
    }

    fn painter(w: u32, h: u32) -> Painter<BufferBackend> {
        Painter::new(BufferBackend::new(w, h))
    }

    fn count(painter: &Painter<BufferBackend>, c: Color) -> usize {
        painter.backend().map_or(0, |b| b.buffer().count(c))
    }

    #[test]
    fn test_fill_rectangle_pixels() {
        let mut pt = painter(10, 10);
        pt.set_brush(BLUE);
        pt.rectangle(p(2.0, 2.0), p(6.0, 5.0));
        pt.fill();
        assert_eq!(count(&pt, BLUE), 4 * 3);
        assert_eq!(pt.pool().live(), 0);
    }

    #[test]
    fn test_path_is_transformed_at_insertion() {
        let mut pt = painter(20, 20);
        pt.set_brush(BLUE);
        pt.translate(10.0, 10.0);
        pt.move_to(p(0.0, 0.0));
        pt.line_to(p(4.0, 0.0));
        // Matrix changes after insertion do not move earlier points
        pt.reset_matrix();
        pt.line_to(p(14.0, 14.0));
        pt.line_to(p(10.0, 14.0));
        pt.fill();
        assert_eq!(count(&pt, BLUE), 16);
        let b = pt.backend().unwrap().buffer();
        assert_eq!(b.pixel(10, 10), Some(BLUE));
        assert_eq!(b.pixel(9, 10), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_scale_and_rotate_compose_in_user_space() {
        let mut pt = painter(4, 4);
        pt.translate(10.0, 0.0);
        pt.scale(2.0, 2.0);
        let m = pt.matrix();
        assert_eq!(m.transform(p(1.0, 1.0)), p(12.0, 2.0));
        pt.rotate(90.0);
        let q = pt.matrix().transform(p(1.0, 0.0));
        assert!((q.x - 10.0).abs() < 1e-9 && (q.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_line_rel_and_close_path() {
        let mut pt = painter(10, 10);
        pt.move_to(p(1.0, 1.0));
        pt.line_rel(p(3.0, 0.0));
        pt.line_rel(p(0.0, 3.0));
        assert_eq!(pt.position(), p(4.0, 4.0));
        pt.close_path();
        assert_eq!(pt.position(), p(1.0, 1.0));
        assert_eq!(pt.pending(), 1);
        pt.move_rel(p(1.0, 0.0));
        assert_eq!(pt.position(), p(2.0, 1.0));
    }

    #[test]
    fn test_conic_advances_position() {
        let mut pt = painter(10, 10);
        pt.move_to(p(0.0, 0.0));
        pt.conic_to(p(5.0, 10.0), p(10.0, 0.0));
        pt.cubic_to(p(8.0, 2.0), p(4.0, 2.0), p(0.0, 0.0));
        assert_eq!(pt.position(), p(0.0, 0.0));
        assert_eq!(pt.pending(), 1);
        pt.set_brush(BLUE);
        pt.fill();
        assert!(count(&pt, BLUE) > 10);
    }

    #[test]
    fn test_contour_by_copy_and_move() {
        let mut pt = painter(10, 10);
        let sq = Contour::rectangle(p(0.0, 0.0), p(2.0, 2.0));
        pt.set_brush(BLUE);
        pt.contour(&sq);
        pt.translate(5.0, 5.0);
        pt.contour_owned(sq);
        pt.contour_owned(Contour::new());
        assert_eq!(pt.pending(), 2);
        pt.fill();
        assert_eq!(count(&pt, BLUE), 8);
    }

    #[test]
    fn test_pie_and_circle_fill() {
        let mut pt = painter(40, 40);
        pt.set_brush(BLUE);
        pt.circle(p(20.0, 20.0), 10.0);
        pt.fill();
        let n = count(&pt, BLUE);
        // pi * r^2 = 314
        assert!(n > 290 && n < 330, "{}", n);

        let mut pt = painter(40, 40);
        pt.set_brush(BLUE);
        pt.arc(p(20.0, 20.0), 10.0, 0.0, 90.0, true);
        pt.fill();
        let n = count(&pt, BLUE);
        assert!(n > 65 && n < 90, "{}", n);
        // Quarter above and to the right of the center
        let b = pt.backend().unwrap().buffer();
        assert_eq!(b.pixel(24, 16), Some(BLUE));
        assert_eq!(b.pixel(16, 24), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_operator_reaches_backend() {
        let mut pt = painter(4, 4);
        pt.set_oper(Operator::Set);
        pt.rectangle(p(0.0, 0.0), p(2.0, 2.0));
        pt.fill();
        assert_eq!(pt.backend().unwrap().operator(), Operator::Set);
        assert_eq!(count(&pt, Color::WHITE), 4);
    }

    #[test]
    fn test_pure_painter_is_noop() {
        let mut pt: Painter<BufferBackend> = Painter::pure(PainterConfig::default());
        assert!(pt.is_pure());
        pt.rectangle(p(0.0, 0.0), p(4.0, 4.0));
        pt.fill();
        pt.polygon(&[p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0)]);
        assert_eq!(pt.pool().live(), 0);

        assert!(pt.bind(BufferBackend::new(4, 4)).is_none());
        assert!(!pt.is_pure());
        assert!(pt.unbind().is_some());
    }

    #[test]
    fn test_reset_restores_baseline() {
        let mut pt = painter(4, 4);
        pt.push();
        pt.translate(3.0, 3.0);
        pt.push_window();
        pt.set_offset(PointI::new(1, 1));
        pt.rectangle(p(0.0, 0.0), p(1.0, 1.0));
        pt.reset();
        assert_eq!(pt.depth(), 1);
        assert_eq!(pt.window_depth(), 1);
        assert!(pt.matrix().is_identity());
        assert_eq!(pt.pending(), 0);
        assert_eq!(pt.pool().live(), 0);
    }

    #[test]
    fn test_offset_applies_to_pixmap_and_fill() {
        let mut pt = painter(10, 10);
        pt.set_offset(PointI::new(5, 5));
        pt.set_brush(BLUE);
        pt.rectangle(p(0.0, 0.0), p(1.0, 1.0));
        pt.draw_pixmap(
            Rc::new(Pixmap::filled(1, 1, Color::WHITE)),
            RectI::new(0, 0, 1, 1),
            p(2.0, 0.0),
            false,
        );
        pt.fill();
        let b = pt.backend().unwrap().buffer();
        assert_eq!(b.pixel(5, 5), Some(BLUE));
        assert_eq!(b.pixel(7, 5), Some(Color::WHITE));
    }
}
