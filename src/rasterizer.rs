//! Profile-based scanline polygon rasterizer.
//!
//! Contours are decomposed into raster profiles, one per maximal run of
//! edges that moves monotonically in y. Every profile stores the x where
//! it crosses each scanline centre it covers, computed with an exact
//! integer DDA in 64-bit fixed point. The sweep then walks scanlines top
//! to bottom, activates profiles as their first scanline is reached,
//! orders the active ones by x and accumulates winding left to right to
//! find the inside runs.
//!
//! Sampling rules (all half-open, so shared vertices and abutting shapes
//! never double-cover):
//!
//! - scanline `y` is covered by a run spanning `[y0, y1)` when the row
//!   centre `y + 0.5` lies in that interval;
//! - pixel `x` is inside a run `[xl, xr)` when `x + 0.5` lies in it.
//!
//! A rasterizer is consumed by [`Rasterizer::sweep`]: nothing survives
//! from one fill to the next.

use log::trace;

use crate::basics::{FillingRule, PointD, RectI};
use crate::contour::Contour;

// ============================================================================
// Fixed point
// ============================================================================

pub const FIXED_SHIFT: u32 = 16;
pub const FIXED_ONE: i64 = 1 << FIXED_SHIFT;
const FIXED_HALF: i64 = FIXED_ONE / 2;

/// Coordinates are clamped to +/- this many pixels before conversion.
pub const COORD_LIMIT: f64 = (1u64 << 24) as f64;

#[inline]
pub fn to_fixed(v: f64) -> i64 {
    (v.clamp(-COORD_LIMIT, COORD_LIMIT) * FIXED_ONE as f64).round() as i64
}

/// First integer cell whose centre is at or after `v`.
#[inline]
fn ceil_centre(v: i64) -> i64 {
    (v - FIXED_HALF + FIXED_ONE - 1) >> FIXED_SHIFT
}

#[inline]
fn is_centre_aligned(v: i64) -> bool {
    (v - FIXED_HALF) & (FIXED_ONE - 1) == 0
}

// ============================================================================
// Span output
// ============================================================================

/// Receiver of inside runs. `x1..x2` is half-open.
pub trait SpanSink {
    fn span(&mut self, y: i32, x1: i32, x2: i32);
}

impl<F: FnMut(i32, i32, i32)> SpanSink for F {
    fn span(&mut self, y: i32, x1: i32, x2: i32) {
        self(y, x1, x2)
    }
}

// ============================================================================
// Profiles
// ============================================================================

/// One monotonic edge run in scanline space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// First covered scanline.
    pub start: i32,
    /// Number of covered scanlines.
    pub height: u32,
    /// Index of this profile's first x in the shared x table.
    pub offset: usize,
    /// `true` when y grows along the contour direction.
    pub ascending: bool,
    /// The run's top end is not on a scanline centre.
    pub overshoot_top: bool,
    /// The run's bottom end is not on a scanline centre.
    pub overshoot_bottom: bool,
    countdown: i32,
}

impl Profile {
    #[inline]
    pub fn winding(&self) -> i32 {
        if self.ascending {
            1
        } else {
            -1
        }
    }

    /// One past the last covered scanline.
    #[inline]
    pub fn end(&self) -> i32 {
        self.start + self.height as i32
    }
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
}

impl Edge {
    #[inline]
    fn ascending(&self) -> bool {
        self.y1 > self.y0
    }

    /// Same edge oriented top to bottom.
    #[inline]
    fn downward(&self) -> Edge {
        if self.ascending() {
            *self
        } else {
            Edge {
                x0: self.x1,
                y0: self.y1,
                x1: self.x0,
                y1: self.y0,
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveEdge {
    x: i64,
    winding: i32,
    profile: usize,
    row: u32,
}

// ============================================================================
// Rasterizer
// ============================================================================

pub struct Rasterizer {
    filling_rule: FillingRule,
    clip_box: Option<RectI>,
    profiles: Vec<Profile>,
    xs: Vec<i64>,
    edges: Vec<Edge>,
}

impl Rasterizer {
    pub fn new(filling_rule: FillingRule) -> Self {
        Self {
            filling_rule,
            clip_box: None,
            profiles: Vec::new(),
            xs: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn filling_rule(&self) -> FillingRule {
        self.filling_rule
    }

    pub fn set_filling_rule(&mut self, rule: FillingRule) {
        self.filling_rule = rule;
    }

    /// Restrict output to a device rectangle. Set before adding contours:
    /// profiles only record the scanlines inside the box.
    pub fn set_clip_box(&mut self, clip: Option<RectI>) {
        self.clip_box = clip;
    }

    pub fn clip_box(&self) -> Option<RectI> {
        self.clip_box
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    /// x (fixed point) of `profile` at its `row`-th scanline.
    pub fn profile_x(&self, profile: &Profile, row: u32) -> Option<i64> {
        if row >= profile.height {
            return None;
        }
        self.xs.get(profile.offset + row as usize).copied()
    }

    pub fn add_contour(&mut self, contour: &Contour) {
        self.add_points(contour.points());
    }

    pub fn add_contours<'a, I>(&mut self, contours: I)
    where
        I: IntoIterator<Item = &'a Contour>,
    {
        for c in contours {
            self.add_contour(c);
        }
    }

    /// Add one implicitly closed polygon. Non-finite points are dropped;
    /// fewer than three remaining points add nothing.
    pub fn add_points(&mut self, points: &[PointD]) {
        let fixed: Vec<(i64, i64)> = points
            .iter()
            .filter(|p| p.is_finite())
            .map(|p| (to_fixed(p.x), to_fixed(p.y)))
            .collect();
        if fixed.len() < 3 {
            return;
        }

        self.edges.clear();
        let n = fixed.len();
        for i in 0..n {
            let (x0, y0) = fixed[i];
            let (x1, y1) = fixed[(i + 1) % n];
            // Horizontal edges cover no scanline centre and never break a run.
            if y0 != y1 {
                self.edges.push(Edge { x0, y0, x1, y1 });
            }
        }
        if self.edges.is_empty() {
            return;
        }

        // A closed contour that moves in y moves both ways, so a direction
        // change exists. Start the walk right after one so runs never
        // straddle the wrap-around.
        let m = self.edges.len();
        let first = (0..m)
            .find(|&i| self.edges[i].ascending() != self.edges[(i + m - 1) % m].ascending())
            .unwrap_or(0);

        let mut run_start = 0;
        while run_start < m {
            let ascending = self.edges[(first + run_start) % m].ascending();
            let mut run_end = run_start + 1;
            while run_end < m && self.edges[(first + run_end) % m].ascending() == ascending {
                run_end += 1;
            }
            let run: Vec<Edge> = (run_start..run_end)
                .map(|k| self.edges[(first + k) % m])
                .collect();
            self.add_run(&run, ascending);
            run_start = run_end;
        }
    }

    /// Build one profile from consecutive same-direction edges.
    fn add_run(&mut self, run: &[Edge], ascending: bool) {
        // Oriented top to bottom, in scanline order.
        let mut down: Vec<Edge> = run.iter().map(Edge::downward).collect();
        if !ascending {
            down.reverse();
        }
        let (top, bottom) = match (down.first(), down.last()) {
            (Some(f), Some(l)) => (f.y0, l.y1),
            _ => return,
        };

        let (clip_lo, clip_hi) = match self.clip_box {
            Some(c) => (c.y1 as i64, c.y2 as i64),
            None => (i64::MIN, i64::MAX),
        };
        let start = ceil_centre(top).max(clip_lo);
        let end = ceil_centre(bottom).min(clip_hi);
        if end <= start {
            return;
        }

        let offset = self.xs.len();
        self.xs.reserve((end - start) as usize);
        for e in &down {
            let first = ceil_centre(e.y0).max(start);
            let last = ceil_centre(e.y1).min(end);
            if last > first {
                step_edge(e, first, last, &mut self.xs);
            }
        }

        self.profiles.push(Profile {
            start: start as i32,
            height: (end - start) as u32,
            offset,
            ascending,
            overshoot_top: !is_centre_aligned(top),
            overshoot_bottom: !is_centre_aligned(bottom),
            countdown: 0,
        });
    }

    /// Sweep all scanlines and hand every inside run to `sink`.
    ///
    /// Runs on one scanline are emitted left to right; touching runs are
    /// merged into one.
    pub fn sweep<S: SpanSink + ?Sized>(mut self, sink: &mut S) {
        if self.profiles.is_empty() {
            return;
        }
        // Stable: ties keep insertion order.
        self.profiles.sort_by_key(|p| p.start);

        let y_min = self.profiles[0].start;
        let y_max = self.profiles.iter().map(Profile::end).max().unwrap_or(y_min);
        for p in &mut self.profiles {
            p.countdown = p.start - y_min;
        }
        trace!(
            "rasterizer: {} profiles, scanlines {}..{}",
            self.profiles.len(),
            y_min,
            y_max
        );

        let (clip_x1, clip_x2) = match self.clip_box {
            Some(c) => (c.x1, c.x2),
            None => (i32::MIN, i32::MAX),
        };

        let mut next = 0;
        let mut active: Vec<ActiveEdge> = Vec::new();
        for y in y_min..y_max {
            while next < self.profiles.len() && self.profiles[next].countdown == 0 {
                let p = &self.profiles[next];
                active.push(ActiveEdge {
                    x: 0,
                    winding: p.winding(),
                    profile: next,
                    row: 0,
                });
                next += 1;
            }
            for p in &mut self.profiles[next..] {
                p.countdown -= 1;
            }

            for a in &mut active {
                a.x = self.xs[self.profiles[a.profile].offset + a.row as usize];
            }
            insertion_sort_by_x(&mut active);

            let mut winding = 0;
            let mut left = 0;
            let mut pending: Option<(i32, i32)> = None;
            for a in &active {
                let was_inside = self.filling_rule.is_inside(winding);
                winding += a.winding;
                let inside = self.filling_rule.is_inside(winding);
                if !was_inside && inside {
                    left = a.x;
                } else if was_inside && !inside {
                    let x1 = (ceil_centre(left) as i32).max(clip_x1);
                    let x2 = (ceil_centre(a.x) as i32).min(clip_x2);
                    if x2 > x1 {
                        pending = match pending {
                            Some((px1, px2)) if x1 <= px2 => Some((px1, px2.max(x2))),
                            Some((px1, px2)) => {
                                sink.span(y, px1, px2);
                                Some((x1, x2))
                            }
                            None => Some((x1, x2)),
                        };
                    }
                }
            }
            if let Some((x1, x2)) = pending {
                sink.span(y, x1, x2);
            }

            for a in &mut active {
                a.row += 1;
            }
            let profiles = &self.profiles;
            active.retain(|a| a.row < profiles[a.profile].height);
        }
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new(FillingRule::default())
    }
}

/// Push the x crossings of edge `e` at scanline centres `first..last`.
///
/// The first crossing is computed directly in 128-bit arithmetic; the rest
/// advance by an integer step plus a remainder, so the result is exact
/// (floor of the true value) on every scanline.
fn step_edge(e: &Edge, first: i64, last: i64, xs: &mut Vec<i64>) {
    let dx = (e.x1 - e.x0) as i128;
    let dy = (e.y1 - e.y0) as i128;
    let yc = ((first << FIXED_SHIFT) + FIXED_HALF - e.y0) as i128;

    let num = dx * yc;
    let mut x = e.x0 + num.div_euclid(dy) as i64;
    let mut rem = num.rem_euclid(dy) as i64;

    let step = dx * FIXED_ONE as i128;
    let ix = step.div_euclid(dy) as i64;
    let rx = step.rem_euclid(dy) as i64;
    let dy = dy as i64;

    for _ in first..last {
        xs.push(x);
        x += ix;
        rem += rx;
        if rem >= dy {
            rem -= dy;
            x += 1;
        }
    }
}

fn insertion_sort_by_x(active: &mut [ActiveEdge]) {
    for i in 1..active.len() {
        let mut j = i;
        while j > 0 && active[j - 1].x > active[j].x {
            active.swap(j - 1, j);
            j -= 1;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> PointD {
        PointD::new(x, y)
    }

    fn square(x1: f64, y1: f64, x2: f64, y2: f64, clockwise: bool) -> Vec<PointD> {
        let mut pts = vec![p(x1, y1), p(x2, y1), p(x2, y2), p(x1, y2)];
        if !clockwise {
            pts.reverse();
        }
        pts
    }

    fn fill(contours: &[Vec<PointD>], rule: FillingRule) -> Vec<RectI> {
        let mut ras = Rasterizer::new(rule);
        for c in contours {
            ras.add_points(c);
        }
        collect(ras)
    }

    fn collect(ras: Rasterizer) -> Vec<RectI> {
        let mut spans = Vec::new();
        ras.sweep(&mut |y, x1, x2| spans.push(RectI::new(x1, y, x2, y + 1)));
        spans
    }

    #[test]
    fn test_fixed_conversion() {
        assert_eq!(to_fixed(1.0), FIXED_ONE);
        assert_eq!(to_fixed(-0.5), -FIXED_HALF);
        assert_eq!(ceil_centre(0), 0);
        assert_eq!(ceil_centre(FIXED_HALF), 0);
        assert_eq!(ceil_centre(FIXED_HALF + 1), 1);
        assert_eq!(ceil_centre(-FIXED_ONE), -1);
        assert_eq!(to_fixed(f64::MAX), to_fixed(COORD_LIMIT));
    }

    #[test]
    fn test_square_one_run_per_scanline() {
        let spans = fill(&[square(0.0, 0.0, 10.0, 10.0, true)], FillingRule::NonZero);
        assert_eq!(spans.len(), 10);
        for (y, s) in spans.iter().enumerate() {
            assert_eq!(*s, RectI::new(0, y as i32, 10, y as i32 + 1));
        }
    }

    #[test]
    fn test_orientation_does_not_matter() {
        let cw = fill(&[square(2.0, 3.0, 7.0, 9.0, true)], FillingRule::NonZero);
        let ccw = fill(&[square(2.0, 3.0, 7.0, 9.0, false)], FillingRule::NonZero);
        assert_eq!(cw, ccw);
        assert_eq!(cw.len(), 6);
    }

    #[test]
    fn test_donut_opposite_winding() {
        let outer = square(0.0, 0.0, 10.0, 10.0, true);
        let inner = square(3.0, 3.0, 7.0, 7.0, false);
        for rule in [FillingRule::NonZero, FillingRule::EvenOdd] {
            let spans = fill(&[outer.clone(), inner.clone()], rule);
            for y in 0..10 {
                let row: Vec<_> = spans.iter().filter(|s| s.y1 == y).collect();
                if (3..7).contains(&y) {
                    assert_eq!(row.len(), 2, "row {}", y);
                    assert_eq!((row[0].x1, row[0].x2), (0, 3));
                    assert_eq!((row[1].x1, row[1].x2), (7, 10));
                } else {
                    assert_eq!(row.len(), 1, "row {}", y);
                    assert_eq!((row[0].x1, row[0].x2), (0, 10));
                }
            }
        }
    }

    #[test]
    fn test_same_winding_hole_depends_on_rule() {
        let outer = square(0.0, 0.0, 10.0, 10.0, true);
        let inner = square(3.0, 3.0, 7.0, 7.0, true);
        let nz = fill(&[outer.clone(), inner.clone()], FillingRule::NonZero);
        assert_eq!(nz.len(), 10);
        let eo = fill(&[outer, inner], FillingRule::EvenOdd);
        assert_eq!(eo.len(), 14);
    }

    #[test]
    fn test_fewer_than_three_points() {
        assert!(fill(&[vec![]], FillingRule::NonZero).is_empty());
        assert!(fill(&[vec![p(0.0, 0.0), p(5.0, 5.0)]], FillingRule::NonZero).is_empty());
        let mut ras = Rasterizer::default();
        ras.add_points(&[p(0.0, 0.0), p(f64::NAN, 1.0), p(5.0, 5.0)]);
        assert!(ras.profiles().is_empty());
    }

    #[test]
    fn test_zero_height_contour() {
        let flat = vec![p(0.0, 4.0), p(5.0, 4.0), p(9.0, 4.0)];
        let mut ras = Rasterizer::default();
        ras.add_points(&flat);
        assert!(ras.profiles().is_empty());
        assert!(fill(&[flat], FillingRule::NonZero).is_empty());
    }

    #[test]
    fn test_profiles_per_monotonic_run() {
        // Triangle: one ascending run, one descending run
        let mut ras = Rasterizer::default();
        ras.add_points(&[p(0.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)]);
        assert_eq!(ras.profiles().len(), 2);
        assert_eq!(
            ras.profiles().iter().filter(|p| p.ascending).count(),
            1
        );

        // Zig-zag with two peaks produces four runs
        let mut ras = Rasterizer::default();
        ras.add_points(&[
            p(0.0, 10.0),
            p(2.0, 0.0),
            p(4.0, 6.0),
            p(6.0, 0.0),
            p(8.0, 10.0),
        ]);
        assert_eq!(ras.profiles().len(), 4);
    }

    #[test]
    fn test_run_wraps_around_contour_start() {
        // Starts mid-way down the left edge: the left side is split by the
        // contour start but still forms a single profile.
        let mut ras = Rasterizer::default();
        ras.add_points(&[p(0.0, 5.0), p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)]);
        assert_eq!(ras.profiles().len(), 2);
        for prof in ras.profiles() {
            assert_eq!(prof.start, 0);
            assert_eq!(prof.height, 10);
        }
    }

    #[test]
    fn test_overshoot_flags() {
        let mut ras = Rasterizer::default();
        ras.add_points(&square(0.0, 0.5, 4.0, 3.2, true));
        for prof in ras.profiles() {
            assert!(!prof.overshoot_top);
            assert!(prof.overshoot_bottom);
            assert_eq!(prof.start, 0);
            assert_eq!(prof.height, 3);
        }
    }

    #[test]
    fn test_exact_slope() {
        // Right edge x = y / 3 + 3 sampled at row centres
        let mut ras = Rasterizer::default();
        ras.add_points(&[p(0.0, 0.0), p(3.0, 0.0), p(33.0, 90.0), p(0.0, 90.0)]);
        let right = ras
            .profiles()
            .iter()
            .find(|p| p.ascending)
            .cloned()
            .unwrap();
        for row in 0..right.height {
            let yc = row as f64 + 0.5;
            let expect = to_fixed(3.0 + yc / 3.0);
            let got = ras.profile_x(&right, row).unwrap();
            assert!((got - expect).abs() <= 1, "row {}: {} vs {}", row, got, expect);
        }
        assert!(ras.profile_x(&right, right.height).is_none());
    }

    #[test]
    fn test_subpixel_span_edges() {
        // Pixel is covered when its centre is inside
        let spans = fill(&[square(0.4, 0.0, 3.6, 1.0, true)], FillingRule::NonZero);
        assert_eq!(spans, vec![RectI::new(0, 0, 4, 1)]);
        let spans = fill(&[square(0.6, 0.0, 3.4, 1.0, true)], FillingRule::NonZero);
        assert_eq!(spans, vec![RectI::new(1, 0, 3, 1)]);
    }

    #[test]
    fn test_overlapping_shapes_merge() {
        let a = square(0.0, 0.0, 6.0, 2.0, true);
        let b = square(6.0, 0.0, 9.0, 2.0, true);
        let spans = fill(&[a, b], FillingRule::NonZero);
        assert_eq!(spans, vec![RectI::new(0, 0, 9, 1), RectI::new(0, 1, 9, 2)]);
    }

    #[test]
    fn test_self_intersecting_bowtie() {
        let bowtie = vec![p(0.0, 0.0), p(20.0, 10.0), p(20.0, 0.0), p(0.0, 10.0)];
        let spans = fill(&[bowtie], FillingRule::NonZero);
        for y in 0..10 {
            let row: Vec<_> = spans.iter().filter(|s| s.y1 == y).collect();
            assert_eq!(row.len(), 2, "row {}", y);
        }
        assert_eq!(spans[0], RectI::new(0, 0, 1, 1));
        assert_eq!(spans[1], RectI::new(19, 0, 20, 1));
    }

    #[test]
    fn test_clip_box() {
        let mut ras = Rasterizer::default();
        ras.set_clip_box(Some(RectI::new(2, 3, 5, 6)));
        ras.add_points(&square(0.0, 0.0, 10.0, 10.0, true));
        let spans = collect(ras);
        assert_eq!(spans.len(), 3);
        for (i, s) in spans.iter().enumerate() {
            assert_eq!(*s, RectI::new(2, 3 + i as i32, 5, 4 + i as i32));
        }
    }

    #[test]
    fn test_closure_sink() {
        let mut ras = Rasterizer::default();
        ras.add_points(&square(-3.0, -2.0, 1.0, 0.0, true));
        let mut rows = Vec::new();
        ras.sweep(&mut |y, x1, x2| rows.push((y, x1, x2)));
        assert_eq!(rows, vec![(-2, -3, 1), (-1, -3, 1)]);
    }

    #[test]
    fn test_huge_coordinates_do_not_overflow() {
        let mut ras = Rasterizer::default();
        ras.set_clip_box(Some(RectI::new(0, 0, 8, 8)));
        ras.add_points(&[p(-1e300, 0.0), p(1e300, 0.0), p(1e300, 4.0), p(-1e300, 4.0)]);
        let spans = collect(ras);
        assert_eq!(spans.len(), 4);
        assert!(spans.iter().all(|s| s.x1 == 0 && s.x2 == 8));
    }
}
