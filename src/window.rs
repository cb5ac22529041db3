//! Window state: where the current drawing context lands on the surface.
//!
//! Independent from the drawing state stack. Each level carries a
//! visibility flag, an optional obscured rectangle (device pixels that
//! belong to some other surface and must stay untouched) and an offset
//! added to every device coordinate at flush time.

use crate::basics::{PointI, RectI};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    pub visible: bool,
    pub obscured: Option<RectI>,
    pub offset: PointI,
}

impl Default for WindowState {
    fn default() -> Self {
        Self {
            visible: true,
            obscured: None,
            offset: PointI::new(0, 0),
        }
    }
}

impl WindowState {
    /// Split the run `x1..x2` on scanline `y` around the obscured
    /// rectangle. Yields up to two visible pieces, left to right.
    pub fn clip_span(&self, y: i32, x1: i32, x2: i32) -> [Option<(i32, i32)>; 2] {
        if x2 <= x1 {
            return [None, None];
        }
        let r = match self.obscured {
            Some(r) if !r.is_empty() && y >= r.y1 && y < r.y2 => r,
            _ => return [Some((x1, x2)), None],
        };
        if r.x2 <= x1 || r.x1 >= x2 {
            return [Some((x1, x2)), None];
        }
        let left = (r.x1 > x1).then_some((x1, r.x1));
        let right = (r.x2 < x2).then_some((r.x2, x2));
        [left, right]
    }

    /// `true` when nothing of `r` can be painted.
    pub fn hides(&self, r: &RectI) -> bool {
        if !self.visible || r.is_empty() {
            return true;
        }
        match self.obscured {
            Some(o) => o.x1 <= r.x1 && o.y1 <= r.y1 && o.x2 >= r.x2 && o.y2 >= r.y2,
            None => false,
        }
    }
}
