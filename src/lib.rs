//! # scanpaint
//!
//! Retained-mode 2D painting engine for widget toolkits.
//!
//! Drawing calls build up pending primitives (paths, arcs, rectangles,
//! text runs, pixmap blits) under a stack of drawing states. A fill,
//! stroke or paint flushes them: curves are flattened to contours, the
//! contours are scan converted by a profile-based rasterizer into
//! horizontal runs, and the runs are handed to a [`Backend`].
//!
//! ## Architecture
//!
//! 1. **Painter**: drawing state, transform and window stacks, pending
//!    primitives held in a recycling pool
//! 2. **Lowering**: Bézier flattening and arc subdivision to device space
//!    contours
//! 3. **Rasterizer**: fixed-point profiles, exact per-scanline edge
//!    stepping, filling rule, merged spans
//! 4. **Backend**: the surface that receives runs, polylines and blits
//!
//! [`BufferBackend`] is an in-memory backend writing 32-bit pixels.

// Foundation types & math
pub mod basics;
pub mod color;
pub mod error;
pub mod math;
pub mod matrix;

// Geometry
pub mod arc;
pub mod contour;
pub mod curves;

// Scan conversion
pub mod rasterizer;

// Painter state & primitives
pub mod config;
pub mod font;
pub mod painter;
pub mod pixmap;
pub mod pool;
pub mod primitive;
pub mod state;
pub mod window;

// Backends
pub mod backend;
pub mod buffer_backend;

// Fonts
#[cfg(feature = "font")]
pub mod font_engine;

pub use backend::Backend;
pub use basics::{FillingRule, PointD, PointI, RectD, RectI};
pub use buffer_backend::{BufferBackend, PixelBuffer};
pub use color::Color;
pub use config::PainterConfig;
pub use contour::Contour;
pub use error::{Error, Result};
pub use font::{Font, FontMetrics, FontResolver, FontSpec};
pub use matrix::Matrix;
pub use painter::Painter;
pub use pixmap::Pixmap;
pub use state::{Brush, Operator, Pen};
pub use window::WindowState;
