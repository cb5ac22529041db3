//! Crate error type.
//!
//! Geometry never fails: empty or degenerate paths are silently dropped.
//! Errors only come from the resource boundaries (fonts and pixmaps).

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("no font matches family {family:?}")]
    FontNotFound { family: String },

    #[error("invalid font data: {0}")]
    FontData(String),

    #[error("pixmap data is {actual} bytes, expected {expected}")]
    PixmapSize { expected: usize, actual: usize },

    #[error("unsupported pixmap depth {0}")]
    UnsupportedDepth(u8),
}

pub type Result<T> = std::result::Result<T, Error>;
