//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They sit between
//! [`operations`](super::operations), which decides whether an exported photo
//! needs shrinking, and the [`backend`](super::backend), which does the pixel
//! work. Keeping them plain data lets tests swap in a mock backend and assert
//! on the exact parameters that would have been executed.
//!
//! - [`Quality`]: lossy re-encode quality (1-100, default 90). Clamped on construction.
//! - [`ResizeParams`]: in-place resize of a file with exact output dimensions and quality.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
///
/// Only JPEG output honours it; lossless formats ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8")]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

impl From<u8> for Quality {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

/// Parameters for resizing a file and writing the result back over it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}
