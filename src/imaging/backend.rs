//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the exporter needs:
//! identify (read dimensions without a full decode) and resize (decode,
//! scale, re-encode over the same file).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the recording `MockBackend` below.

use super::params::ResizeParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Total pixel count (`width × height`), widened so it cannot overflow.
    pub fn pixels(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Resize `params.path` to exactly `params.width × params.height` and
    /// write the result back to the same path, keeping its format.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;
}
