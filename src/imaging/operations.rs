//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::calculate_downscale_dimensions;
use super::params::{Quality, ResizeParams};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// What [`shrink_to_budget`] did to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShrinkOutcome {
    /// Already within the pixel budget; the file was not touched.
    WithinBudget(Dimensions),
    /// Rewritten in place at a smaller size.
    Resized { from: Dimensions, to: Dimensions },
}

impl ShrinkOutcome {
    pub fn was_resized(&self) -> bool {
        matches!(self, Self::Resized { .. })
    }
}

/// Downscale `path` in place if it has more than `max_pixels` pixels.
///
/// Only the header is read for images that fit; a full decode and re-encode
/// happens only when the image is over budget.
pub fn shrink_to_budget(
    backend: &impl ImageBackend,
    path: &Path,
    max_pixels: u64,
    quality: Quality,
) -> Result<ShrinkOutcome> {
    let dims = backend.identify(path)?;
    let Some(target) = calculate_downscale_dimensions(dims, max_pixels) else {
        return Ok(ShrinkOutcome::WithinBudget(dims));
    };

    backend.resize(&ResizeParams {
        path: path.to_path_buf(),
        width: target.width,
        height: target.height,
        quality,
    })?;

    Ok(ShrinkOutcome::Resized {
        from: dims,
        to: target,
    })
}
