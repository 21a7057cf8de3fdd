//! Pure calculation functions for the pixel budget.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::Dimensions;

/// Whether an image of the given size stays within `max_pixels`.
///
/// The budget is inclusive: an image with exactly `max_pixels` pixels fits.
pub fn fits_budget(dims: Dimensions, max_pixels: u64) -> bool {
    dims.pixels() <= max_pixels
}

/// Calculate the downscaled size for an image that exceeds the pixel budget.
///
/// Returns `None` when the image already fits. Otherwise both edges are
/// scaled by the same factor `sqrt(max_pixels / pixels)` and floored, so the
/// aspect ratio is kept and the result never exceeds the budget. Each edge
/// is at least one pixel.
///
/// # Examples
/// ```
/// # use five_star_export::imaging::{Dimensions, calculate_downscale_dimensions};
/// // 4000x3000 = 12 MP into a 3 MP budget → half size on each edge
/// let small = calculate_downscale_dimensions(Dimensions { width: 4000, height: 3000 }, 3_000_000);
/// assert_eq!(small, Some(Dimensions { width: 2000, height: 1500 }));
/// ```
pub fn calculate_downscale_dimensions(dims: Dimensions, max_pixels: u64) -> Option<Dimensions> {
    if fits_budget(dims, max_pixels) {
        return None;
    }

    let scale = (max_pixels as f64 / dims.pixels() as f64).sqrt();
    let mut width = ((dims.width as f64 * scale).floor() as u32).max(1);
    let mut height = ((dims.height as f64 * scale).floor() as u32).max(1);

    // Float rounding can land a pixel row over the budget; trim the longer edge.
    while (width as u64) * (height as u64) > max_pixels && (width > 1 || height > 1) {
        if width >= height {
            width -= 1;
        } else {
            height -= 1;
        }
    }

    Some(Dimensions { width, height })
}
