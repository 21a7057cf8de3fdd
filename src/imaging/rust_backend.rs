//! Pure Rust image processing backend on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only, no full decode) |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` |
//! | Encode → other | `DynamicImage::save_with_format`, format from the extension |
//!
//! Output is written through [`staging::replace_atomically`], so a resize
//! that fails half way leaves the previously exported file intact.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{Quality, ResizeParams};
use crate::staging;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Output format for `path`, taken from its extension.
fn format_for(path: &Path) -> Result<ImageFormat, BackendError> {
    ImageFormat::from_path(path).map_err(|e| {
        BackendError::ProcessingFailed(format!(
            "Unsupported output format for {}: {}",
            path.display(),
            e
        ))
    })
}

/// Encode `img` as `format` into `out`.
fn save_image(
    img: &DynamicImage,
    out: &Path,
    format: ImageFormat,
    quality: Quality,
) -> Result<(), BackendError> {
    match format {
        ImageFormat::Jpeg => save_jpeg(img, out, quality),
        other => img
            .save_with_format(out, other)
            .map_err(|e| BackendError::ProcessingFailed(format!("{other:?} encode failed: {e}"))),
    }
}

fn save_jpeg(img: &DynamicImage, out: &Path, quality: Quality) -> Result<(), BackendError> {
    // JPEG has no alpha and no 16-bit mode.
    let img = match img {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => img.clone(),
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    };
    let file = std::fs::File::create(out).map_err(BackendError::Io)?;
    let writer = std::io::BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(writer, quality.value());
    img.write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        let format = format_for(&params.path)?;
        let img = load_image(&params.path)?;
        let resized = img.resize_exact(params.width, params.height, FilterType::Lanczos3);
        staging::replace_atomically(&params.path, |staging| {
            save_image(&resized, staging, format, params.quality)
        })
    }
}
