//! Image processing in pure Rust on the `image` crate.
//!
//! The exporter only ever asks one question of an image: does it fit the
//! pixel budget, and if not, shrink it in place. That is split in layers:
//!
//! ```text
//! shrink_to_budget (operations)
//!   ├── calculate_downscale_dimensions (calculations, pure)
//!   └── ImageBackend::identify / ::resize (backend)
//!         └── RustBackend: image_dimensions, Lanczos3 resize_exact, re-encode
//! ```
//!
//! [`ResizeParams`] carries the decision from the pure layer to the backend,
//! so tests can run the whole decision against a recording mock.

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{calculate_downscale_dimensions, fits_budget};
pub use operations::{ShrinkOutcome, shrink_to_budget};
pub use params::{Quality, ResizeParams};
pub use rust_backend::RustBackend;
