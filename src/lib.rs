//! # five-star-export
//!
//! Copies every five-star photo in a Shotwell library into a flat,
//! slideshow-friendly directory tree, shrinking oversized images on the way.
//!
//! # Pipeline
//!
//! One run is a single sequential pass:
//!
//! ```text
//! 1. Enumerate   photo.db   →  ordered source paths       (catalog)
//! 2. Plan        sources    →  subdirNN/<date>-<name>.ext  (naming)
//! 3. Export      plan       →  copied + resized files      (export, imaging)
//! 4. Report      counts     →  one summary line            (output)
//! ```
//!
//! The destination files are the only state. A file that already exists is
//! a finished export, so re-running against an unchanged catalog is cheap:
//! nothing is copied, and only files still over the pixel budget are
//! touched.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | Reads five-star filenames from Shotwell's SQLite catalog, samples oversized result sets |
//! | [`naming`] | Date-label + slug destination names, bucket numbering, bucket directory creation |
//! | [`export`] | The copy/resize loop, run tallies, `--clear-all` |
//! | [`imaging`] | Pixel-budget math and in-place downscaling on the `image` crate |
//! | [`staging`] | Write-then-rename so destinations are never half written |
//! | [`config`] | CLI / TOML / default layering into an immutable [`config::RunConfig`] |
//! | [`output`] | Progress line, error lines and the final summary |
//!
//! # Design Decisions
//!
//! ## Position-Based Buckets
//!
//! Slideshow players and sync clients struggle with directories of tens of
//! thousands of files, so exports are split into `subdir00`, `subdir01`, …
//! of a fixed size. The bucket is the photo's position in the catalog order
//! divided by the bucket size. Newly rated photos usually have the highest
//! catalog ids, so they append to the last bucket and existing exports stay
//! where they are.
//!
//! ## Existence Is the Cache
//!
//! There is no manifest. If a destination exists it is not copied again and
//! its content is not compared. Deleting a file from the export tree makes
//! the next run copy it again; `--clear-all` starts over.
//!
//! ## Per-Photo Failures Never Stop the Run
//!
//! Catalogs outlive the files they point to. A missing source is reported
//! and counted, and the loop moves on. Failed resizes are reported but not
//! counted as errors, since the unresized copy is still a usable export.

pub mod catalog;
pub mod config;
pub mod export;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod staging;

#[cfg(test)]
pub(crate) mod test_helpers;
