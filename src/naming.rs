//! Destination naming: where each exported photo lands.
//!
//! Shotwell imports photos into a `YYYY/MM/DD/` tree, so the three directories
//! above a photo's file name are its capture date. Destinations flatten that
//! date into the file name and spread files across fixed-size buckets:
//!
//! ```text
//! ~/Pictures/2022/06/01/IMG_1234.JPG   (position 0)
//! ~/Pictures/2022/06/01/IMG_1235.JPG   (position 1)
//!        ↓ pics_per_subdir = 1
//! <dest>/subdir00/2022-06-01-img-1234.jpg
//! <dest>/subdir01/2022-06-01-img-1235.jpg
//! ```
//!
//! ## Stability
//!
//! A destination depends only on the source path, its position in the list,
//! the bucket capacity and the destination root. The catalog returns photos
//! in a fixed order, so re-running against an unchanged catalog recomputes
//! the same paths, finds the files already there and does no work.
//!
//! ## Collisions
//!
//! Two sources collide only if their date label and file name slugify to the
//! same text and they fall in the same bucket. The later one is then skipped
//! as "already there". Nothing is overwritten.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Number of directories above the file name that make up the date label.
const DATE_DEPTH: usize = 3;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("bucket capacity must be at least 1")]
    ZeroCapacity,
    #[error("cannot create {}: {source}", path.display())]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One source photo and the path it will be exported to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCopy {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Bucket number (`position / pics_per_subdir`).
    pub bucket: usize,
}

/// Ordered source → destination mapping for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationPlan {
    pub entries: Vec<PlannedCopy>,
}

impl DestinationPlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Convert arbitrary text into a filesystem-safe token.
///
/// Typed apostrophes become separators before transliteration; any quote
/// produced by transliteration (`’` → `'`) is dropped. The text is then
/// lowercased, commas between two digits are removed, and every run of
/// other characters becomes a single dash. Leading and trailing dashes are
/// stripped. The output only contains `[a-z0-9-]`.
///
/// Existing exports are recognised by name alone, so these rules must stay
/// in step with the names earlier exports were written under.
///
/// - `"2022-06-01/IMG_1234"` → `"2022-06-01-img-1234"`
/// - `"Café au lait"` → `"cafe-au-lait"`
/// - `"Don't Panic!"` → `"don-t-panic"`
/// - `"1,000 Words"` → `"1000-words"`
pub fn slugify(text: &str) -> String {
    let ascii = deunicode::deunicode(&text.replace('\'', "-"))
        .to_ascii_lowercase()
        .replace('\'', "");
    let chars: Vec<char> = ascii.chars().collect();

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if c == ',' && is_digit_separator(&chars, i) {
            // 1,000 -> 1000
        } else {
            pending_dash = true;
        }
    }
    slug
}

fn is_digit_separator(chars: &[char], i: usize) -> bool {
    i > 0
        && chars[i - 1].is_ascii_digit()
        && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit())
}

/// The `-`-joined directories immediately above the file name.
///
/// Uses up to three directories; shallower paths give a shorter label and a
/// bare file name gives an empty one. Root and `.`/`..` components are not
/// counted.
pub fn date_label(source: &Path) -> String {
    let dirs: Vec<String> = source
        .parent()
        .map(|parent| {
            parent
                .components()
                .filter_map(|c| match c {
                    Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    let start = dirs.len().saturating_sub(DATE_DEPTH);
    dirs[start..].join("-")
}

/// File name a source is exported under: slugified date label and stem,
/// plus the original extension in lowercase.
pub fn destination_filename(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let label = date_label(source);
    let readable = if label.is_empty() {
        stem
    } else {
        format!("{label}/{stem}")
    };

    let ext = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default();

    format!("{}{}", slugify(&readable), ext)
}

/// Bucket directory name, zero-padded to at least two digits (`subdir07`, `subdir123`).
pub fn subdir_name(bucket: usize) -> String {
    format!("subdir{bucket:02}")
}

/// Bucket for the photo at `position`.
pub fn bucket_for(position: usize, pics_per_subdir: usize) -> usize {
    position / pics_per_subdir
}

/// Full destination path, without touching the filesystem.
pub fn destination_for(
    source: &Path,
    position: usize,
    pics_per_subdir: usize,
    dest_root: &Path,
) -> PathBuf {
    dest_root
        .join(subdir_name(bucket_for(position, pics_per_subdir)))
        .join(destination_filename(source))
}

/// Compute destinations for `sources` and create their bucket directories.
///
/// Each bucket directory is created once, with a single-level create, the
/// first time a photo lands in it. Existing directories are reused. A
/// missing `dest_root` is an error rather than being created here.
pub fn plan_destinations(
    sources: &[PathBuf],
    pics_per_subdir: usize,
    dest_root: &Path,
) -> Result<DestinationPlan, PlanError> {
    if pics_per_subdir == 0 {
        return Err(PlanError::ZeroCapacity);
    }

    let mut seen_buckets = BTreeSet::new();
    let mut entries = Vec::with_capacity(sources.len());

    for (position, source) in sources.iter().enumerate() {
        let bucket = bucket_for(position, pics_per_subdir);
        if seen_buckets.insert(bucket) {
            ensure_bucket_dir(&dest_root.join(subdir_name(bucket)))?;
        }
        entries.push(PlannedCopy {
            source: source.clone(),
            destination: destination_for(source, position, pics_per_subdir, dest_root),
            bucket,
        });
    }

    Ok(DestinationPlan { entries })
}

fn ensure_bucket_dir(dir: &Path) -> Result<(), PlanError> {
    if dir.is_dir() {
        return Ok(());
    }
    debug!(dir = %dir.display(), "creating bucket directory");
    fs::create_dir(dir).map_err(|source| PlanError::DirectoryCreate {
        path: dir.to_path_buf(),
        source,
    })
}
