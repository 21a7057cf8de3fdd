//! Source enumeration: which photos to export.
//!
//! Photos come from a Shotwell library. Shotwell keeps its catalog in a
//! SQLite database (`~/.local/share/shotwell/data/photo.db`) whose
//! `PhotoTable` holds one row per photo, with its absolute `filename` and a
//! `rating` from 0 to 5.
//!
//! ## Ordering is part of the contract
//!
//! Rows come back sorted by `(id, time_created, filename)`. Position in this
//! list decides which bucket directory a photo is exported to (see
//! [`naming`](crate::naming)), so a stable order means stable destinations
//! and cheap re-runs. Newly rated photos get higher ids and land at the end.
//!
//! ## Sampling
//!
//! A catalog larger than the export cap is randomly sampled down to the cap
//! after sorting. The sample does not keep the sorted order, so bucket
//! assignment is not stable across runs in that case.

use rand::Rng;
use rand::seq::SliceRandom;
use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

/// Highest rating Shotwell assigns (five stars).
pub const MAX_RATING: i64 = 5;

/// Upper bound on photos exported per run.
pub const MAX_EXPORT_COUNT: usize = 40_000;

const RATED_PHOTOS_SQL: &str = "SELECT filename FROM PhotoTable \
     WHERE rating = ?1 \
     ORDER BY id, time_created, filename ASC";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("photo catalog {} unavailable: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
}

/// A store that can list photos by rating.
pub trait PhotoCatalog {
    /// Filenames of photos with exactly `rating`, ordered by id, creation
    /// time, then filename.
    fn rated_filenames(&self, rating: i64) -> Result<Vec<PathBuf>, CatalogError>;
}

/// Shotwell's SQLite catalog, opened read-only.
pub struct ShotwellCatalog {
    path: PathBuf,
}

impl ShotwellCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn unavailable(&self, source: rusqlite::Error) -> CatalogError {
        CatalogError::Unavailable {
            path: self.path.clone(),
            source,
        }
    }

    fn open(&self) -> Result<Connection, CatalogError> {
        // Read-only so a running Shotwell is never disturbed; no CREATE so a
        // mistyped path fails instead of producing an empty database.
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| self.unavailable(e))
    }
}

impl PhotoCatalog for ShotwellCatalog {
    fn rated_filenames(&self, rating: i64) -> Result<Vec<PathBuf>, CatalogError> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare(RATED_PHOTOS_SQL)
            .map_err(|e| self.unavailable(e))?;

        // Reading as String rejects rows that are not valid UTF-8.
        let rows = stmt
            .query_map([rating], |row| row.get::<_, String>(0))
            .map_err(|e| self.unavailable(e))?;

        let mut filenames = Vec::new();
        for row in rows {
            filenames.push(PathBuf::from(row.map_err(|e| self.unavailable(e))?));
        }

        debug!(catalog = %self.path.display(), rating, count = filenames.len(), "queried catalog");
        Ok(filenames)
    }
}

/// Reduce `photos` to at most `max_count` entries by uniform random sampling.
///
/// Lists within the limit are returned unchanged, order included.
pub fn sample_to_limit<R: Rng + ?Sized>(
    photos: Vec<PathBuf>,
    max_count: usize,
    rng: &mut R,
) -> Vec<PathBuf> {
    if photos.len() <= max_count {
        return photos;
    }
    info!(
        available = photos.len(),
        max_count, "catalog exceeds export cap, sampling"
    );
    photos.choose_multiple(rng, max_count).cloned().collect()
}

/// Five-star photos from `catalog`, capped at `max_count`.
pub fn list_rated_photos<R: Rng + ?Sized>(
    catalog: &impl PhotoCatalog,
    max_count: usize,
    rng: &mut R,
) -> Result<Vec<PathBuf>, CatalogError> {
    let photos = catalog.rated_filenames(MAX_RATING)?;
    Ok(sample_to_limit(photos, max_count, rng))
}
