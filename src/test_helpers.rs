//! Shared test utilities for the five-star-export test suite.
//!
//! Builds the two kinds of input the exporter reads: a Shotwell-shaped SQLite
//! catalog and image files on disk.
//!
//! ```text
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let db = create_catalog(tmp.path(), &[CatalogRow { id: 1, filename: "/p/a.jpg".into(), rating: 5, time_created: 0 }]);
//! create_test_jpeg(&tmp.path().join("a.jpg"), 64, 48);
//! ```

use image::{ImageEncoder, RgbImage};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

// =========================================================================
// Catalog fixtures
// =========================================================================

/// The subset of Shotwell's `PhotoTable` the exporter reads.
const PHOTO_TABLE_SCHEMA: &str = "CREATE TABLE PhotoTable (
    id INTEGER PRIMARY KEY,
    filename TEXT UNIQUE NOT NULL,
    width INTEGER,
    height INTEGER,
    filesize INTEGER,
    timestamp INTEGER,
    exposure_time INTEGER,
    time_created INTEGER,
    flags INTEGER DEFAULT 0,
    rating INTEGER DEFAULT 0,
    title TEXT
);";

/// One photo row.
#[derive(Debug, Clone)]
pub struct CatalogRow {
    pub id: i64,
    pub filename: String,
    pub rating: i64,
    pub time_created: i64,
}

/// Create `photo.db` in `dir` with the given rows, in the given insert order.
pub fn create_catalog(dir: &Path, rows: &[CatalogRow]) -> PathBuf {
    let path = dir.join("photo.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(PHOTO_TABLE_SCHEMA).unwrap();
    for row in rows {
        conn.execute(
            "INSERT INTO PhotoTable (id, filename, rating, time_created) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![row.id, row.filename, row.rating, row.time_created],
        )
        .unwrap();
    }
    path
}

// =========================================================================
// File fixtures
// =========================================================================

/// Create an empty file, including its parent directories.
pub fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"").unwrap();
}

/// Create a small valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}
