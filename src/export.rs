//! Copy and resize: the export loop.
//!
//! Each planned photo goes through two steps, strictly one photo at a time:
//!
//! ```text
//! copy ──► copied ─────────┐
//!      ├─► already there ──┼─► resize ──► resized | within budget | resize error
//!      └─► copy error (stop here)
//! ```
//!
//! - **Copy.** An existing destination is trusted as a finished export and
//!   counted as "already there"; its content is not compared. Otherwise the
//!   source is copied through [`staging::copy_atomically`]. Any copy failure
//!   (usually a photo deleted from disk but still in the catalog) is printed,
//!   counted as an error, and the photo's resize step is skipped.
//! - **Resize.** Unless resizing is disabled, destinations over the pixel
//!   budget are downscaled in place. Already-present files go through this
//!   step too, so lowering the budget shrinks earlier exports. A decode or
//!   encode failure is printed but counted neither as resized nor as an
//!   error; the copied file is still a valid export.
//!
//! No per-photo failure stops the batch. Only setup failures (creating
//! bucket directories, writing to stdout) end the run early.

use crate::config::RunConfig;
use crate::imaging::{ImageBackend, shrink_to_budget};
use crate::naming::{DestinationPlan, PlanError, PlannedCopy, plan_destinations};
use crate::output::{ProgressReporter, format_copy_error, format_resize_error};
use crate::staging;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("cannot clear destination {}: {source}", path.display())]
    Clear {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write progress output: {0}")]
    Output(#[source] io::Error),
}

/// Tallies for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunCounts {
    /// Destinations that already existed and were left alone.
    pub already_there: usize,
    /// Photos newly copied this run.
    pub copied: usize,
    /// Photos that could not be copied.
    pub error: usize,
    /// Sources whose exported copy was downscaled this run.
    pub resized: Vec<PathBuf>,
}

/// Result of the copy step for one photo.
#[derive(Debug)]
pub enum CopyOutcome {
    Copied,
    AlreadyPresent,
    Failed(io::Error),
}

/// Copy `source` to `destination` unless something is already there.
pub fn copy_if_absent(source: &Path, destination: &Path) -> CopyOutcome {
    if destination.exists() {
        return CopyOutcome::AlreadyPresent;
    }
    match staging::copy_atomically(source, destination) {
        Ok(bytes) => {
            debug!(source = %source.display(), dest = %destination.display(), bytes, "copied");
            CopyOutcome::Copied
        }
        Err(e) => CopyOutcome::Failed(e),
    }
}

/// Run the copy and resize steps over a plan.
pub fn execute<W: Write>(
    plan: &DestinationPlan,
    config: &RunConfig,
    backend: &impl ImageBackend,
    out: W,
) -> Result<RunCounts, ExportError> {
    let mut progress = ProgressReporter::new(out, plan.len());
    progress.start().map_err(ExportError::Output)?;

    let mut counts = RunCounts::default();
    for (index, entry) in plan.entries.iter().enumerate() {
        let resized = export_one(index, entry, config, backend, &mut counts, &mut progress)?;
        progress
            .item_done(index, &entry.source, resized)
            .map_err(ExportError::Output)?;
    }

    info!(
        copied = counts.copied,
        already_there = counts.already_there,
        errors = counts.error,
        resized = counts.resized.len(),
        "export finished"
    );
    Ok(counts)
}

/// Copy and resize a single planned photo. Returns whether it was resized.
fn export_one<W: Write>(
    index: usize,
    entry: &PlannedCopy,
    config: &RunConfig,
    backend: &impl ImageBackend,
    counts: &mut RunCounts,
    progress: &mut ProgressReporter<W>,
) -> Result<bool, ExportError> {
    match copy_if_absent(&entry.source, &entry.destination) {
        CopyOutcome::Copied => counts.copied += 1,
        CopyOutcome::AlreadyPresent => counts.already_there += 1,
        CopyOutcome::Failed(e) => {
            debug!(source = %entry.source.display(), error = %e, "copy failed");
            counts.error += 1;
            progress
                .error_line(&format_copy_error(&entry.source, &e))
                .map_err(ExportError::Output)?;
            return Ok(false);
        }
    }

    if config.resize_skip {
        return Ok(false);
    }

    match shrink_to_budget(
        backend,
        &entry.destination,
        config.max_pixels,
        config.jpeg_quality,
    ) {
        Ok(outcome) if outcome.was_resized() => {
            debug!(dest = %entry.destination.display(), ?outcome, "resized");
            counts.resized.push(entry.source.clone());
            Ok(true)
        }
        Ok(_) => Ok(false),
        Err(e) => {
            debug!(dest = %entry.destination.display(), error = %e, "resize failed");
            progress
                .error_line(&format_resize_error(index, &entry.source, &e))
                .map_err(ExportError::Output)?;
            Ok(false)
        }
    }
}

/// Plan destinations for `sources`, then copy and resize them.
pub fn copy_and_resize<W: Write>(
    sources: &[PathBuf],
    config: &RunConfig,
    backend: &impl ImageBackend,
    out: W,
) -> Result<RunCounts, ExportError> {
    let plan = plan_destinations(sources, config.pics_per_subdir, &config.dest_root)?;
    execute(&plan, config, backend, out)
}

/// Delete everything under `dest_root` and recreate it empty.
///
/// A root that does not exist yet is simply created.
pub fn clear_destination(dest_root: &Path) -> Result<(), ExportError> {
    let clear_err = |source: io::Error| ExportError::Clear {
        path: dest_root.to_path_buf(),
        source,
    };
    match fs::remove_dir_all(dest_root) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(clear_err(e)),
    }
    fs::create_dir(dest_root).map_err(clear_err)?;
    info!(dest = %dest_root.display(), "cleared destination");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Quality;
    use crate::imaging::backend::tests::MockBackend;
    use crate::test_helpers::{create_test_jpeg, touch};
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        source_root: PathBuf,
        config: RunConfig,
    }

    fn fixture() -> Fixture {
        let tmp = TempDir::new().unwrap();
        let source_root = tmp.path().join("Pictures");
        let dest_root = tmp.path().join("five-star-pics");
        fs::create_dir_all(&dest_root).unwrap();
        let config = RunConfig {
            clear_all: false,
            resize_skip: false,
            max_pixels: 1_000,
            pics_per_subdir: 2,
            dest_root,
            catalog_path: tmp.path().join("photo.db"),
            jpeg_quality: Quality::default(),
        };
        Fixture {
            _tmp: tmp,
            source_root,
            config,
        }
    }

    impl Fixture {
        fn source(&self, rel: &str) -> PathBuf {
            let p = self.source_root.join(rel);
            touch(&p);
            p
        }

        fn dest(&self, rel: &str) -> PathBuf {
            self.config.dest_root.join(rel)
        }
    }

    fn run(f: &Fixture, sources: &[PathBuf], backend: &MockBackend) -> (RunCounts, String) {
        let mut out = Vec::new();
        let counts = copy_and_resize(sources, &f.config, backend, &mut out).unwrap();
        (counts, String::from_utf8(out).unwrap())
    }

    #[test]
    fn copies_new_files_into_buckets() {
        let f = fixture();
        let sources = vec![
            f.source("2022/06/01/a.jpg"),
            f.source("2022/06/01/b.jpg"),
            f.source("2022/06/02/c.jpg"),
        ];
        let backend = MockBackend::new()
            .with_image("2022-06-01-a.jpg", 10, 10)
            .with_image("2022-06-01-b.jpg", 10, 10)
            .with_image("2022-06-02-c.jpg", 10, 10);

        let (counts, _) = run(&f, &sources, &backend);

        assert_eq!(counts.copied, 3);
        assert_eq!(counts.already_there, 0);
        assert_eq!(counts.error, 0);
        assert!(counts.resized.is_empty());
        assert!(f.dest("subdir00/2022-06-01-a.jpg").is_file());
        assert!(f.dest("subdir00/2022-06-01-b.jpg").is_file());
        assert!(f.dest("subdir01/2022-06-02-c.jpg").is_file());
    }

    #[test]
    fn second_run_finds_everything_already_there() {
        let f = fixture();
        let sources = vec![f.source("2022/06/01/a.jpg"), f.source("2022/06/01/b.jpg")];
        let backend = MockBackend::new()
            .with_image("2022-06-01-a.jpg", 10, 10)
            .with_image("2022-06-01-b.jpg", 10, 10);

        run(&f, &sources, &backend);
        let (counts, _) = run(&f, &sources, &backend);

        assert_eq!(counts.copied, 0);
        assert_eq!(counts.already_there, 2);
        assert_eq!(counts.error, 0);
    }

    #[test]
    fn existing_destination_is_not_overwritten() {
        let f = fixture();
        let sources = vec![f.source("2022/06/01/a.jpg")];
        fs::create_dir_all(f.dest("subdir00")).unwrap();
        fs::write(f.dest("subdir00/2022-06-01-a.jpg"), b"older export").unwrap();

        let (counts, _) = run(&f, &sources, &MockBackend::new().with_image("2022-06-01-a.jpg", 1, 1));

        assert_eq!(counts.already_there, 1);
        assert_eq!(
            fs::read(f.dest("subdir00/2022-06-01-a.jpg")).unwrap(),
            b"older export"
        );
    }

    #[test]
    fn missing_source_counts_error_and_continues() {
        let f = fixture();
        let missing = f.source_root.join("2022/06/01/gone.jpg");
        let sources = vec![missing, f.source("2022/06/01/b.jpg")];
        let backend = MockBackend::new().with_image("2022-06-01-b.jpg", 10, 10);

        let (counts, out) = run(&f, &sources, &backend);

        assert_eq!(counts.error, 1);
        assert_eq!(counts.copied, 1);
        assert_eq!(counts.already_there, 0);
        assert!(out.contains("\ncouldn't copy"));
        assert!(out.contains("gone.jpg"));
        assert!(!f.dest("subdir00/2022-06-01-gone.jpg").exists());
    }

    #[test]
    fn failed_copy_skips_resize() {
        let f = fixture();
        let sources = vec![f.source_root.join("2022/06/01/gone.jpg")];
        let backend = MockBackend::new().with_image("2022-06-01-gone.jpg", 4000, 3000);

        run(&f, &sources, &backend);

        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn oversized_images_are_resized_and_recorded() {
        let f = fixture();
        let big = f.source("2022/06/01/big.jpg");
        let small = f.source("2022/06/01/small.jpg");
        let backend = MockBackend::new()
            .with_image("2022-06-01-big.jpg", 100, 100)
            .with_image("2022-06-01-small.jpg", 10, 10);

        let (counts, out) = run(&f, &[big.clone(), small], &backend);

        assert_eq!(counts.resized, vec![big]);
        assert_eq!(backend.resize_count(), 1);
        assert!(out.contains("(resizing)"));
    }

    #[test]
    fn already_present_files_are_still_resized() {
        let f = fixture();
        let sources = vec![f.source("2022/06/01/big.jpg")];
        fs::create_dir_all(f.dest("subdir00")).unwrap();
        touch(&f.dest("subdir00/2022-06-01-big.jpg"));
        let backend = MockBackend::new().with_image("2022-06-01-big.jpg", 100, 100);

        let (counts, _) = run(&f, &sources, &backend);

        assert_eq!(counts.already_there, 1);
        assert_eq!(counts.resized.len(), 1);
    }

    #[test]
    fn resize_skip_never_touches_backend() {
        let mut f = fixture();
        f.config.resize_skip = true;
        let sources = vec![f.source("2022/06/01/big.jpg")];
        let backend = MockBackend::new().with_image("2022-06-01-big.jpg", 100, 100);

        let (counts, _) = run(&f, &sources, &backend);

        assert_eq!(counts.copied, 1);
        assert!(counts.resized.is_empty());
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn resize_failure_is_neither_resized_nor_error() {
        let f = fixture();
        let sources = vec![f.source("2022/06/01/big.jpg"), f.source("2022/06/01/odd.jpg")];
        // big.jpg fails to encode; odd.jpg cannot even be identified.
        let backend = MockBackend::new()
            .with_image("2022-06-01-big.jpg", 100, 100)
            .failing_resize("2022-06-01-big.jpg");

        let (counts, out) = run(&f, &sources, &backend);

        assert_eq!(counts.copied, 2);
        assert_eq!(counts.error, 0);
        assert!(counts.resized.is_empty());
        assert_eq!(out.matches("couldn't resize").count(), 2);
    }

    #[test]
    fn missing_dest_root_fails_before_copying() {
        let mut f = fixture();
        f.config.dest_root = f.config.dest_root.join("nested/missing");
        let sources = vec![f.source("2022/06/01/a.jpg")];

        let result = copy_and_resize(&sources, &f.config, &MockBackend::new(), io::sink());

        assert!(matches!(
            result,
            Err(ExportError::Plan(PlanError::DirectoryCreate { .. }))
        ));
    }

    #[test]
    fn empty_source_list_reports_zero() {
        let f = fixture();
        let (counts, out) = run(&f, &[], &MockBackend::new());
        assert_eq!(counts, RunCounts::default());
        assert_eq!(out, "Processing 0 image files\n");
    }

    #[test]
    fn real_backend_shrinks_copied_jpeg() {
        let f = fixture();
        let source = f.source_root.join("2022/06/01/wide.jpg");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        create_test_jpeg(&source, 80, 40);

        let mut out = Vec::new();
        let counts = copy_and_resize(
            &[source.clone()],
            &f.config,
            &crate::imaging::RustBackend::new(),
            &mut out,
        )
        .unwrap();

        assert_eq!(counts.resized, vec![source]);
        let (w, h) = image::image_dimensions(f.dest("subdir00/2022-06-01-wide.jpg")).unwrap();
        assert!((w as u64) * (h as u64) <= 1_000);
        assert!(w > h);
    }

    #[test]
    fn clear_destination_empties_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("out");
        touch(&root.join("subdir00/a.jpg"));

        clear_destination(&root).unwrap();

        assert!(root.is_dir());
        assert_eq!(fs::read_dir(&root).unwrap().count(), 0);
    }

    #[test]
    fn clear_destination_creates_missing_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("fresh");

        clear_destination(&root).unwrap();

        assert!(root.is_dir());
    }

    #[test]
    fn clear_destination_fails_when_parent_missing() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("no/such/parent");

        let err = clear_destination(&root).unwrap_err();

        assert!(matches!(err, ExportError::Clear { .. }));
    }
}
