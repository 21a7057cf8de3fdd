//! Terminal output for an export run.
//!
//! The run prints three kinds of text to stdout:
//!
//! ```text
//! Processing 5312 image files
//! 97% remaining (image 160/5312) /home/ada/Pictures/2019/07/14/IMG_0042.JPG (resizing)   ← rewritten in place
//!
//! couldn't copy /home/ada/Pictures/2015/01/02/gone.jpg: No such file or directory      ← stays in scrollback
//! Processing complete: 12 new images, 3 resized, 5299 already there, 1 error, 41 seconds elapsed.
//! ```
//!
//! The status line is erased and rewritten with a carriage return, so it
//! occupies a single terminal line. It is only rewritten when the whole
//! percentage changes, or when a photo was resized (resizes are slow, so the
//! user sees which file is being worked on). Error lines start on a fresh
//! line so they are not overwritten by the next status update.
//!
//! Each message has a pure `format_*` function for testability.
//! [`ProgressReporter`] owns the writer and the "last percentage shown"
//! state.

use crate::export::RunCounts;
use std::fmt::Display;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

/// ANSI "erase entire line".
pub const ERASE_LINE: &str = "\x1b[2K";

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Whole percentage of work remaining before item `index` (0-based).
///
/// Starts at 100 for the first item. An empty run reports 0.
pub fn percent_remaining(index: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100 - (100 * index.min(total) / total)) as u32
}

pub fn format_start(total: usize) -> String {
    format!("Processing {total} image files")
}

/// Status line, without the erase prefix or carriage return.
pub fn format_status_line(
    percent: u32,
    index: usize,
    total: usize,
    source: &Path,
    resized: bool,
) -> String {
    let suffix = if resized { " (resizing)" } else { "" };
    format!(
        "{percent}% remaining (image {}/{total}) {}{suffix}",
        index + 1,
        source.display()
    )
}

pub fn format_copy_error(source: &Path, err: &impl Display) -> String {
    format!("couldn't copy {}: {err}", source.display())
}

pub fn format_resize_error(index: usize, source: &Path, err: &impl Display) -> String {
    format!("couldn't resize {} {}: {err}", index + 1, source.display())
}

/// Final one-line report.
pub fn format_summary(counts: &RunCounts, elapsed: Duration) -> String {
    format!(
        "Processing complete: {}, {} resized, {} already there, {}, {} seconds elapsed.",
        plural(counts.copied, "new image"),
        counts.resized.len(),
        counts.already_there,
        plural(counts.error, "error"),
        elapsed.as_secs()
    )
}

/// Print the final report over whatever status line is showing.
pub fn print_summary(counts: &RunCounts, elapsed: Duration) {
    println!("{ERASE_LINE}\r{}", format_summary(counts, elapsed));
}

/// Overwritable progress display for one pass over `total` items.
pub struct ProgressReporter<W: Write> {
    out: W,
    total: usize,
    last_percent: Option<u32>,
}

impl<W: Write> ProgressReporter<W> {
    pub fn new(out: W, total: usize) -> Self {
        Self {
            out,
            total,
            last_percent: None,
        }
    }

    pub fn start(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", format_start(self.total))
    }

    /// Report that item `index` finished. Returns whether a line was written.
    pub fn item_done(&mut self, index: usize, source: &Path, resized: bool) -> io::Result<bool> {
        let percent = percent_remaining(index, self.total);
        if !resized && self.last_percent == Some(percent) {
            return Ok(false);
        }
        write!(
            self.out,
            "{ERASE_LINE}{}\r",
            format_status_line(percent, index, self.total, source, resized)
        )?;
        self.out.flush()?;
        self.last_percent = Some(percent);
        Ok(true)
    }

    /// Print a message on its own line, leaving the status line above it.
    pub fn error_line(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "\n{message}")
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn reporter(total: usize) -> ProgressReporter<Vec<u8>> {
        ProgressReporter::new(Vec::new(), total)
    }

    fn text(r: ProgressReporter<Vec<u8>>) -> String {
        String::from_utf8(r.into_inner()).unwrap()
    }

    #[test]
    fn percent_remaining_counts_down() {
        assert_eq!(percent_remaining(0, 200), 100);
        assert_eq!(percent_remaining(1, 200), 100);
        assert_eq!(percent_remaining(2, 200), 99);
        assert_eq!(percent_remaining(199, 200), 1);
        assert_eq!(percent_remaining(0, 0), 0);
    }

    #[test]
    fn status_line_format() {
        let line = format_status_line(97, 159, 5312, Path::new("/p/a.jpg"), true);
        assert_eq!(line, "97% remaining (image 160/5312) /p/a.jpg (resizing)");

        let line = format_status_line(50, 0, 2, Path::new("/p/b.jpg"), false);
        assert_eq!(line, "50% remaining (image 1/2) /p/b.jpg");
    }

    #[test]
    fn summary_pluralizes() {
        let counts = RunCounts {
            already_there: 5,
            copied: 1,
            error: 0,
            resized: vec![PathBuf::from("a"), PathBuf::from("b")],
        };
        assert_eq!(
            format_summary(&counts, Duration::from_millis(41_900)),
            "Processing complete: 1 new image, 2 resized, 5 already there, 0 errors, 41 seconds elapsed."
        );

        let counts = RunCounts {
            copied: 3,
            error: 1,
            ..Default::default()
        };
        assert!(format_summary(&counts, Duration::ZERO).contains("3 new images"));
        assert!(format_summary(&counts, Duration::ZERO).contains("1 error,"));
    }

    #[test]
    fn reporter_only_writes_when_percent_changes() {
        let mut r = reporter(200);
        let src = Path::new("/p/x.jpg");

        assert!(r.item_done(0, src, false).unwrap());
        assert!(!r.item_done(1, src, false).unwrap());
        assert!(r.item_done(2, src, false).unwrap());

        let out = text(r);
        assert_eq!(out.matches(ERASE_LINE).count(), 2);
        assert!(out.ends_with('\r'));
    }

    #[test]
    fn reporter_always_writes_for_resized_items() {
        let mut r = reporter(200);
        let src = Path::new("/p/x.jpg");

        r.item_done(0, src, false).unwrap();
        assert!(r.item_done(1, src, true).unwrap());

        assert!(text(r).contains("(resizing)"));
    }

    #[test]
    fn error_line_starts_on_fresh_line() {
        let mut r = reporter(1);
        r.error_line(&format_copy_error(Path::new("/p/gone.jpg"), &"not found"))
            .unwrap();
        assert_eq!(text(r), "\ncouldn't copy /p/gone.jpg: not found\n");
    }

    #[test]
    fn start_line_reports_total() {
        let mut r = reporter(3);
        r.start().unwrap();
        assert_eq!(text(r), "Processing 3 image files\n");
    }
}
