//! Write-then-rename helpers for files in the destination tree.
//!
//! A destination file that exists is treated as a finished export: the next
//! run counts it as "already there" and never looks at it again. So a file
//! must only appear under its final name once its bytes are complete. Every
//! write goes to a hidden `.<name>.partial` sibling in the same directory and
//! is renamed over the final name, which is atomic on one filesystem.
//!
//! An interrupted run can leave a stray `.partial` file behind; it is never
//! mistaken for a finished export and is overwritten by the next attempt.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Hidden sibling path used while `path` is being written.
pub fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.partial"))
}

/// Copy `source` to `dest` so that `dest` is either absent or complete.
pub fn copy_atomically(source: &Path, dest: &Path) -> io::Result<u64> {
    let staging = staging_path(dest);
    let bytes = match fs::copy(source, &staging) {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_file(&staging);
            return Err(e);
        }
    };
    rename_into_place(&staging, dest)?;
    Ok(bytes)
}

/// Replace `dest` with whatever `write` produces at the staging path.
///
/// On error the staging file is removed and `dest` is left untouched.
pub fn replace_atomically<E>(
    dest: &Path,
    write: impl FnOnce(&Path) -> Result<(), E>,
) -> Result<(), E>
where
    E: From<io::Error>,
{
    let staging = staging_path(dest);
    if let Err(e) = write(&staging) {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }
    rename_into_place(&staging, dest)?;
    Ok(())
}

/// Rename `staging` over `dest`, removing `staging` if the rename fails.
fn rename_into_place(staging: &Path, dest: &Path) -> io::Result<()> {
    fs::rename(staging, dest).inspect_err(|_| {
        let _ = fs::remove_file(staging);
    })
}
