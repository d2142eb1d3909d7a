//! File-system helpers shared by file sync actions.
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Last-modified time of `path` in UTC.
///
/// # Errors
///
/// Returns the metadata error (e.g. [`io::ErrorKind::NotFound`]).
pub fn modified_time(path: &Path) -> io::Result<DateTime<Utc>> {
    Ok(DateTime::<Utc>::from(fs::metadata(path)?.modified()?))
}

/// Whether `a` and `b` name the same existing file once links and relative
/// components are resolved. Missing paths are never the same file.
#[must_use]
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Copy `from` onto `to`, creating parent directories, then stamp `to` with
/// `modified` so later runs can compare the two sides.
///
/// # Errors
///
/// Returns an error if the parent directory, the copy, or the timestamp
/// update fails.
pub fn copy_with_modified(from: &Path, to: &Path, modified: DateTime<Utc>) -> io::Result<()> {
    ensure_parent_dir(to)?;
    fs::copy(from, to)?;
    let file = fs::OpenOptions::new().write(true).open(to)?;
    file.set_modified(SystemTime::from(modified))
}
