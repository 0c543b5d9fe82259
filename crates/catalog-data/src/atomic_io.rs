//! Capability-scoped file access for catalogue documents.
//!
//! Files are always read and written through a `cap_std` handle on their
//! parent directory. The persisted catalogue is overwritten as a whole:
//! writing goes through a hidden temporary file in the same directory
//! followed by a rename, so readers never observe a half-written list.

use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use camino::{Utf8Component, Utf8Path};
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};

use crate::error::CatalogDataError;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Opens the parent directory of `path` and returns it with the bare file
/// name. A path without a parent resolves against the working directory.
pub(crate) fn open_parent_dir(path: &Utf8Path) -> io::Result<(Dir, &str)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "catalogue path must include a file name",
        )
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Reads a whole UTF-8 document.
///
/// # Errors
///
/// Returns [`CatalogDataError::NotFound`] when the file or its directory is
/// missing and [`CatalogDataError::IoError`] for any other read failure.
pub(crate) fn read_document(path: &Utf8Path) -> Result<String, CatalogDataError> {
    let read_error = |error: io::Error| {
        if error.kind() == io::ErrorKind::NotFound {
            CatalogDataError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            CatalogDataError::IoError {
                path: path.to_path_buf(),
                message: error.to_string(),
            }
        }
    };
    let (dir, file_name) = open_parent_dir(path).map_err(read_error)?;
    dir.read_to_string(Path::new(file_name)).map_err(read_error)
}

/// Writes `contents` to `path` (a bare file name inside `dir`) atomically.
///
/// # Errors
///
/// Returns [`CatalogDataError::WriteError`] if the temporary file cannot be
/// written or renamed over the target.
pub(crate) fn write_atomic(
    dir: &Dir,
    path: &Utf8Path,
    contents: &str,
) -> Result<(), CatalogDataError> {
    let mut components = path.components();
    let (Some(Utf8Component::Normal(file_name)), None) = (components.next(), components.next())
    else {
        return Err(CatalogDataError::WriteError {
            path: path.to_path_buf(),
            message: "catalogue path must be a file".to_owned(),
        });
    };
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let tmp_name = format!(
        ".{}.tmp.{}.{}.{}",
        file_name,
        std::process::id(),
        suffix,
        counter
    );

    write_to_temp_file(dir, &tmp_name, path, contents)?;
    rename_temp_to_target(dir, &tmp_name, file_name, path)?;
    sync_parent_directory(dir);

    Ok(())
}

fn write_to_temp_file(
    dir: &Dir,
    tmp_name: &str,
    target_path: &Utf8Path,
    contents: &str,
) -> Result<(), CatalogDataError> {
    let tmp_path = target_path.with_file_name(tmp_name);
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file =
        dir.open_with(tmp_name, &options)
            .map_err(|err| CatalogDataError::WriteError {
                path: tmp_path.clone(),
                message: err.to_string(),
            })?;

    let written = file.write_all(contents.as_bytes()).and_then(|()| file.sync_all());
    if let Err(err) = written {
        drop(file);
        drop(dir.remove_file(tmp_name));
        return Err(CatalogDataError::WriteError {
            path: tmp_path,
            message: err.to_string(),
        });
    }

    Ok(())
}

fn rename_temp_to_target(
    dir: &Dir,
    tmp_name: &str,
    target_name: &str,
    target_path: &Utf8Path,
) -> Result<(), CatalogDataError> {
    if let Err(err) = rename_temp_to_target_impl(dir, tmp_name, target_name) {
        // Best-effort cleanup of temp file on rename failure.
        drop(dir.remove_file(tmp_name));
        return Err(CatalogDataError::WriteError {
            path: target_path.to_path_buf(),
            message: err.to_string(),
        });
    }
    Ok(())
}

#[cfg(windows)]
fn rename_temp_to_target_impl(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    // Windows rename fails if the target exists, so remove it first.
    match dir.remove_file(target_name) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(tmp_name, dir, target_name)
}

#[cfg(not(windows))]
fn rename_temp_to_target_impl(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    dir.rename(tmp_name, dir, target_name)
}

fn sync_parent_directory(parent: &Dir) {
    // Best-effort directory sync; ignore failures.
    if parent.open(".").and_then(|dir| dir.sync_all()).is_err() {
        // Ignore sync failures.
    }
}
