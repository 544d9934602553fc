//! File helpers shared by the cache and the marker writer

use crate::{Error, Result};
use std::fs::{self, File};
use std::path::Path;
use tempfile::NamedTempFile;

/// Directory a file lives in, treating a bare file name as the working directory
pub fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Replace `path` with whatever `write` produces, or leave it untouched
///
/// Content goes to a temporary file in the same directory which is then
/// renamed over the target, so readers see either the old or the new file.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let dir = parent_dir(path);
    fs::create_dir_all(dir)
        .map_err(|e| Error::io(format!("Failed to create directory {}", dir.display()), e))?;

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| {
        Error::io(
            format!("Failed to create temporary file in {}", dir.display()),
            e,
        )
    })?;

    write(temp.as_file_mut())?;

    temp.as_file()
        .sync_all()
        .map_err(|e| Error::io(format!("Failed to sync {}", path.display()), e))?;
    temp.persist(path)
        .map_err(|e| Error::io(format!("Failed to replace {}", path.display()), e.error))?;

    Ok(())
}
