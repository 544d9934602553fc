//! Marker JSON output
//!
//! Writes markers as a pretty-printed UTF-8 JSON array with two-space
//! indentation and a trailing newline. The file is replaced atomically.

use crate::app::models::Marker;
use crate::app::services::file_utils::write_atomically;
use crate::{Error, Result};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Write `markers` to `path`, returning how many were written
pub fn write_markers(path: &Path, markers: &[Marker]) -> Result<usize> {
    let mut json = serde_json::to_string_pretty(markers)
        .map_err(|e| Error::serialization("Failed to serialize markers", e))?;
    json.push('\n');

    write_atomically(path, |out| {
        out.write_all(json.as_bytes())
            .map_err(|e| Error::io(format!("Failed to write {}", path.display()), e))
    })?;

    info!("Wrote {} markers to {}", markers.len(), path.display());
    Ok(markers.len())
}
