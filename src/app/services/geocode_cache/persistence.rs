//! CSV persistence for the geocode cache
//!
//! The file has a `query,lat,lon` header and one row per query. Unresolved
//! queries have empty `lat`/`lon` fields. Unparseable coordinates load as
//! absent instead of failing the whole cache.

use super::CacheEntry;
use crate::app::services::file_utils::write_atomically;
use crate::constants::cache_columns;
use crate::{Error, Result};
use csv::StringRecord;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Statistics about reading a persisted cache
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Data rows found in the file
    pub rows_read: usize,

    /// Entries loaded into memory
    pub entries_loaded: usize,

    /// Entries with both coordinates present
    pub resolved: usize,

    /// Coordinate fields that were present but unparseable
    pub corrupt_fields: usize,

    /// Rows dropped (no query, or unreadable)
    pub rows_skipped: usize,
}

/// Read all entries from `path`; a missing file is an empty cache
pub fn read_entries(path: &Path) -> Result<(BTreeMap<String, CacheEntry>, LoadStats)> {
    let mut entries = BTreeMap::new();
    let mut stats = LoadStats::default();

    if !path.exists() {
        info!(
            "No geocode cache at {}, starting empty",
            path.display()
        );
        return Ok((entries, stats));
    }

    let file = path.to_string_lossy().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::cache_parsing(&file, "Failed to open cache file", e))?;

    let headers = reader
        .headers()
        .map_err(|e| Error::cache_parsing(&file, "Failed to read cache header", e))?
        .clone();
    let columns = CacheColumns::locate(&headers)
        .ok_or_else(|| Error::cache_format(&file, "Header has no 'query' column"))?;

    let mut record = StringRecord::new();
    loop {
        match reader.read_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                // Row-level damage (bad UTF-8, broken quoting) drops the row only
                warn!("Skipping unreadable cache row in {}: {}", file, e);
                stats.rows_skipped += 1;
                if e.is_io_error() {
                    break;
                }
                continue;
            }
        }
        stats.rows_read += 1;

        let query = record.get(columns.query).unwrap_or_default();
        if query.is_empty() {
            warn!("Skipping cache row {} without a query", stats.rows_read);
            stats.rows_skipped += 1;
            continue;
        }

        let lat = parse_coordinate(columns.lat.and_then(|i| record.get(i)), &mut stats);
        let lon = parse_coordinate(columns.lon.and_then(|i| record.get(i)), &mut stats);
        entries.insert(query.to_string(), CacheEntry { lat, lon });
    }

    stats.entries_loaded = entries.len();
    stats.resolved = entries.values().filter(|e| e.is_resolved()).count();

    info!(
        "Loaded {} cached queries ({} resolved) from {}",
        stats.entries_loaded,
        stats.resolved,
        path.display()
    );
    if stats.corrupt_fields > 0 {
        warn!(
            "{} unparseable coordinate fields in {} were treated as unresolved",
            stats.corrupt_fields, file
        );
    }

    Ok((entries, stats))
}

/// Rewrite `path` with all entries, atomically
pub fn write_entries(path: &Path, entries: &BTreeMap<String, CacheEntry>) -> Result<()> {
    let file = path.to_string_lossy().to_string();

    write_atomically(path, |out| {
        let mut writer = csv::Writer::from_writer(out);
        writer
            .write_record(cache_columns::HEADER)
            .map_err(|e| Error::cache_parsing(&file, "Failed to write cache header", e))?;

        for (query, entry) in entries {
            let lat = format_coordinate(entry.lat);
            let lon = format_coordinate(entry.lon);
            writer
                .write_record([query.as_str(), lat.as_str(), lon.as_str()])
                .map_err(|e| Error::cache_parsing(&file, "Failed to write cache row", e))?;
        }

        writer
            .flush()
            .map_err(|e| Error::io(format!("Failed to flush cache {}", file), e))
    })?;

    debug!("Persisted {} cache entries to {}", entries.len(), file);
    Ok(())
}

/// Positions of the cache columns within the header
struct CacheColumns {
    query: usize,
    lat: Option<usize>,
    lon: Option<usize>,
}

impl CacheColumns {
    fn locate(headers: &StringRecord) -> Option<Self> {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);
        Some(Self {
            query: position(cache_columns::QUERY)?,
            lat: position(cache_columns::LAT),
            lon: position(cache_columns::LON),
        })
    }
}

/// Parse a persisted coordinate; empty means unresolved, garbage counts as corrupt
fn parse_coordinate(field: Option<&str>, stats: &mut LoadStats) -> Option<f64> {
    let field = field.map(str::trim).unwrap_or_default();
    if field.is_empty() {
        return None;
    }

    match field.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            stats.corrupt_fields += 1;
            None
        }
    }
}

/// Shortest representation that parses back to the same `f64`
fn format_coordinate(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
