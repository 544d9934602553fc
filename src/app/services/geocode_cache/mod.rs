//! Persistent geocode cache
//!
//! Maps geocoding queries to resolved coordinates, or to an unresolved marker
//! when an earlier lookup found nothing. Every `put` rewrites the whole cache
//! file, so a run killed at any point leaves a cache consistent with all the
//! lookups finished so far and the next run resumes where it stopped.
//!
//! Rewriting on every insert is linear in the cache size; this is fine for the
//! low thousands of parishes a national dataset has.

use crate::app::models::Coordinates;
use crate::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod persistence;

#[cfg(test)]
pub mod tests;

pub use persistence::LoadStats;

/// Cached outcome of a geocoding query
///
/// Either coordinate may be absent independently when a persisted field
/// could not be parsed; only entries with both parts count as resolved.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CacheEntry {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl CacheEntry {
    /// Entry for a successful resolution
    pub fn resolved(coordinates: Coordinates) -> Self {
        Self {
            lat: Some(coordinates.lat),
            lon: Some(coordinates.lon),
        }
    }

    /// Entry for a query the provider could not resolve
    pub fn unresolved() -> Self {
        Self::default()
    }

    /// Build from an optional resolution
    pub fn from_coordinates(coordinates: Option<Coordinates>) -> Self {
        coordinates.map_or_else(Self::unresolved, Self::resolved)
    }

    /// Coordinates, if both parts are present
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_parts(self.lat, self.lon)
    }

    pub fn is_resolved(&self) -> bool {
        self.coordinates().is_some()
    }
}

/// Write-through cache of geocoding results backed by a CSV file
#[derive(Debug, Clone)]
pub struct GeocodeCache {
    /// Backing file, rewritten in full after every insert
    path: PathBuf,

    /// Entries by query, sorted so rewrites are deterministic
    entries: BTreeMap<String, CacheEntry>,
}

impl GeocodeCache {
    /// Create an empty cache backed by `path` without reading it
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Load the cache from `path`, or start empty if the file does not exist
    pub fn load(path: impl Into<PathBuf>) -> Result<(Self, LoadStats)> {
        let path = path.into();
        let (entries, stats) = persistence::read_entries(&path)?;
        Ok((Self { path, entries }, stats))
    }

    /// Cached entry for `query`, or `None` on a miss
    pub fn lookup(&self, query: &str) -> Option<&CacheEntry> {
        self.entries.get(query)
    }

    /// Record the outcome for `query` and persist the whole cache
    pub fn put(&mut self, query: impl Into<String>, coordinates: Option<Coordinates>) -> Result<()> {
        let query = query.into();
        let entry = CacheEntry::from_coordinates(coordinates);
        debug!("Caching {:?} for query '{}'", entry, query);

        self.entries.insert(query, entry);
        self.flush()
    }

    /// Persist the whole cache to its backing file
    pub fn flush(&self) -> Result<()> {
        persistence::write_entries(&self.path, &self.entries)
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries with usable coordinates
    pub fn resolved_count(&self) -> usize {
        self.entries.values().filter(|entry| entry.is_resolved()).count()
    }
}
