//! Shared test utilities and fixtures for geocode cache tests

use crate::app::models::Coordinates;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;


/// Query resolved in most fixtures
pub const INAQUITO_QUERY: &str = "Iñaquito, Quito, Pichincha, Ecuador";

/// Query a previous run failed to resolve
pub const FAILED_QUERY: &str = "X, Y, Z, Ecuador";

pub fn inaquito() -> Coordinates {
    Coordinates::new(-0.18, -78.47)
}

/// Cache path inside a fresh temporary directory
pub fn cache_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("parroquia_coords_cache.csv")
}

/// Write a raw cache file
pub fn write_cache_file(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
}
