//! Pipeline tests for the processor module
//!
//! Drive complete runs against temporary input, cache and output files with a
//! scripted geocoder in place of the network.

use crate::config::{GeocoderConfig, MarkerConfig};
use crate::constants::{BUSINESS_NAME_COLUMN, CANTON_COLUMN, PARISH_COLUMN, PROVINCE_COLUMN};
use std::path::{Path, PathBuf};
use tempfile::TempDir;


pub const INAQUITO_QUERY: &str = "Iñaquito, Quito, Pichincha, Ecuador";
pub const SUCRE_QUERY: &str = "Sucre, Cuenca, Azuay, Ecuador";
pub const FAILED_QUERY: &str = "X, Y, Z, Ecuador";

/// Input rows: province, canton, parish, business name
pub const SAMPLE_ROWS: &[[&str; 4]] = &[
    ["Pichincha", "Quito", "Iñaquito", "Libreria A"],
    ["Pichincha", "Quito", "Iñaquito", "Libreria A"],
    ["Pichincha", "Quito", "Iñaquito", "Libreria B"],
    ["Azuay", "Cuenca", "Sucre", "Libreria C"],
    ["Z", "Y", "X", "Libreria Perdida"],
];

/// Write an input table with the default column names plus a passthrough column
pub fn write_input(dir: &Path, rows: &[[&str; 4]]) -> PathBuf {
    let path = dir.join("businesses.csv");
    let mut writer = csv::Writer::from_path(&path).unwrap();
    writer
        .write_record([
            "RUC",
            PROVINCE_COLUMN,
            CANTON_COLUMN,
            PARISH_COLUMN,
            BUSINESS_NAME_COLUMN,
        ])
        .unwrap();
    for (i, row) in rows.iter().enumerate() {
        let ruc = format!("{:013}", i + 1);
        writer
            .write_record([ruc.as_str(), row[0], row[1], row[2], row[3]])
            .unwrap();
    }
    writer.flush().unwrap();
    path
}

/// Configuration writing into `temp_dir`, with no delays and no progress bar
pub fn test_config(temp_dir: &TempDir) -> MarkerConfig {
    MarkerConfig::default()
        .with_cache_path(temp_dir.path().join("parroquia_coords_cache.csv"))
        .with_output_path(temp_dir.path().join("markers.json"))
        .with_geocoder(GeocoderConfig::without_delays())
        .without_progress()
}
