//! Integration tests for the marker pipeline through the public API
//!
//! Runs complete generations against temporary files with an in-memory
//! geocoder standing in for Nominatim.

use parish_markers::app::services::geocoding::{GeocodeError, Geocoder};
use parish_markers::config::GeocoderConfig;
use parish_markers::{Coordinates, MarkerConfig, MarkerProcessor};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

const INPUT: &str = "\
RUC,DESCRIPCION_PROVINCIA_EST,DESCRIPCION_CANTON_EST,DESCRIPCION_PARROQUIA_EST,NOMBRE_FANTASIA_COMERCIAL
1790000000001,Pichincha,Quito,Iñaquito,Libreria A
1790000000002,Pichincha,Quito,Iñaquito,Libreria A
1790000000003,Pichincha,Quito,Iñaquito,Libreria B
0190000000001,Azuay,Cuenca,Sucre,Libreria C
0990000000001,Guayas,Guayaquil,Tarqui,
9990000000001,Z,Y,X,Libreria Perdida
";

/// Gazetteer lookup that records calls and can be told to crash
struct Gazetteer {
    places: HashMap<&'static str, Coordinates>,
    calls: RefCell<Vec<String>>,
    crash_on: Option<&'static str>,
}

impl Gazetteer {
    fn new() -> Self {
        let places = HashMap::from([
            (
                "Iñaquito, Quito, Pichincha, Ecuador",
                Coordinates::new(-0.1806532, -78.4678382),
            ),
            ("Sucre, Cuenca, Azuay, Ecuador", Coordinates::new(-2.9, -79.0)),
            (
                "Tarqui, Guayaquil, Guayas, Ecuador",
                Coordinates::new(-2.19, -79.88),
            ),
        ]);
        Self {
            places,
            calls: RefCell::new(Vec::new()),
            crash_on: None,
        }
    }

    fn crashing_on(mut self, query: &'static str) -> Self {
        self.crash_on = Some(query);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Geocoder for Gazetteer {
    fn geocode(
        &self,
        query: &str,
        _timeout: Duration,
    ) -> Result<Option<Coordinates>, GeocodeError> {
        if self.crash_on == Some(query) {
            panic!("simulated crash while geocoding {}", query);
        }
        self.calls.borrow_mut().push(query.to_string());
        Ok(self.places.get(query).copied())
    }
}

fn setup(temp_dir: &TempDir) -> (PathBuf, MarkerConfig) {
    let input = temp_dir.path().join("librerias.csv");
    fs::write(&input, INPUT).unwrap();

    let config = MarkerConfig::default()
        .with_cache_path(temp_dir.path().join("parroquia_coords_cache.csv"))
        .with_output_path(temp_dir.path().join("web").join("markers.json"))
        .with_geocoder(GeocoderConfig::without_delays())
        .without_progress();
    (input, config)
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_generates_markers_for_resolved_parishes() {
    let temp_dir = TempDir::new().unwrap();
    let (input, config) = setup(&temp_dir);
    let gazetteer = Gazetteer::new();

    let stats = MarkerProcessor::new(config.clone(), &gazetteer)
        .process(&input)
        .unwrap();

    assert_eq!(stats.records, 6);
    assert_eq!(stats.locations, 4);
    assert_eq!(stats.markers, 3);

    let json = read_json(&config.output_path);
    let markers = json.as_array().unwrap();
    assert_eq!(markers.len(), 3);

    let inaquito = markers
        .iter()
        .find(|m| m["parroquia"] == "Iñaquito")
        .unwrap();
    assert_eq!(inaquito["provincia"], "Pichincha");
    assert_eq!(inaquito["canton"], "Quito");
    assert_eq!(inaquito["lat"], -0.1806532);
    assert_eq!(inaquito["lon"], -78.4678382);
    assert_eq!(
        inaquito["librerias"],
        serde_json::json!(["Libreria A", "Libreria B"])
    );
    assert_eq!(inaquito["count"], 2);

    // A location whose only business has no name still gets a marker
    let tarqui = markers.iter().find(|m| m["parroquia"] == "Tarqui").unwrap();
    assert_eq!(tarqui["librerias"], serde_json::json!([]));
    assert_eq!(tarqui["count"], 0);

    assert!(markers.iter().all(|m| m["parroquia"] != "X"));

    let ids: Vec<u64> = markers.iter().map(|m| m["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![0, 1, 2]);
}

#[test]
fn test_output_keeps_non_ascii_unescaped() {
    let temp_dir = TempDir::new().unwrap();
    let (input, config) = setup(&temp_dir);
    let gazetteer = Gazetteer::new();

    MarkerProcessor::new(config.clone(), &gazetteer)
        .process(&input)
        .unwrap();

    let raw = fs::read_to_string(&config.output_path).unwrap();
    assert!(raw.contains("\"parroquia\": \"Iñaquito\""));
    assert!(!raw.contains("\\u00f1"));
    assert!(raw.ends_with("]\n"));
}

#[test]
fn test_rerun_reuses_cache() {
    let temp_dir = TempDir::new().unwrap();
    let (input, config) = setup(&temp_dir);

    let first = Gazetteer::new();
    MarkerProcessor::new(config.clone(), &first)
        .process(&input)
        .unwrap();
    assert_eq!(first.calls().len(), 4);
    let first_output = fs::read(&config.output_path).unwrap();

    let second = Gazetteer::new();
    let stats = MarkerProcessor::new(config.clone(), &second)
        .process(&input)
        .unwrap();

    assert!(second.calls().is_empty());
    assert_eq!(stats.cache_hits, 4);
    assert_eq!(fs::read(&config.output_path).unwrap(), first_output);
}

#[test]
fn test_interrupted_run_resumes_from_cache() {
    let temp_dir = TempDir::new().unwrap();
    let (input, config) = setup(&temp_dir);

    // Queries go out in order of first appearance; crash on the third
    let crashing = Gazetteer::new().crashing_on("Tarqui, Guayaquil, Guayas, Ecuador");
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        MarkerProcessor::new(config.clone(), &crashing).process(&input)
    }));
    assert!(outcome.is_err());
    assert!(!config.output_path.exists());

    let cache = fs::read_to_string(&config.cache_path).unwrap();
    assert!(cache.contains("\"Iñaquito, Quito, Pichincha, Ecuador\",-0.1806532,-78.4678382"));
    assert!(cache.contains("\"Sucre, Cuenca, Azuay, Ecuador\",-2.9,-79"));
    assert!(!cache.contains("Tarqui"));

    let resumed = Gazetteer::new();
    let stats = MarkerProcessor::new(config.clone(), &resumed)
        .process(&input)
        .unwrap();

    assert_eq!(
        resumed.calls(),
        vec!["Tarqui, Guayaquil, Guayas, Ecuador", "X, Y, Z, Ecuador"]
    );
    assert_eq!(stats.cache_hits, 2);
    assert_eq!(stats.markers, 3);
}
