//! Main processing engine.
//!
//! Runs one marker generation: load records, derive locations, resolve them
//! through the cache and the geocoding client, aggregate markers and write
//! them out. Stages hand their output to the next stage by value.

pub mod resolution;

#[cfg(test)]
pub mod tests;

use self::resolution::resolve_queries;

use crate::app::services::aggregator::aggregate;
use crate::app::services::geocode_cache::GeocodeCache;
use crate::app::services::geocoding::{Geocoder, GeocodingClient};
use crate::app::services::location_extractor::extract_locations;
use crate::app::services::marker_writer::write_markers;
use crate::app::services::record_loader::load_records;
use crate::config::MarkerConfig;
use crate::Result;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

/// Counts for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    /// Records read from the input
    pub records: usize,

    /// Distinct locations among the records
    pub locations: usize,

    /// Queries answered from the cache
    pub cache_hits: usize,

    /// Provider resolutions with coordinates
    pub found: usize,

    /// Provider resolutions without a match
    pub not_found: usize,

    /// Provider resolutions that ran out of retries
    pub failed: usize,

    /// Provider calls, retries included
    pub provider_calls: usize,

    /// Locations left out of the output for lack of coordinates
    pub unresolved_locations: usize,

    /// Markers written
    pub markers: usize,

    /// Marker file
    pub output_path: PathBuf,

    /// Cache file
    pub cache_path: PathBuf,

    pub elapsed: Duration,
}

/// Marker generation driven by a [`MarkerConfig`] and a geocoding provider
#[derive(Debug)]
pub struct MarkerProcessor<G> {
    config: MarkerConfig,
    geocoder: G,
}

impl<G: Geocoder> MarkerProcessor<G> {
    pub fn new(config: MarkerConfig, geocoder: G) -> Self {
        Self { config, geocoder }
    }

    pub fn config(&self) -> &MarkerConfig {
        &self.config
    }

    /// Generate the marker file for `input`
    ///
    /// Configuration and required columns are checked before any cache or
    /// network access; a failure there leaves no files behind.
    pub fn process(&self, input: &Path) -> Result<RunStats> {
        let start_time = Instant::now();
        self.config.validate()?;

        // Step 1: Load and validate records
        let records = load_records(input, &self.config.columns, self.config.delimiter)?;
        let record_count = records.len();

        // Step 2: Distinct locations
        let locations = extract_locations(&records, &self.config.country);
        info!(
            "Found {} distinct locations among {} records",
            locations.len(),
            record_count
        );

        // Step 3: Resolve through the cache, then the provider
        let (mut cache, _) = GeocodeCache::load(&self.config.cache_path)?;
        let mut client = GeocodingClient::new(&self.geocoder, self.config.geocoder.clone());
        let resolved = resolve_queries(
            &locations,
            &mut cache,
            &mut client,
            self.config.show_progress,
        )?;

        // Step 4: Aggregate and write
        let location_count = locations.len();
        let aggregation = aggregate(records, locations, &resolved.coordinates);
        let markers = write_markers(&self.config.output_path, &aggregation.markers)?;

        let stats = RunStats {
            records: record_count,
            locations: location_count,
            cache_hits: resolved.cache_hits,
            found: resolved.found,
            not_found: resolved.not_found,
            failed: resolved.failed,
            provider_calls: resolved.provider_calls,
            unresolved_locations: aggregation.skipped_locations,
            markers,
            output_path: self.config.output_path.clone(),
            cache_path: cache.path().to_path_buf(),
            elapsed: start_time.elapsed(),
        };

        info!(
            "Generated {} markers in {:.2}s",
            stats.markers,
            stats.elapsed.as_secs_f64()
        );
        Ok(stats)
    }
}
