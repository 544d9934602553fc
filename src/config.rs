//! Configuration management and validation.
//!
//! Provides the configuration for a marker run: which input columns carry the
//! location and business name, where the cache and output live, and how the
//! geocoding provider is called.

use crate::constants::{
    BUSINESS_NAME_COLUMN, CANTON_COLUMN, DEFAULT_CACHE_FILE, DEFAULT_COUNTRY, DEFAULT_DELIMITER,
    DEFAULT_OUTPUT_FILE, DEFAULT_USER_AGENT, GEOCODE_ERROR_WAIT, GEOCODE_MAX_RETRIES,
    GEOCODE_MIN_DELAY, GEOCODE_TIMEOUT, NOMINATIM_BASE_URL, PARISH_COLUMN, PROVINCE_COLUMN,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Names of the input columns the pipeline depends on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    pub province: String,
    pub canton: String,
    pub parish: String,
    pub business_name: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            province: PROVINCE_COLUMN.to_string(),
            canton: CANTON_COLUMN.to_string(),
            parish: PARISH_COLUMN.to_string(),
            business_name: BUSINESS_NAME_COLUMN.to_string(),
        }
    }
}

impl ColumnNames {
    /// Required columns in check order
    pub fn required(&self) -> [&str; 4] {
        [
            self.province.as_str(),
            self.canton.as_str(),
            self.parish.as_str(),
            self.business_name.as_str(),
        ]
    }
}

/// Geocoding provider and call policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    /// Base URL of the Nominatim-compatible service
    pub base_url: String,

    /// User agent sent with every request
    pub user_agent: String,

    /// Per-request timeout; exceeding it counts as a transient failure
    pub timeout: Duration,

    /// Minimum delay between the start of two provider calls
    pub min_delay: Duration,

    /// Retries after a failed call (a "no match" answer is never retried)
    pub max_retries: u32,

    /// Wait before each retry
    pub error_wait: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: NOMINATIM_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: GEOCODE_TIMEOUT,
            min_delay: GEOCODE_MIN_DELAY,
            max_retries: GEOCODE_MAX_RETRIES,
            error_wait: GEOCODE_ERROR_WAIT,
        }
    }
}

impl GeocoderConfig {
    /// Policy with no waiting at all, for tests and scripted geocoders
    pub fn without_delays() -> Self {
        Self {
            min_delay: Duration::ZERO,
            error_wait: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Global configuration for a marker run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// Input column names
    pub columns: ColumnNames,

    /// Country appended to every query
    pub country: String,

    /// Field delimiter of the input table
    pub delimiter: u8,

    /// Persisted geocode cache
    pub cache_path: PathBuf,

    /// Marker JSON output
    pub output_path: PathBuf,

    /// Geocoding provider settings
    pub geocoder: GeocoderConfig,

    /// Show a progress bar while geocoding
    pub show_progress: bool,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            country: DEFAULT_COUNTRY.to_string(),
            delimiter: DEFAULT_DELIMITER,
            cache_path: PathBuf::from(DEFAULT_CACHE_FILE),
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            geocoder: GeocoderConfig::default(),
            show_progress: true,
        }
    }
}

impl MarkerConfig {
    /// Set the cache file location
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = path.into();
        self
    }

    /// Set the marker output location
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Set the country appended to queries
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    /// Set the input field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Replace the input column names
    pub fn with_columns(mut self, columns: ColumnNames) -> Self {
        self.columns = columns;
        self
    }

    /// Replace the geocoder settings
    pub fn with_geocoder(mut self, geocoder: GeocoderConfig) -> Self {
        self.geocoder = geocoder;
        self
    }

    /// Disable the progress bar
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Validate the configuration before any file is touched
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for column in self.columns.required() {
            if column.trim().is_empty() {
                return Err(Error::configuration("Input column names cannot be empty"));
            }
            if !seen.insert(column) {
                return Err(Error::configuration(format!(
                    "Input column '{}' is configured for more than one field",
                    column
                )));
            }
        }

        if self.country.trim().is_empty() {
            return Err(Error::configuration("Country cannot be empty"));
        }

        if self.geocoder.user_agent.trim().is_empty() {
            return Err(Error::configuration(
                "Geocoder user agent cannot be empty",
            ));
        }

        if self.cache_path == self.output_path {
            return Err(Error::configuration(format!(
                "Cache and output must be different files: {}",
                self.cache_path.display()
            )));
        }

        debug!("Configuration validated: {:?}", self);
        Ok(())
    }
}
