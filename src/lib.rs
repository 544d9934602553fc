//! Parish Markers Library
//!
//! A Rust library for turning a spreadsheet of businesses, each tagged with an
//! Ecuadorian province/canton/parish, into a JSON file of map markers.
//!
//! This library provides tools for:
//! - Loading business records from workbooks or delimited text, with
//!   required-column validation
//! - Deriving the distinct administrative locations and their geocoding queries
//! - Resolving queries through a rate-limited, retrying geocoding client
//! - Caching resolutions in a write-through CSV file so interrupted runs resume
//! - Aggregating businesses that share a location into one marker each
//! - Writing the markers atomically as pretty-printed UTF-8 JSON

pub mod config;
pub mod constants;
pub mod processor;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod aggregator;
        pub mod file_utils;
        pub mod geocode_cache;
        pub mod geocoding;
        pub mod location_extractor;
        pub mod marker_writer;
        pub mod record_loader;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{Coordinates, LocationKey, Marker, Record};
pub use config::MarkerConfig;
pub use processor::{MarkerProcessor, RunStats};

/// Result type alias for the marker pipeline
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for marker pipeline operations
///
/// Geocoding failures for a single query never surface here; the geocoding
/// client absorbs them and records the query as unresolved.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Input table could not be read
    #[error("Input parsing error in file '{file}': {message}")]
    InputParsing {
        file: String,
        message: String,
        #[source]
        source: polars::error::PolarsError,
    },

    /// Input workbook could not be read
    #[error("Workbook parsing error in file '{file}': {message}")]
    WorkbookParsing {
        file: String,
        message: String,
        #[source]
        source: calamine::Error,
    },

    /// Configuration error (missing column, missing argument, invalid settings)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Cache file is structurally unusable
    #[error("Cache format error in file '{file}': {message}")]
    CacheFormat { file: String, message: String },

    /// Cache file could not be read or written as CSV
    #[error("Cache parsing error in file '{file}': {message}")]
    CacheParsing {
        file: String,
        message: String,
        #[source]
        source: csv::Error,
    },

    /// Marker serialization failed
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Geocoder could not be constructed
    #[error("Geocoding error: {message}")]
    Geocoding { message: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create an input parsing error with context
    pub fn input_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: polars::error::PolarsError,
    ) -> Self {
        Self::InputParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a workbook parsing error with context
    pub fn workbook_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: calamine::Error,
    ) -> Self {
        Self::WorkbookParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a cache format error
    pub fn cache_format(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CacheFormat {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a cache parsing error with context
    pub fn cache_parsing(
        file: impl Into<String>,
        message: impl Into<String>,
        source: csv::Error,
    ) -> Self {
        Self::CacheParsing {
            file: file.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a serialization error with context
    pub fn serialization(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            message: message.into(),
            source,
        }
    }

    /// Create a geocoding setup error
    pub fn geocoding(message: impl Into<String>) -> Self {
        Self::Geocoding {
            message: message.into(),
        }
    }

    /// Whether this error means the run was misconfigured rather than failed mid-way
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: "JSON serialization failed".to_string(),
            source: error,
        }
    }
}
