//! Data models for the marker pipeline
//!
//! This module contains the core data structures: input business records, the
//! administrative location key they are grouped by, resolved coordinates, and
//! the markers written for the map.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Input Records
// =============================================================================

/// One row of the input table
///
/// All cells are strings; cells that were missing in the input are empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Province / canton / parish the business is registered in
    pub location: LocationKey,

    /// Trade name of the business
    pub business_name: String,

    /// Every other column of the row, by column name
    pub passthrough: BTreeMap<String, String>,
}

impl Record {
    /// Create a record without passthrough columns
    pub fn new(
        province: impl Into<String>,
        canton: impl Into<String>,
        parish: impl Into<String>,
        business_name: impl Into<String>,
    ) -> Self {
        Self {
            location: LocationKey::new(province, canton, parish),
            business_name: business_name.into(),
            passthrough: BTreeMap::new(),
        }
    }

    /// Attach passthrough columns
    pub fn with_passthrough(mut self, passthrough: BTreeMap<String, String>) -> Self {
        self.passthrough = passthrough;
        self
    }
}

// =============================================================================
// Location Key and Query
// =============================================================================

/// Administrative location identity used for caching and grouping
///
/// Field order defines the sort order: province, then canton, then parish.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocationKey {
    pub province: String,
    pub canton: String,
    pub parish: String,
}

impl LocationKey {
    pub fn new(
        province: impl Into<String>,
        canton: impl Into<String>,
        parish: impl Into<String>,
    ) -> Self {
        Self {
            province: province.into(),
            canton: canton.into(),
            parish: parish.into(),
        }
    }

    /// Canonical geocoding query, most specific part first
    ///
    /// The query is also the cache key, so its format must stay stable across
    /// runs or every cached resolution is lost.
    pub fn query(&self, country: &str) -> String {
        format!(
            "{}, {}, {}, {}",
            self.parish, self.canton, self.province, country
        )
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} / {}", self.province, self.canton, self.parish)
    }
}

// =============================================================================
// Coordinates
// =============================================================================

/// WGS84 latitude/longitude in decimal degrees
///
/// Equality and ordering follow IEEE 754 total ordering so coordinates can
/// take part in grouping keys.
#[derive(Debug, Clone, Copy)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build from optional parts; both must be present and finite
    pub fn from_parts(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        match (lat, lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(Self::new(lat, lon))
            }
            _ => None,
        }
    }
}

impl PartialEq for Coordinates {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Coordinates {}

impl PartialOrd for Coordinates {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Coordinates {
    fn cmp(&self, other: &Self) -> Ordering {
        self.lat
            .total_cmp(&other.lat)
            .then_with(|| self.lon.total_cmp(&other.lon))
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

// =============================================================================
// Markers
// =============================================================================

/// One map marker: a resolved location and the businesses registered there
///
/// Field names are the ones the map front-end reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Sequential id, stable within a run only
    pub id: usize,

    #[serde(rename = "provincia")]
    pub province: String,

    pub canton: String,

    #[serde(rename = "parroquia")]
    pub parish: String,

    pub lat: f64,

    pub lon: f64,

    /// Sorted, unique, non-empty business names
    #[serde(rename = "librerias")]
    pub businesses: Vec<String>,

    /// Number of entries in `businesses`
    pub count: usize,
}

impl Marker {
    /// Location key this marker was built from
    pub fn location(&self) -> LocationKey {
        LocationKey::new(&self.province, &self.canton, &self.parish)
    }
}
