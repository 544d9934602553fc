//! Application constants for the parish marker builder
//!
//! This module contains default file names, input column names, geocoding
//! policy values and output field names used throughout the application.

use std::time::Duration;

// =============================================================================
// Input Columns
// =============================================================================

/// Default column holding the province name
pub const PROVINCE_COLUMN: &str = "DESCRIPCION_PROVINCIA_EST";

/// Default column holding the canton name
pub const CANTON_COLUMN: &str = "DESCRIPCION_CANTON_EST";

/// Default column holding the parish name
pub const PARISH_COLUMN: &str = "DESCRIPCION_PARROQUIA_EST";

/// Default column holding the business (trade) name
pub const BUSINESS_NAME_COLUMN: &str = "NOMBRE_FANTASIA_COMERCIAL";

/// Default field delimiter of the input table
pub const DEFAULT_DELIMITER: u8 = b',';

// =============================================================================
// Files
// =============================================================================

/// Default geocode cache file, relative to the working directory
pub const DEFAULT_CACHE_FILE: &str = "parroquia_coords_cache.csv";

/// Default marker output file, relative to the working directory
pub const DEFAULT_OUTPUT_FILE: &str = "markers.json";

/// Header of the persisted geocode cache
pub mod cache_columns {
    pub const QUERY: &str = "query";
    pub const LAT: &str = "lat";
    pub const LON: &str = "lon";

    pub const HEADER: [&str; 3] = [QUERY, LAT, LON];
}

// =============================================================================
// Geocoding
// =============================================================================

/// Country appended to every geocoding query
pub const DEFAULT_COUNTRY: &str = "Ecuador";

/// Public Nominatim endpoint
pub const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// User agent sent to Nominatim (its usage policy requires an identifying agent)
pub const DEFAULT_USER_AGENT: &str = "mapa_librerias_script_v1";

/// Per-request timeout for the geocoding provider
pub const GEOCODE_TIMEOUT: Duration = Duration::from_secs(10);

/// Minimum delay between two provider calls
pub const GEOCODE_MIN_DELAY: Duration = Duration::from_secs(1);

/// Retries after a failed provider call
pub const GEOCODE_MAX_RETRIES: u32 = 2;

/// Wait before retrying a failed provider call
pub const GEOCODE_ERROR_WAIT: Duration = Duration::from_secs(5);
