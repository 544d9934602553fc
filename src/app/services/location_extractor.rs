//! Distinct location extraction
//!
//! Derives the distinct province/canton/parish keys of a record set, in order
//! of first appearance, together with the geocoding query for each.

use crate::app::models::{LocationKey, Record};
use std::collections::HashSet;
use tracing::debug;

/// A distinct location and its canonical geocoding query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery {
    pub key: LocationKey,
    pub query: String,
}

/// Distinct location keys in order of first appearance, with their queries
pub fn extract_locations(records: &[Record], country: &str) -> Vec<LocationQuery> {
    let mut seen = HashSet::new();
    let locations: Vec<LocationQuery> = records
        .iter()
        .filter(|record| seen.insert(&record.location))
        .map(|record| LocationQuery {
            key: record.location.clone(),
            query: record.location.query(country),
        })
        .collect();

    debug!(
        "Extracted {} distinct locations from {} records",
        locations.len(),
        records.len()
    );
    locations
}
