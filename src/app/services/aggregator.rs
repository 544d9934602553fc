//! Marker aggregation
//!
//! Joins resolved coordinates onto every record and folds the records into one
//! marker per (location, coordinates) group. Groups iterate in sorted order
//! (province, canton, parish, then coordinates) so marker ids are
//! deterministic for a given input and cache.

use crate::app::models::{Coordinates, LocationKey, Marker, Record};
use crate::app::services::location_extractor::LocationQuery;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};

/// Markers plus what was left out of them
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// Markers in id order
    pub markers: Vec<Marker>,

    /// Groups dropped because their location has no coordinates
    pub skipped_locations: usize,

    /// Records in the dropped groups
    pub skipped_records: usize,
}

/// Grouping key: location plus its resolved coordinates
///
/// A location has exactly one query, so the coordinates never split a
/// location in two; two locations sharing coordinates stay apart.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey {
    location: LocationKey,
    coordinates: Option<Coordinates>,
}

#[derive(Debug, Default)]
struct Group {
    businesses: BTreeSet<String>,
    records: usize,
}

/// Build markers from records, their distinct locations and the resolution of each query
///
/// # Arguments
/// * `records` - All input records
/// * `locations` - Distinct locations with their queries
/// * `resolved` - Coordinates per query; `None` or a missing query means unresolved
pub fn aggregate(
    records: Vec<Record>,
    locations: Vec<LocationQuery>,
    resolved: &HashMap<String, Option<Coordinates>>,
) -> Aggregation {
    // Location -> coordinates, through the location's query
    let coordinates_by_location: HashMap<LocationKey, Option<Coordinates>> = locations
        .into_iter()
        .map(|location| {
            let coordinates = resolved.get(&location.query).copied().flatten();
            (location.key, coordinates)
        })
        .collect();

    // Record -> coordinates, through the record's location
    let mut groups: BTreeMap<GroupKey, Group> = BTreeMap::new();
    for record in records {
        let coordinates = coordinates_by_location
            .get(&record.location)
            .copied()
            .flatten();
        let group = groups
            .entry(GroupKey {
                location: record.location,
                coordinates,
            })
            .or_default();

        group.records += 1;
        if !record.business_name.trim().is_empty() {
            group.businesses.insert(record.business_name);
        }
    }

    let mut aggregation = Aggregation::default();
    for (key, group) in groups {
        let Some(coordinates) = key.coordinates else {
            debug!(
                "Skipping {} ({} records): no coordinates",
                key.location, group.records
            );
            aggregation.skipped_locations += 1;
            aggregation.skipped_records += group.records;
            continue;
        };

        let businesses: Vec<String> = group.businesses.into_iter().collect();
        aggregation.markers.push(Marker {
            id: aggregation.markers.len(),
            province: key.location.province,
            canton: key.location.canton,
            parish: key.location.parish,
            lat: coordinates.lat,
            lon: coordinates.lon,
            count: businesses.len(),
            businesses,
        });
    }

    info!(
        "Aggregated {} markers; {} locations ({} records) had no coordinates",
        aggregation.markers.len(),
        aggregation.skipped_locations,
        aggregation.skipped_records
    );

    aggregation
}
