//! Cache-first resolution of location queries.
//!
//! Each distinct query is either answered from the cache or sent to the
//! geocoding client, whose outcome is written through to the cache before the
//! next query starts. A query with any cache entry, unresolved ones included,
//! never reaches the provider.

use crate::app::models::Coordinates;
use crate::app::services::geocode_cache::GeocodeCache;
use crate::app::services::geocoding::{Geocoder, GeocodingClient, Resolution};
use crate::app::services::location_extractor::LocationQuery;
use crate::Result;

use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Coordinates per query plus how each query was answered
#[derive(Debug, Clone, Default)]
pub struct ResolvedQueries {
    /// Coordinates by query; `None` for unresolved queries
    pub coordinates: HashMap<String, Option<Coordinates>>,

    /// Queries answered from the cache
    pub cache_hits: usize,

    /// Provider returned coordinates
    pub found: usize,

    /// Provider had no match
    pub not_found: usize,

    /// Provider kept failing until retries ran out
    pub failed: usize,

    /// Provider calls, retries included
    pub provider_calls: usize,
}

impl ResolvedQueries {
    /// Queries that went to the provider
    pub fn provider_resolutions(&self) -> usize {
        self.found + self.not_found + self.failed
    }
}

/// Resolve every location's query, consulting `cache` before `client`
pub fn resolve_queries<G: Geocoder>(
    locations: &[LocationQuery],
    cache: &mut GeocodeCache,
    client: &mut GeocodingClient<G>,
    show_progress: bool,
) -> Result<ResolvedQueries> {
    let mut resolved = ResolvedQueries::default();
    let mut pending = Vec::new();
    let mut seen = HashSet::new();

    for location in locations {
        let query = location.query.as_str();
        if !seen.insert(query) {
            continue;
        }

        match cache.lookup(query) {
            Some(entry) => {
                debug!("Cache hit for '{}': {:?}", query, entry);
                resolved.cache_hits += 1;
                resolved
                    .coordinates
                    .insert(query.to_string(), entry.coordinates());
            }
            None => {
                debug!("Cache miss for '{}'", query);
                pending.push(query);
            }
        }
    }

    info!(
        "{} queries cached, {} to geocode",
        resolved.cache_hits,
        pending.len()
    );

    let pb = create_progress_bar(pending.len(), show_progress);
    let calls_before = client.calls();

    for query in pending {
        if let Some(pb) = &pb {
            pb.set_message(query.to_string());
        }

        let resolution = client.resolve(query);
        match &resolution {
            Resolution::Found(_) => resolved.found += 1,
            Resolution::NotFound => resolved.not_found += 1,
            Resolution::Failed { .. } => resolved.failed += 1,
        }

        let coordinates = resolution.coordinates();
        cache.put(query, coordinates)?;
        resolved.coordinates.insert(query.to_string(), coordinates);

        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Geocoding complete");
    }

    resolved.provider_calls = client.calls() - calls_before;
    info!(
        "Geocoded {} queries: {} found, {} not found, {} failed ({} provider calls)",
        resolved.provider_resolutions(),
        resolved.found,
        resolved.not_found,
        resolved.failed,
        resolved.provider_calls
    );

    Ok(resolved)
}

fn create_progress_bar(total: usize, show_progress: bool) -> Option<ProgressBar> {
    if !show_progress || total == 0 {
        return None;
    }

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ETA: {eta} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    Some(pb)
}
