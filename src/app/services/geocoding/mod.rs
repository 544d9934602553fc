//! Geocoding of administrative locations
//!
//! The provider sits behind the [`Geocoder`] trait. [`GeocodingClient`] wraps
//! any provider with rate limiting and retries and never fails: every query
//! ends as a [`Resolution`], and both "no match" and "gave up" mean the query
//! has no coordinates.

use crate::app::models::Coordinates;
use std::time::Duration;

pub mod client;
pub mod nominatim;

#[cfg(test)]
pub mod tests;

pub use client::GeocodingClient;
pub use nominatim::NominatimGeocoder;

/// Transient provider failure; the client retries these
#[derive(thiserror::Error, Debug)]
pub enum GeocodeError {
    /// Provider answered with an error status
    #[error("provider returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Request never got an answer (DNS, connection, timeout)
    #[error("transport error: {0}")]
    Transport(String),

    /// Provider answered with something that is not a geocoding result
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// External geocoding provider
pub trait Geocoder {
    /// Resolve a free-form address
    ///
    /// Returns `Ok(None)` when the provider has no match.
    fn geocode(&self, query: &str, timeout: Duration) -> Result<Option<Coordinates>, GeocodeError>;
}

impl<G: Geocoder + ?Sized> Geocoder for &G {
    fn geocode(
        &self,
        query: &str,
        timeout: Duration,
    ) -> Result<Option<Coordinates>, GeocodeError> {
        (**self).geocode(query, timeout)
    }
}

impl<G: Geocoder + ?Sized> Geocoder for Box<G> {
    fn geocode(
        &self,
        query: &str,
        timeout: Duration,
    ) -> Result<Option<Coordinates>, GeocodeError> {
        (**self).geocode(query, timeout)
    }
}

/// Final outcome of resolving one query
#[derive(Debug)]
pub enum Resolution {
    /// Provider returned coordinates
    Found(Coordinates),

    /// Provider answered but had no match
    NotFound,

    /// Every attempt failed
    Failed { attempts: u32, error: GeocodeError },
}

impl Resolution {
    /// Coordinates to cache; `None` for both kinds of failure
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            Resolution::Found(coordinates) => Some(*coordinates),
            Resolution::NotFound | Resolution::Failed { .. } => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }
}
