//! Rate-limited, retrying geocoding client

use super::{Geocoder, Resolution};
use crate::config::GeocoderConfig;
use std::thread;
use std::time::Instant;
use tracing::{debug, warn};

/// Wraps a [`Geocoder`] with a minimum inter-call delay and bounded retries
///
/// Calls are sequential and waits block the thread; nothing else runs while
/// the client is waiting.
#[derive(Debug)]
pub struct GeocodingClient<G> {
    geocoder: G,
    config: GeocoderConfig,
    last_call: Option<Instant>,
    calls: usize,
}

impl<G: Geocoder> GeocodingClient<G> {
    pub fn new(geocoder: G, config: GeocoderConfig) -> Self {
        Self {
            geocoder,
            config,
            last_call: None,
            calls: 0,
        }
    }

    /// Resolve `query`, absorbing every provider failure
    ///
    /// A "no match" answer is final. Provider errors are retried up to
    /// `max_retries` times with `error_wait` between attempts.
    pub fn resolve(&mut self, query: &str) -> Resolution {
        let max_attempts = self.config.max_retries + 1;
        let mut attempt = 0;

        loop {
            attempt += 1;
            self.throttle();

            match self.geocoder.geocode(query, self.config.timeout) {
                Ok(Some(coordinates)) => {
                    debug!("Geocoded '{}' to {}", query, coordinates);
                    return Resolution::Found(coordinates);
                }
                Ok(None) => {
                    warn!("No geocoding match for '{}'", query);
                    return Resolution::NotFound;
                }
                Err(error) if attempt < max_attempts => {
                    warn!(
                        "Error geocoding '{}' (attempt {}/{}): {}; retrying in {:?}",
                        query, attempt, max_attempts, error, self.config.error_wait
                    );
                    thread::sleep(self.config.error_wait);
                }
                Err(error) => {
                    warn!(
                        "Error geocoding '{}' after {} attempts: {}",
                        query, attempt, error
                    );
                    return Resolution::Failed {
                        attempts: attempt,
                        error,
                    };
                }
            }
        }
    }

    /// Block until `min_delay` has passed since the previous call started
    fn throttle(&mut self) {
        if let Some(last_call) = self.last_call {
            let elapsed = last_call.elapsed();
            if elapsed < self.config.min_delay {
                thread::sleep(self.config.min_delay - elapsed);
            }
        }
        self.last_call = Some(Instant::now());
        self.calls += 1;
    }

    /// Provider calls made so far, retries included
    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }
}
