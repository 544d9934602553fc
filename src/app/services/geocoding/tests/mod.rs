//! Shared test utilities for geocoding tests

use super::{GeocodeError, Geocoder};
use crate::app::models::Coordinates;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;


/// Scripted provider answer
#[derive(Debug, Clone)]
pub enum Answer {
    Hit(Coordinates),
    Miss,
    Fail,
}

/// In-memory provider that answers from a script and records every call
///
/// Answers for a query are consumed in order; the last one repeats. Unknown
/// queries are a miss.
#[derive(Debug, Default)]
pub struct ScriptedGeocoder {
    script: RefCell<HashMap<String, VecDeque<Answer>>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with `answers`, in order
    pub fn with(self, query: &str, answers: &[Answer]) -> Self {
        self.script
            .borrow_mut()
            .insert(query.to_string(), answers.iter().cloned().collect());
        self
    }

    /// Answer `query` with coordinates every time
    pub fn hit(self, query: &str, lat: f64, lon: f64) -> Self {
        self.with(query, &[Answer::Hit(Coordinates::new(lat, lon))])
    }

    /// Every query seen, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Number of calls made for `query`
    pub fn calls_for(&self, query: &str) -> usize {
        self.calls.borrow().iter().filter(|q| *q == query).count()
    }
}

impl Geocoder for ScriptedGeocoder {
    fn geocode(
        &self,
        query: &str,
        _timeout: Duration,
    ) -> Result<Option<Coordinates>, GeocodeError> {
        self.calls.borrow_mut().push(query.to_string());

        let mut script = self.script.borrow_mut();
        let answer = match script.get_mut(query) {
            Some(answers) if answers.len() > 1 => answers.pop_front(),
            Some(answers) => answers.front().cloned(),
            None => None,
        };

        match answer {
            Some(Answer::Hit(coordinates)) => Ok(Some(coordinates)),
            Some(Answer::Fail) => Err(GeocodeError::Transport("connection timed out".to_string())),
            Some(Answer::Miss) | None => Ok(None),
        }
    }
}
