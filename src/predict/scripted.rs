//! Replayable ephemeris for tests.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::predict::error::PredictError;
use crate::predict::propagation::Ephemeris;
use crate::predict::types::{Event, EventKind, Look};
use crate::predict::GroundStation;

pub const ISS_LINE1: &str =
    "1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992";
pub const ISS_LINE2: &str =
    "2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008";

/// Replays fixed event lists per station and answers look queries from a
/// table of elevations, falling back to a constant.
pub struct ScriptedEphemeris {
    pub name: String,
    pub events: HashMap<String, Vec<Event>>,
    pub elevations: HashMap<DateTime<Utc>, f64>,
    pub default_elevation_deg: f64,
}

impl ScriptedEphemeris {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            events: HashMap::new(),
            elevations: HashMap::new(),
            default_elevation_deg: 45.0,
        }
    }

    pub fn with_events(mut self, station: &str, events: Vec<Event>) -> Self {
        self.events.insert(station.to_string(), events);
        self
    }

    pub fn with_elevation(mut self, at: DateTime<Utc>, elevation_deg: f64) -> Self {
        self.elevations.insert(at, elevation_deg);
        self
    }
}

impl Ephemeris for ScriptedEphemeris {
    fn name(&self) -> &str {
        &self.name
    }

    fn look(&self, _: &GroundStation, at: DateTime<Utc>) -> Result<Look, PredictError> {
        Ok(Look {
            azimuth_deg: 180.0,
            elevation_deg: self
                .elevations
                .get(&at)
                .copied()
                .unwrap_or(self.default_elevation_deg),
            range_km: 800.0,
        })
    }

    fn find_events(
        &self,
        station: &GroundStation,
        _: DateTime<Utc>,
        _: DateTime<Utc>,
        _: f64,
        _: Duration,
    ) -> Result<Vec<Event>, PredictError> {
        Ok(self.events.get(&station.name).cloned().unwrap_or_default())
    }
}

/// Build events from `(seconds after t0, kind)` pairs
pub fn script(t0: DateTime<Utc>, steps: &[(i64, EventKind)]) -> Vec<Event> {
    steps
        .iter()
        .map(|(s, kind)| Event::new(t0 + Duration::seconds(*s), *kind))
        .collect()
}
