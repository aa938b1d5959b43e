use chrono::{DateTime, Utc};
use strum_macros::Display;

/// Kind of a visibility event for one satellite/station pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    Rise,
    Culmination,
    Set,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub at: DateTime<Utc>,
    pub kind: EventKind,
}

impl Event {
    pub fn new(at: DateTime<Utc>, kind: EventKind) -> Self {
        Self { at, kind }
    }
}

/// Topocentric look angles from a station to a satellite
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Look {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
}

/// A contact window that cleared the minimum-duration filter
#[derive(Debug, Clone, PartialEq)]
pub struct Pass {
    pub satellite: String,
    pub station: String,
    pub mask_deg: f64,
    pub aos: DateTime<Utc>,
    pub los: DateTime<Utc>,
    pub duration_s: f64,
    pub max_elevation_deg: f64,
    pub downlink_mbps: f64,
    pub efficiency: f64,
    pub data_mb_est: f64,
}

/// Inputs shared by every pair of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanParameters {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub min_duration_s: f64,
    pub downlink_mbps: f64,
    pub efficiency: f64,
    pub search_step: chrono::Duration,
}
