use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("TLE file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Invalid TLE format in {source_name}: {message}")]
    InvalidTle {
        source_name: String,
        message: String,
    },
    #[error("Propagation error: {0}")]
    Propagation(String),
    #[error(
        "Set at {set} precedes rise at {rise} for {satellite} over {station}"
    )]
    InvalidEventOrdering {
        satellite: String,
        station: String,
        rise: DateTime<Utc>,
        set: DateTime<Utc>,
    },
    #[error("No entry named {requested:?} among {candidates} satellites in {source_name}")]
    SatelliteResolutionAmbiguous {
        requested: String,
        candidates: usize,
        source_name: String,
    },
    #[error("No satellites in {0}")]
    NoSatellites(String),
    #[error("Unsupported TLE source {0}: download it and reference the local file")]
    UnsupportedSource(String),
}

impl From<sgp4::Error> for PredictError {
    fn from(err: sgp4::Error) -> Self {
        PredictError::Propagation(err.to_string())
    }
}
