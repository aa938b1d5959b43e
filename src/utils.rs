use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use thiserror::Error;

const OFFSET_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
];

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

#[derive(Debug, Error, PartialEq)]
#[error("malformed timestamp: {input:?}")]
pub struct MalformedTimestamp {
    pub input: String,
}

/// Parses an ISO-8601 instant and normalizes it to UTC.
///
/// A trailing `Z` is read as a zero offset. Text without any offset is taken
/// to be UTC already; a bare date means midnight.
pub fn parse_utc_timestamp(text: &str) -> Result<DateTime<Utc>, MalformedTimestamp> {
    let trimmed = text.trim();
    let malformed = || MalformedTimestamp {
        input: text.to_string(),
    };

    let normalized = match trimmed.strip_suffix('Z') {
        Some(body) => format!("{}+00:00", body),
        None => trimmed.to_string(),
    };

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Ok(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(malformed)
}

/// Data volume in decimal megabytes moved at `rate_mbps` for `duration_s`,
/// scaled by the link efficiency.
pub fn estimate_data_volume_mb(rate_mbps: f64, duration_s: f64, efficiency: f64) -> f64 {
    (rate_mbps * 1e6 / 8.0) * duration_s * efficiency / 1e6
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// The instant as reports show it, to the nearest whole second
pub fn nearest_second(at: DateTime<Utc>) -> DateTime<Utc> {
    at.round_subsecs(0)
}
