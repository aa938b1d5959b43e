use chrono::{DateTime, Duration, Utc};
use sgp4::{Constants, Elements};

use crate::predict::error::PredictError;
use crate::predict::events::find_events;
use crate::predict::types::{Event, Look};
use crate::predict::GroundStation;

/// Orbit/geometry source consulted for one satellite.
pub trait Ephemeris {
    fn name(&self) -> &str;

    /// Topocentric look angles from `station` at `at`.
    fn look(&self, station: &GroundStation, at: DateTime<Utc>) -> Result<Look, PredictError>;

    /// Chronological rise/culmination/set events above `mask_deg` within
    /// `[start, end]`.
    fn find_events(
        &self,
        station: &GroundStation,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        mask_deg: f64,
        step: Duration,
    ) -> Result<Vec<Event>, PredictError> {
        find_events(self, station, start, end, mask_deg, step)
    }
}

/// A named satellite propagated with SGP4.
pub struct Sgp4Satellite {
    name: String,
    norad_id: u64,
    elements: Elements,
    constants: Constants,
}

impl Sgp4Satellite {
    pub fn new(name: String, elements: Elements) -> Result<Self, PredictError> {
        let constants =
            Constants::from_elements(&elements).map_err(|e| PredictError::InvalidTle {
                source_name: name.clone(),
                message: e.to_string(),
            })?;
        Ok(Self {
            name,
            norad_id: elements.norad_id,
            elements,
            constants,
        })
    }

    pub fn norad_id(&self) -> u64 {
        self.norad_id
    }
}

impl Ephemeris for Sgp4Satellite {
    fn name(&self) -> &str {
        &self.name
    }

    fn look(&self, station: &GroundStation, at: DateTime<Utc>) -> Result<Look, PredictError> {
        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&at.naive_utc())
            .map_err(|e| PredictError::Propagation(e.to_string()))?;

        let prediction = self.constants.propagate(minutes)?;

        let sidereal =
            sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&at.naive_utc()));
        let sat_ecef = teme_to_ecef_position(prediction.position, sidereal);
        let sta_ecef = station.position_ecef_km();

        let dr = [
            sat_ecef[0] - sta_ecef[0],
            sat_ecef[1] - sta_ecef[1],
            sat_ecef[2] - sta_ecef[2],
        ];
        let range_km = (dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2]).sqrt();

        let (east, north, up) = ecef_to_enu(dr, station.lat_rad(), station.lon_rad());
        let elevation_deg = if range_km > 0.0 {
            (up / range_km).asin().to_degrees()
        } else {
            0.0
        };

        Ok(Look {
            azimuth_deg: east.atan2(north).to_degrees().rem_euclid(360.0),
            elevation_deg,
            range_km,
        })
    }
}

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let (sin_gmst, cos_gmst) = gmst.sin_cos();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let (sin_lat, cos_lat) = lat_rad.sin_cos();
    let (sin_lon, cos_lon) = lon_rad.sin_cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}
