use serde::Deserialize;

// WGS-84
const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6378.137;
const EARTH_ECCENTRICITY_SQ: f64 = 0.00669437999014;

/// A ground station together with the elevation mask it observes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GroundStation {
    pub name: String,
    #[serde(rename = "lat_deg")]
    pub latitude_deg: f64,
    #[serde(rename = "lon_deg")]
    pub longitude_deg: f64,
    #[serde(rename = "alt_m")]
    pub altitude_m: f64,
    #[serde(default)]
    pub mask_deg: f64,
}

impl GroundStation {
    #[cfg(test)]
    pub fn new(name: &str, latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            name: name.to_string(),
            latitude_deg,
            longitude_deg,
            altitude_m,
            mask_deg: 0.0,
        }
    }

    #[cfg(test)]
    pub fn with_mask(mut self, mask_deg: f64) -> Self {
        self.mask_deg = mask_deg;
        self
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        let lat = self.lat_rad();
        let lon = self.lon_rad();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();
        let n = EARTH_EQUATORIAL_RADIUS_KM / (1.0 - EARTH_ECCENTRICITY_SQ * sin_lat * sin_lat).sqrt();
        let alt_km = self.altitude_m / 1000.0;
        [
            (n + alt_km) * cos_lat * cos_lon,
            (n + alt_km) * cos_lat * sin_lon,
            (n * (1.0 - EARTH_ECCENTRICITY_SQ) + alt_km) * sin_lat,
        ]
    }
}
