mod error;
mod events;
mod ground_station;
mod pass_finder;
mod propagation;
#[cfg(test)]
pub mod scripted;
mod tle_loader;
mod types;

pub use error::PredictError;
pub use ground_station::GroundStation;
pub use pass_finder::predict_passes;
#[cfg(test)]
pub use pass_finder::interpret_events;
pub use propagation::{Ephemeris, Sgp4Satellite};
pub use tle_loader::{open_tle_source, InlineElements, Resolution, SatelliteResolver};
#[cfg(test)]
pub use types::{Event, EventKind};
pub use types::{Pass, ScanParameters};
