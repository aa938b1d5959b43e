use rayon::prelude::*;

use crate::config::{SatelliteConfig, SatelliteSource};
use crate::predict::{
    open_tle_source, predict_passes, Ephemeris, GroundStation, InlineElements, Pass,
    PredictError, Resolution, SatelliteResolver, ScanParameters, Sgp4Satellite,
};

/// Resolve every configured satellite to a propagatable entity.
///
/// A name missing from a multi-satellite TLE file is fatal unless
/// `allow_best_effort` is set, in which case the first entry of the file is
/// used and a warning logged.
pub fn resolve_satellites(
    satellites: &[SatelliteConfig],
    allow_best_effort: bool,
) -> Result<Vec<Sgp4Satellite>, PredictError> {
    satellites
        .iter()
        .map(|sat| {
            let resolved = match &sat.source {
                SatelliteSource::Inline { tle1, tle2 } => {
                    InlineElements::new(tle1, tle2).resolve(&sat.name)?
                }
                SatelliteSource::Url { tle_url } => {
                    open_tle_source(tle_url)?.resolver().resolve(&sat.name)?
                }
            };

            match resolved.resolution {
                Resolution::Exact => {
                    log::info!(
                        "Resolved {} (NORAD {})",
                        resolved.satellite.name(),
                        resolved.satellite.norad_id()
                    );
                }
                Resolution::BestEffort {
                    requested,
                    substituted,
                    candidates,
                    source_name,
                } => {
                    if !allow_best_effort {
                        return Err(PredictError::SatelliteResolutionAmbiguous {
                            requested,
                            candidates,
                            source_name,
                        });
                    }
                    log::warn!(
                        "No entry named {:?} among {} satellites in {}; using {:?}",
                        requested,
                        candidates,
                        source_name,
                        substituted
                    );
                }
            }

            Ok(resolved.satellite)
        })
        .collect()
}

/// Run every satellite/station pair and collect the passes in
/// satellite-major, station-minor, chronological order.
pub fn build_catalog<E: Ephemeris + Sync>(
    satellites: &[E],
    stations: &[GroundStation],
    params: &ScanParameters,
    parallel: bool,
) -> Result<Vec<Pass>, PredictError> {
    let pairs: Vec<(&E, &GroundStation)> = satellites
        .iter()
        .flat_map(|sat| stations.iter().map(move |station| (sat, station)))
        .collect();

    let catalog = if parallel {
        // Indexed collect keeps pair order, so the merge matches a sequential run
        pairs
            .par_iter()
            .map(|(sat, station)| predict_passes(*sat, station, params))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
    } else {
        let mut catalog = Vec::new();
        for (sat, station) in pairs {
            catalog.extend(predict_passes(sat, station, params)?);
        }
        catalog
    };

    log::info!(
        "{} passes across {} satellites and {} stations",
        catalog.len(),
        satellites.len(),
        stations.len()
    );

    Ok(catalog)
}
