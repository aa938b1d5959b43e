use chrono::{DateTime, Duration, Utc};

use crate::predict::error::PredictError;
use crate::predict::propagation::Ephemeris;
use crate::predict::types::{Event, EventKind};
use crate::predict::GroundStation;

const REFINE_RESOLUTION_MS: i64 = 1;
const GOLDEN_RATIO_CONJUGATE: f64 = 0.618_033_988_749_895;

/// Sample the elevation every `step` across `[start, end]` and turn the
/// samples into rise/culmination/set events above `mask_deg`.
///
/// Mask crossings are bisected down to a millisecond. Interior elevation
/// maxima above the mask are refined by golden-section search and reported
/// as culminations. A pass already open at `start` has no rise; one still
/// open at `end` has no set.
pub fn find_events<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    station: &GroundStation,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    mask_deg: f64,
    step: Duration,
) -> Result<Vec<Event>, PredictError> {
    let mut samples = Vec::new();
    let mut cursor = start;
    while cursor < end {
        samples.push((cursor, ephemeris.look(station, cursor)?.elevation_deg));
        cursor += step;
    }
    samples.push((end, ephemeris.look(station, end)?.elevation_deg));

    let mut events = Vec::new();

    for pair in samples.windows(2) {
        let (t0, el0) = pair[0];
        let (t1, el1) = pair[1];
        let above0 = el0 >= mask_deg;
        let above1 = el1 >= mask_deg;

        if !above0 && above1 {
            let at = refine_crossing(ephemeris, station, t0, t1, mask_deg, true)?;
            events.push(Event::new(at, EventKind::Rise));
        } else if above0 && !above1 {
            let at = refine_crossing(ephemeris, station, t0, t1, mask_deg, false)?;
            events.push(Event::new(at, EventKind::Set));
        }
    }

    for triple in samples.windows(3) {
        let (before, el_before) = triple[0];
        let (_, el_mid) = triple[1];
        let (after, el_after) = triple[2];

        if el_mid > el_before && el_mid >= el_after && el_mid >= mask_deg {
            let (at, el) = refine_maximum(ephemeris, station, before, after)?;
            if el >= mask_deg {
                events.push(Event::new(at, EventKind::Culmination));
            }
        }
    }

    events.sort_by_key(|e| e.at);

    log::trace!(
        "{} over {}: {} samples, {} events",
        ephemeris.name(),
        station.name,
        samples.len(),
        events.len()
    );

    Ok(events)
}

/// Binary search for the instant the elevation crosses `mask_deg`
fn refine_crossing<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    station: &GroundStation,
    before: DateTime<Utc>,
    after: DateTime<Utc>,
    mask_deg: f64,
    rising: bool,
) -> Result<DateTime<Utc>, PredictError> {
    let mut low = before;
    let mut high = after;

    while (high - low).num_milliseconds() > REFINE_RESOLUTION_MS {
        let mid = low + (high - low) / 2;
        let above = ephemeris.look(station, mid)?.elevation_deg >= mask_deg;
        if above == rising {
            high = mid;
        } else {
            low = mid;
        }
    }

    Ok(if rising { high } else { low })
}

/// Golden-section search for the elevation peak within `[before, after]`
fn refine_maximum<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    station: &GroundStation,
    before: DateTime<Utc>,
    after: DateTime<Utc>,
) -> Result<(DateTime<Utc>, f64), PredictError> {
    let elevation = |ms: i64| -> Result<f64, PredictError> {
        Ok(ephemeris
            .look(station, before + Duration::milliseconds(ms))?
            .elevation_deg)
    };

    let mut low = 0_i64;
    let mut high = (after - before).num_milliseconds();

    while high - low > 3 * REFINE_RESOLUTION_MS {
        let span = (high - low) as f64;
        let left = high - (span * GOLDEN_RATIO_CONJUGATE).round() as i64;
        let right = low + (span * GOLDEN_RATIO_CONJUGATE).round() as i64;
        if elevation(left)? < elevation(right)? {
            low = left;
        } else {
            high = right;
        }
    }

    let mut best = (low, elevation(low)?);
    for ms in low + 1..=high {
        let el = elevation(ms)?;
        if el > best.1 {
            best = (ms, el);
        }
    }

    Ok((before + Duration::milliseconds(best.0), best.1))
}
