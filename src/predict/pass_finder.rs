use crate::predict::error::PredictError;
use crate::predict::propagation::Ephemeris;
use crate::predict::types::{Event, EventKind, Pass, ScanParameters};
use crate::predict::GroundStation;
use crate::utils::{estimate_data_volume_mb, round_to};

// Reported precision of a pass
const DURATION_DECIMALS: i32 = 1;
const ELEVATION_DECIMALS: i32 = 2;
const DATA_DECIMALS: i32 = 2;

/// Turns a chronological event stream for one satellite/station pair into
/// passes.
///
/// The scanner looks at three events at a time. An exact
/// rise/culmination/set window becomes a pass (or is dropped whole when it is
/// too short); any other window advances by a single event so that the scan
/// resynchronizes after truncated or interleaved sequences. Fewer than three
/// trailing events are never matched.
///
/// Durations, peak elevations and data volumes are stored at the precision
/// they are reported with, and the minimum-duration filter applies to the
/// reported duration. Data volume is derived from the exact duration.
pub struct PassScanner<'a, E: ?Sized> {
    events: &'a [Event],
    cursor: usize,
    ephemeris: &'a E,
    station: &'a GroundStation,
    params: &'a ScanParameters,
}

impl<'a, E: Ephemeris + ?Sized> PassScanner<'a, E> {
    pub fn new(
        events: &'a [Event],
        ephemeris: &'a E,
        station: &'a GroundStation,
        params: &'a ScanParameters,
    ) -> Self {
        Self {
            events,
            cursor: 0,
            ephemeris,
            station,
            params,
        }
    }

    fn build_pass(
        &self,
        rise: &Event,
        culmination: &Event,
        set: &Event,
        exact_duration_s: f64,
    ) -> Result<Pass, PredictError> {
        let peak = self.ephemeris.look(self.station, culmination.at)?;
        log::trace!(
            "{} over {}: culmination at {} az {:.1} range {:.0} km",
            self.ephemeris.name(),
            self.station.name,
            culmination.at,
            peak.azimuth_deg,
            peak.range_km
        );

        Ok(Pass {
            satellite: self.ephemeris.name().to_string(),
            station: self.station.name.clone(),
            mask_deg: self.station.mask_deg,
            aos: rise.at,
            los: set.at,
            duration_s: round_to(exact_duration_s, DURATION_DECIMALS),
            max_elevation_deg: round_to(peak.elevation_deg, ELEVATION_DECIMALS),
            downlink_mbps: self.params.downlink_mbps,
            efficiency: self.params.efficiency,
            data_mb_est: round_to(
                estimate_data_volume_mb(
                    self.params.downlink_mbps,
                    exact_duration_s,
                    self.params.efficiency,
                ),
                DATA_DECIMALS,
            ),
        })
    }
}

impl<E: Ephemeris + ?Sized> Iterator for PassScanner<'_, E> {
    type Item = Result<Pass, PredictError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor + 2 < self.events.len() {
            let window = &self.events[self.cursor..self.cursor + 3];

            let (rise, culmination, set) = match (window[0].kind, window[1].kind, window[2].kind) {
                (EventKind::Rise, EventKind::Culmination, EventKind::Set) => {
                    (&window[0], &window[1], &window[2])
                }
                _ => {
                    log::trace!(
                        "{} over {}: skipping {} at {}",
                        self.ephemeris.name(),
                        self.station.name,
                        window[0].kind,
                        window[0].at
                    );
                    self.cursor += 1;
                    continue;
                }
            };
            self.cursor += 3;

            let exact_duration_s = (set.at - rise.at).num_milliseconds() as f64 / 1000.0;
            if exact_duration_s < 0.0 {
                self.cursor = self.events.len();
                return Some(Err(PredictError::InvalidEventOrdering {
                    satellite: self.ephemeris.name().to_string(),
                    station: self.station.name.clone(),
                    rise: rise.at,
                    set: set.at,
                }));
            }

            if round_to(exact_duration_s, DURATION_DECIMALS) < self.params.min_duration_s {
                log::debug!(
                    "{} over {}: dropping {:.3} s pass at {}",
                    self.ephemeris.name(),
                    self.station.name,
                    exact_duration_s,
                    rise.at
                );
                continue;
            }

            return Some(self.build_pass(rise, culmination, set, exact_duration_s));
        }

        None
    }
}

/// Collect every pass in `events`, stopping at the first contract violation
pub fn interpret_events<E: Ephemeris + ?Sized>(
    events: &[Event],
    ephemeris: &E,
    station: &GroundStation,
    params: &ScanParameters,
) -> Result<Vec<Pass>, PredictError> {
    PassScanner::new(events, ephemeris, station, params).collect()
}

/// Generate the events for one pair and interpret them
pub fn predict_passes<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    station: &GroundStation,
    params: &ScanParameters,
) -> Result<Vec<Pass>, PredictError> {
    let events = ephemeris.find_events(
        station,
        params.start,
        params.end,
        station.mask_deg,
        params.search_step,
    )?;
    let passes = interpret_events(&events, ephemeris, station, params)?;

    log::debug!(
        "{} over {}: {} events, {} passes",
        ephemeris.name(),
        station.name,
        events.len(),
        passes.len()
    );

    Ok(passes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::scripted::{script, ScriptedEphemeris};
    use approx::assert_relative_eq;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rstest::*;
    use crate::predict::types::EventKind::{Culmination as C, Rise as R, Set as S};

    #[fixture]
    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()
    }

    #[fixture]
    fn station() -> GroundStation {
        GroundStation::new("Kiruna", 67.86, 20.96, 390.0).with_mask(5.0)
    }

    fn params(t0: DateTime<Utc>, min_duration_s: f64) -> ScanParameters {
        ScanParameters {
            start: t0,
            end: t0 + Duration::days(1),
            min_duration_s,
            downlink_mbps: 10.0,
            efficiency: 0.8,
            search_step: Duration::seconds(60),
        }
    }

    fn run(
        t0: DateTime<Utc>,
        station: &GroundStation,
        steps: &[(i64, EventKind)],
        min_duration_s: f64,
    ) -> Result<Vec<Pass>, PredictError> {
        let sat = ScriptedEphemeris::new("SAT-1");
        interpret_events(&script(t0, steps), &sat, station, &params(t0, min_duration_s))
    }

    #[rstest]
    fn single_pass_end_to_end(t0: DateTime<Utc>, station: GroundStation) {
        let sat =
            ScriptedEphemeris::new("SAT-1").with_elevation(t0 + Duration::seconds(300), 62.5);
        let events = script(t0, &[(0, R), (300, C), (600, S)]);
        let passes = interpret_events(&events, &sat, &station, &params(t0, 0.0)).unwrap();

        assert_eq!(passes.len(), 1);
        let pass = &passes[0];
        assert_eq!(pass.satellite, "SAT-1");
        assert_eq!(pass.station, "Kiruna");
        assert_eq!(pass.mask_deg, 5.0);
        assert_eq!(pass.aos, t0);
        assert_eq!(pass.los, t0 + Duration::seconds(600));
        assert_relative_eq!(pass.duration_s, 600.0);
        assert_relative_eq!(pass.max_elevation_deg, 62.5);
        assert_relative_eq!(pass.data_mb_est, 600.0);
        assert_eq!(pass.downlink_mbps, 10.0);
        assert_eq!(pass.efficiency, 0.8);
    }

    #[rstest]
    fn resynchronizes_after_extra_rise(t0: DateTime<Utc>, station: GroundStation) {
        let passes = run(t0, &station, &[(0, R), (100, R), (400, C), (700, S)], 0.0).unwrap();
        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].aos, t0 + Duration::seconds(100));
        assert_relative_eq!(passes[0].duration_s, 600.0);
    }

    #[rstest]
    #[case::leading_set(&[(0, S), (100, R), (200, C), (300, S)], 1)]
    #[case::leading_culmination_and_set(&[(0, C), (50, S), (100, R), (200, C), (300, S)], 1)]
    #[case::double_culmination(&[(0, R), (100, C), (150, C), (300, S), (400, R), (500, C), (600, S)], 1)]
    #[case::two_clean_passes(&[(0, R), (100, C), (200, S), (300, R), (400, C), (500, S)], 2)]
    #[case::trailing_rise(&[(0, R), (100, C), (200, S), (300, R)], 1)]
    #[case::trailing_rise_culmination(&[(0, R), (100, C), (200, S), (300, R), (400, C)], 1)]
    #[case::only_fragments(&[(0, C), (100, S), (200, R)], 0)]
    #[case::empty(&[], 0)]
    fn tolerates_malformed_streams(
        t0: DateTime<Utc>,
        station: GroundStation,
        #[case] steps: &[(i64, EventKind)],
        #[case] expected: usize,
    ) {
        let passes = run(t0, &station, steps, 0.0).unwrap();
        assert_eq!(passes.len(), expected);
    }

    #[rstest]
    fn short_pass_is_consumed_whole(t0: DateTime<Utc>, station: GroundStation) {
        // The short triple must not leave its set behind to pair with anything
        let steps = [(0, R), (10, C), (20, S), (100, R), (400, C), (700, S)];
        let passes = run(t0, &station, &steps, 60.0).unwrap();
        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].aos, t0 + Duration::seconds(100));
    }

    #[rstest]
    #[case(599.0, 1)]
    #[case(600.0, 1)]
    #[case(600.5, 0)]
    fn minimum_duration_is_inclusive(
        t0: DateTime<Utc>,
        station: GroundStation,
        #[case] min_duration_s: f64,
        #[case] expected: usize,
    ) {
        let passes = run(t0, &station, &[(0, R), (300, C), (600, S)], min_duration_s).unwrap();
        assert_eq!(passes.len(), expected);
        assert!(passes.iter().all(|p| p.duration_s >= min_duration_s));
    }

    fn timed(t0: DateTime<Utc>, steps: &[(i64, EventKind)]) -> Vec<Event> {
        steps
            .iter()
            .map(|(ms, kind)| Event::new(t0 + Duration::milliseconds(*ms), *kind))
            .collect()
    }

    #[rstest]
    fn stores_reported_precision(t0: DateTime<Utc>, station: GroundStation) {
        let sat =
            ScriptedEphemeris::new("SAT-1").with_elevation(t0 + Duration::seconds(50), 62.456);
        let events = timed(t0, &[(0, R), (50_000, C), (100_040, S)]);
        let passes = interpret_events(&events, &sat, &station, &params(t0, 0.0)).unwrap();

        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].duration_s, 100.0);
        assert_eq!(passes[0].max_elevation_deg, 62.46);
        // 10 Mbps at 0.8 over the exact 100.04 s
        assert_eq!(passes[0].data_mb_est, 100.04);
        assert_eq!(passes[0].los, t0 + Duration::milliseconds(100_040));
    }

    #[rstest]
    #[case::rounds_up_to_threshold(99_960, 100.0, 1)]
    #[case::rounds_down_below_threshold(100_040, 100.04, 0)]
    fn minimum_applies_to_reported_duration(
        t0: DateTime<Utc>,
        station: GroundStation,
        #[case] set_ms: i64,
        #[case] min_duration_s: f64,
        #[case] expected: usize,
    ) {
        let sat = ScriptedEphemeris::new("SAT-1");
        let events = timed(t0, &[(0, R), (50_000, C), (set_ms, S)]);
        let passes =
            interpret_events(&events, &sat, &station, &params(t0, min_duration_s)).unwrap();
        assert_eq!(passes.len(), expected);
        assert!(passes.iter().all(|p| p.duration_s >= min_duration_s));
    }

    #[rstest]
    fn negative_duration_is_a_contract_violation(t0: DateTime<Utc>, station: GroundStation) {
        let events = vec![
            Event::new(t0 + Duration::seconds(600), R),
            Event::new(t0 + Duration::seconds(300), C),
            Event::new(t0, S),
            Event::new(t0 + Duration::seconds(1000), R),
            Event::new(t0 + Duration::seconds(1100), C),
            Event::new(t0 + Duration::seconds(1200), S),
        ];
        let sat = ScriptedEphemeris::new("SAT-1");
        let p = params(t0, 0.0);

        let err = interpret_events(&events, &sat, &station, &p).unwrap_err();
        assert!(matches!(err, PredictError::InvalidEventOrdering { .. }));

        // The scanner stops after reporting the violation
        let mut scanner = PassScanner::new(&events, &sat, &station, &p);
        assert!(matches!(scanner.next(), Some(Err(_))));
        assert!(scanner.next().is_none());
    }

    #[rstest]
    fn interpretation_is_repeatable(t0: DateTime<Utc>, station: GroundStation) {
        let steps = [
            (0, S),
            (60, R),
            (360, C),
            (660, S),
            (900, R),
            (960, R),
            (1200, C),
            (1500, S),
        ];
        let first = run(t0, &station, &steps, 0.0).unwrap();
        let second = run(t0, &station, &steps, 0.0).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[rstest]
    fn predict_passes_uses_generated_events(t0: DateTime<Utc>, station: GroundStation) {
        let sat = ScriptedEphemeris::new("SAT-1")
            .with_events("Kiruna", script(t0, &[(0, R), (300, C), (600, S)]));
        let passes = predict_passes(&sat, &station, &params(t0, 0.0)).unwrap();
        assert_eq!(passes.len(), 1);

        let elsewhere = GroundStation::new("Elsewhere", 0.0, 0.0, 0.0);
        assert!(predict_passes(&sat, &elsewhere, &params(t0, 0.0))
            .unwrap()
            .is_empty());
    }
}
