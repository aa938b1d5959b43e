use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::ops::AddAssign;

use crate::predict::Pass;
use crate::utils::nearest_second;

/// Summed contact measures for one group of passes
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContactTotals {
    pub total_contact_s: f64,
    pub total_data_mb: f64,
    pub passes: usize,
}

impl AddAssign for ContactTotals {
    fn add_assign(&mut self, other: Self) {
        self.total_contact_s += other.total_contact_s;
        self.total_data_mb += other.total_data_mb;
        self.passes += other.passes;
    }
}

impl From<&Pass> for ContactTotals {
    fn from(pass: &Pass) -> Self {
        Self {
            total_contact_s: pass.duration_s,
            total_data_mb: pass.data_mb_est,
            passes: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PairDay {
    pub date: NaiveDate,
    pub satellite: String,
    pub station: String,
}

/// Daily rollups keyed by rise date (UTC). Both maps iterate in key order.
///
/// The rise date is taken from the rise instant as reported, rounded to the
/// second, so a pass rising in the last half second of a day counts for the
/// next one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailySummary {
    pub by_pair: BTreeMap<PairDay, ContactTotals>,
    pub by_date: BTreeMap<NaiveDate, ContactTotals>,
}

/// Group the catalog by (date, satellite, station), then roll those groups
/// up by date.
pub fn summarize(catalog: &[Pass]) -> DailySummary {
    let mut by_pair: BTreeMap<PairDay, ContactTotals> = BTreeMap::new();
    for pass in catalog {
        let key = PairDay {
            date: nearest_second(pass.aos).date_naive(),
            satellite: pass.satellite.clone(),
            station: pass.station.clone(),
        };
        *by_pair.entry(key).or_default() += ContactTotals::from(pass);
    }

    let mut by_date: BTreeMap<NaiveDate, ContactTotals> = BTreeMap::new();
    for (key, totals) in &by_pair {
        *by_date.entry(key.date).or_default() += *totals;
    }

    DailySummary { by_pair, by_date }
}
