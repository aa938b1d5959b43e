use chrono::{DateTime, SecondsFormat, Utc};
use csv::Writer;
use std::path::Path;

use crate::predict::Pass;
use crate::report::ReportError;
use crate::summary::DailySummary;
use crate::utils::nearest_second;

/// ISO-8601 UTC to the nearest second
pub fn iso_utc(at: DateTime<Utc>) -> String {
    nearest_second(at).to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn write_passes<P: AsRef<Path>>(catalog: &[Pass], path: P) -> Result<(), ReportError> {
    let mut w = Writer::from_path(path)?;
    w.write_record([
        "satellite",
        "station",
        "mask_deg",
        "aos_utc",
        "los_utc",
        "duration_s",
        "max_elev_deg",
        "downlink_mbps",
        "efficiency",
        "data_mb_est",
    ])?;
    for pass in catalog {
        w.write_record([
            pass.satellite.clone(),
            pass.station.clone(),
            format!("{:?}", pass.mask_deg),
            iso_utc(pass.aos),
            iso_utc(pass.los),
            format!("{:.1}", pass.duration_s),
            format!("{:.2}", pass.max_elevation_deg),
            format!("{:?}", pass.downlink_mbps),
            format!("{:?}", pass.efficiency),
            format!("{:.2}", pass.data_mb_est),
        ])?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_daily_summary<P: AsRef<Path>>(
    summary: &DailySummary,
    path: P,
) -> Result<(), ReportError> {
    let mut w = Writer::from_path(path)?;
    w.write_record([
        "date_utc",
        "satellite",
        "station",
        "total_contact_s",
        "total_data_mb",
        "passes",
    ])?;
    for (key, totals) in &summary.by_pair {
        w.write_record([
            key.date.format("%Y-%m-%d").to_string(),
            key.satellite.clone(),
            key.station.clone(),
            format!("{:.1}", totals.total_contact_s),
            format!("{:.2}", totals.total_data_mb),
            totals.passes.to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}
