mod csv;
mod plot;

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::predict::Pass;
use crate::summary::DailySummary;

pub const PASSES_FILE: &str = "passes.csv";
pub const DAILY_SUMMARY_FILE: &str = "daily_summary.csv";
pub const CONTACT_PLOT_FILE: &str = "daily_contact_time.png";
pub const DATA_PLOT_FILE: &str = "daily_data_return.png";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("Plot error: {0}")]
    Plot(String),
}

/// Paths of everything written for one run
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub passes: PathBuf,
    pub daily_summary: PathBuf,
    pub contact_plot: PathBuf,
    pub data_plot: PathBuf,
}

impl Artifacts {
    pub fn paths(&self) -> [&Path; 4] {
        [
            &self.passes,
            &self.daily_summary,
            &self.contact_plot,
            &self.data_plot,
        ]
    }
}

/// Write the catalog, the per-pair daily summary and both charts into
/// `output_dir`, creating it if needed.
pub fn write_reports(
    catalog: &[Pass],
    summary: &DailySummary,
    output_dir: &Path,
    font: Option<&Path>,
) -> Result<Artifacts, ReportError> {
    fs::create_dir_all(output_dir)?;

    let artifacts = Artifacts {
        passes: output_dir.join(PASSES_FILE),
        daily_summary: output_dir.join(DAILY_SUMMARY_FILE),
        contact_plot: output_dir.join(CONTACT_PLOT_FILE),
        data_plot: output_dir.join(DATA_PLOT_FILE),
    };

    csv::write_passes(catalog, &artifacts.passes)?;
    csv::write_daily_summary(summary, &artifacts.daily_summary)?;
    plot::plot_contact_time(summary, &artifacts.contact_plot, font)?;
    plot::plot_data_return(summary, &artifacts.data_plot, font)?;

    for path in artifacts.paths() {
        log::info!("Wrote {}", path.display());
    }

    Ok(artifacts)
}
