mod catalog;
mod config;
mod predict;
mod report;
mod summary;
mod utils;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::predict::PredictError;
use crate::report::{Artifacts, ReportError};

const NO_PASSES_HINT: &str =
    "No passes found. Try: lower mask_deg (e.g., 5.0 or 0.0) or extend the time window.";

#[derive(Parser)]
#[command(name = "passplan")]
#[command(about = "Ground station contact windows and downlink volume estimates")]
struct Cli {
    /// Directory receiving the CSV files and plots
    #[arg(default_value = "outputs")]
    output_dir: PathBuf,
    /// Run configuration
    #[arg(short, long, default_value = "config.yml")]
    config: PathBuf,
}

#[derive(Debug, Error)]
enum RunError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Prediction error: {0}")]
    Predict(#[from] PredictError),
    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

/// Runs one analysis. `None` means the window held no passes and nothing
/// was written.
fn run(cli: &Cli) -> Result<Option<Artifacts>, RunError> {
    let config = Config::from_file(&cli.config)?;
    let params = config.scan_parameters()?;

    log::info!(
        "Window {} .. {}, {} satellites x {} stations, {} Mbps at {:.0}% efficiency",
        params.start,
        params.end,
        config.satellites.len(),
        config.ground_stations.len(),
        params.downlink_mbps,
        params.efficiency * 100.0
    );

    let satellites = catalog::resolve_satellites(
        &config.satellites,
        config.analysis.allow_best_effort_match,
    )?;
    let passes = catalog::build_catalog(
        &satellites,
        &config.ground_stations,
        &params,
        config.analysis.parallel,
    )?;

    if passes.is_empty() {
        return Ok(None);
    }

    let daily = summary::summarize(&passes);
    for (date, totals) in &daily.by_date {
        log::info!(
            "{}: {} passes, {:.1} min, {:.2} MB",
            date,
            totals.passes,
            totals.total_contact_s / 60.0,
            totals.total_data_mb
        );
    }

    let artifacts = report::write_reports(
        &passes,
        &daily,
        &cli.output_dir,
        config.report.font_path.as_deref(),
    )?;
    Ok(Some(artifacts))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(None) => {
            println!("{}", NO_PASSES_HINT);
            ExitCode::SUCCESS
        }
        Ok(Some(artifacts)) => {
            println!("Saved:");
            for path in artifacts.paths() {
                println!("- {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
