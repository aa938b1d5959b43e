use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::predict::{GroundStation, ScanParameters};
use crate::utils::{parse_utc_timestamp, MalformedTimestamp};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("{field}: {source}")]
    Timestamp {
        field: &'static str,
        #[source]
        source: MalformedTimestamp,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub time: TimeConfig,
    pub link: LinkConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub satellites: Vec<SatelliteConfig>,
    #[serde(default)]
    pub ground_stations: Vec<GroundStation>,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeConfig {
    pub start_utc: String,
    pub end_utc: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LinkConfig {
    pub downlink_mbps: f64,
    pub efficiency: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub min_pass_duration_s: f64,
    #[serde(default = "default_search_step")]
    pub search_step: String,
    /// Accept the first entry of a multi-satellite TLE file when no entry
    /// carries the configured name.
    #[serde(default)]
    pub allow_best_effort_match: bool,
    #[serde(default)]
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_pass_duration_s: 0.0,
            search_step: default_search_step(),
            allow_best_effort_match: false,
            parallel: false,
        }
    }
}

fn default_search_step() -> String {
    "60s".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SatelliteConfig {
    pub name: String,
    #[serde(flatten)]
    pub source: SatelliteSource,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SatelliteSource {
    Url { tle_url: String },
    Inline { tle1: String, tle2: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    pub font_path: Option<PathBuf>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Validated run parameters. Every check here happens before any
    /// propagation work starts.
    pub fn scan_parameters(&self) -> Result<ScanParameters, ConfigError> {
        let (start, end) = self.window()?;

        let link = self.link;
        if !(link.downlink_mbps > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "link.downlink_mbps must be positive, got {}",
                link.downlink_mbps
            )));
        }
        if !(0.0..=1.0).contains(&link.efficiency) {
            return Err(ConfigError::Invalid(format!(
                "link.efficiency must lie in [0, 1], got {}",
                link.efficiency
            )));
        }

        let min_duration_s = self.analysis.min_pass_duration_s;
        if !(min_duration_s >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "analysis.min_pass_duration_s must not be negative, got {}",
                min_duration_s
            )));
        }

        let search_step = parse_step(&self.analysis.search_step)?;

        for (i, sat) in self.satellites.iter().enumerate() {
            if sat.name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "satellites[{}] has an empty name",
                    i
                )));
            }
        }

        Ok(ScanParameters {
            start,
            end,
            min_duration_s,
            downlink_mbps: link.downlink_mbps,
            efficiency: link.efficiency,
            search_step,
        })
    }

    fn window(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), ConfigError> {
        let start = parse_utc_timestamp(&self.time.start_utc).map_err(|source| {
            ConfigError::Timestamp {
                field: "time.start_utc",
                source,
            }
        })?;
        let end = parse_utc_timestamp(&self.time.end_utc).map_err(|source| {
            ConfigError::Timestamp {
                field: "time.end_utc",
                source,
            }
        })?;

        if start >= end {
            return Err(ConfigError::Invalid(format!(
                "time.start_utc ({}) must precede time.end_utc ({})",
                start, end
            )));
        }
        Ok((start, end))
    }
}

fn parse_step(s: &str) -> Result<Duration, ConfigError> {
    let invalid = |msg: String| ConfigError::Invalid(format!("analysis.search_step: {}", msg));
    let step = humantime::parse_duration(s.trim())
        .map_err(|e| invalid(e.to_string()))
        .and_then(|d| Duration::from_std(d).map_err(|e| invalid(e.to_string())))?;

    if step <= Duration::zero() {
        return Err(invalid("must be positive".into()));
    }
    Ok(step)
}
