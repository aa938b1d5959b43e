use std::fs;
use std::path::{Path, PathBuf};

use sgp4::Elements;

use crate::predict::error::PredictError;
use crate::predict::propagation::Sgp4Satellite;

/// How a configured satellite name was matched against its source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Exact,
    /// No entry carried the requested name; the first entry stands in.
    BestEffort {
        requested: String,
        substituted: String,
        candidates: usize,
        source_name: String,
    },
}

pub struct ResolvedSatellite {
    pub satellite: Sgp4Satellite,
    pub resolution: Resolution,
}

/// A source of orbital elements that can produce a named satellite.
pub trait SatelliteResolver {
    fn resolve(&self, name: &str) -> Result<ResolvedSatellite, PredictError>;
}

struct TleEntry {
    name: Option<String>,
    line1: String,
    line2: String,
}

impl TleEntry {
    fn to_satellite(&self, name: &str, source_name: &str) -> Result<Sgp4Satellite, PredictError> {
        let elements = Elements::from_tle(
            self.name.clone(),
            self.line1.as_bytes(),
            self.line2.as_bytes(),
        )
        .map_err(|e| PredictError::InvalidTle {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
        Sgp4Satellite::new(name.to_string(), elements)
    }

    fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.trim().to_string(),
            None => format!("NORAD {}", self.line1.get(2..7).unwrap_or("?").trim()),
        }
    }
}

/// Two element lines written inline in the configuration.
pub struct InlineElements {
    entry: TleEntry,
}

impl InlineElements {
    pub fn new(line1: &str, line2: &str) -> Self {
        Self {
            entry: TleEntry {
                name: None,
                line1: line1.trim().to_string(),
                line2: line2.trim().to_string(),
            },
        }
    }
}

impl SatelliteResolver for InlineElements {
    fn resolve(&self, name: &str) -> Result<ResolvedSatellite, PredictError> {
        Ok(ResolvedSatellite {
            satellite: self.entry.to_satellite(name, "inline elements")?,
            resolution: Resolution::Exact,
        })
    }
}

/// A TLE file that holds exactly one satellite; it takes the configured name.
pub struct SingleEntrySource {
    source_name: String,
    entry: TleEntry,
}

impl SatelliteResolver for SingleEntrySource {
    fn resolve(&self, name: &str) -> Result<ResolvedSatellite, PredictError> {
        Ok(ResolvedSatellite {
            satellite: self.entry.to_satellite(name, &self.source_name)?,
            resolution: Resolution::Exact,
        })
    }
}

/// A TLE file with several satellites, matched by trimmed name.
pub struct MultiEntrySource {
    source_name: String,
    entries: Vec<TleEntry>,
}

impl SatelliteResolver for MultiEntrySource {
    fn resolve(&self, name: &str) -> Result<ResolvedSatellite, PredictError> {
        let target = name.trim();
        if let Some(entry) = self.entries.iter().find(|e| e.display_name() == target) {
            return Ok(ResolvedSatellite {
                satellite: entry.to_satellite(target, &self.source_name)?,
                resolution: Resolution::Exact,
            });
        }

        let first = self
            .entries
            .first()
            .ok_or_else(|| PredictError::NoSatellites(self.source_name.clone()))?;
        let substituted = first.display_name();
        Ok(ResolvedSatellite {
            satellite: first.to_satellite(&substituted, &self.source_name)?,
            resolution: Resolution::BestEffort {
                requested: target.to_string(),
                substituted,
                candidates: self.entries.len(),
                source_name: self.source_name.clone(),
            },
        })
    }
}

/// Result of opening a TLE file, dispatched on how many entries it holds
pub enum TleSource {
    Single(SingleEntrySource),
    Multi(MultiEntrySource),
}

impl TleSource {
    pub fn resolver(&self) -> &dyn SatelliteResolver {
        match self {
            TleSource::Single(source) => source,
            TleSource::Multi(source) => source,
        }
    }
}

/// Open a TLE file given as a local path or `file://` URL.
pub fn open_tle_source(url: &str) -> Result<TleSource, PredictError> {
    let path = local_path(url)?;
    let content = fs::read_to_string(&path)?;
    let source_name = path.display().to_string();
    tle_source_from_str(&content, &source_name)
}

fn local_path(url: &str) -> Result<PathBuf, PredictError> {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Err(PredictError::UnsupportedSource(url.to_string()));
    }
    Ok(Path::new(url.strip_prefix("file://").unwrap_or(url)).to_path_buf())
}

fn tle_source_from_str(content: &str, source_name: &str) -> Result<TleSource, PredictError> {
    let mut entries = parse_multi_tle(content);
    log::debug!("{}: {} TLE entries", source_name, entries.len());

    match entries.len() {
        0 => Err(PredictError::NoSatellites(source_name.to_string())),
        1 => Ok(TleSource::Single(SingleEntrySource {
            source_name: source_name.to_string(),
            entry: entries.remove(0),
        })),
        _ => Ok(TleSource::Multi(MultiEntrySource {
            source_name: source_name.to_string(),
            entries,
        })),
    }
}

/// Parse 2-line and 3-line TLE content, skipping lines that fit neither
fn parse_multi_tle(content: &str) -> Vec<TleEntry> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            result.push(TleEntry {
                name: None,
                line1: lines[i].to_string(),
                line2: lines[i + 1].to_string(),
            });
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            let name = lines[i].strip_prefix("0 ").unwrap_or(lines[i]);
            result.push(TleEntry {
                name: Some(name.to_string()),
                line1: lines[i + 1].to_string(),
                line2: lines[i + 2].to_string(),
            });
            i += 3;
        } else {
            i += 1;
        }
    }

    result
}
