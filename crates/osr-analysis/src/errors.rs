//! ---
//! osr_section: "04-result-analysis"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Parsing and aggregation of regression test results."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed out.osw {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path}: openstudio_results has no numeric '{metric}'")]
    MissingMetric { path: PathBuf, metric: &'static str },
    #[error("OpenStudio version {0} has no EnergyPlus mapping")]
    UnmappedVersion(String),
    #[error("simulation did not succeed for {0}")]
    SimulationFailed(PathBuf),
    #[error("no openstudio_results step in {0}")]
    MissingResults(PathBuf),
    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
