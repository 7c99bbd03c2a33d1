//! ---
//! osr_section: "02-version-compatibility"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Compatibility matrix loading and version resolution."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompatError>;

#[derive(Debug, Error)]
pub enum CompatError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid URL {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("no <table> found in the compatibility matrix page")]
    MissingTable,
    #[error("compatibility table has no '{0}' column")]
    MissingColumn(&'static str),
    #[error("compatibility matrix is empty")]
    EmptyMatrix,
    #[error("OpenStudio version {0} is not in the compatibility matrix and has no override")]
    UnresolvedVersion(String),
    #[error("offline mode requires a cached compatibility matrix at {0}")]
    MissingCache(PathBuf),
    #[error("version prompt failed: {0}")]
    Prompt(#[source] std::io::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
