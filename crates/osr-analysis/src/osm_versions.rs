//! ---
//! osr_section: "04-result-analysis"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Parsing and aggregation of regression test results."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::errors::{AnalysisError, Result};

static VERSION_IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+(\d+\.\d+\.\d+);\s+!-? Version Identifier").expect("valid version regex")
});

/// Version string stored in a test model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OsmVersion {
    pub path: PathBuf,
    pub version: String,
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl OsmVersion {
    fn new(path: PathBuf, version: &str) -> Option<Self> {
        let mut parts = version.split('.').map(|p| p.parse::<u64>().ok());
        let (major, minor, patch) = (parts.next()??, parts.next()??, parts.next()??);
        Some(Self {
            path,
            version: version.to_owned(),
            major,
            minor,
            patch,
        })
    }
}

/// Version of every `*.osm` directly in `model_dir`, keyed by test name.
pub fn scan_osm_versions(model_dir: &Path) -> Result<BTreeMap<String, OsmVersion>> {
    let mut versions = BTreeMap::new();
    for entry in WalkDir::new(model_dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("osm") {
            continue;
        }
        let Some(test) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let contents = fs::read_to_string(path).map_err(|source| AnalysisError::io(path, source))?;
        match version_from_osm(&contents) {
            Some(version) => match OsmVersion::new(path.to_path_buf(), &version) {
                Some(parsed) => {
                    versions.insert(test.to_owned(), parsed);
                }
                None => warn!(path = %path.display(), version = %version, "unparseable OSM version"),
            },
            None => warn!(path = %path.display(), "no OS:Version identifier found"),
        }
    }
    debug!(dir = %model_dir.display(), count = versions.len(), "scanned OSM versions");
    Ok(versions)
}

/// The identifier sits two lines below the `OS:Version` object header.
pub fn version_from_osm(contents: &str) -> Option<String> {
    let lines: Vec<&str> = contents.lines().collect();
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.contains("OS:Version"))
        .find_map(|(i, _)| {
            let candidate = lines.get(i + 2)?;
            VERSION_IDENTIFIER_RE
                .captures(candidate)
                .map(|caps| caps[1].to_owned())
        })
}
