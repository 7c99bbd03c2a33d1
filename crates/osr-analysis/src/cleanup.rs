//! ---
//! osr_section: "04-result-analysis"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Parsing and aggregation of regression test results."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
//! Maintenance of the result directory.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::errors::{AnalysisError, Result};
use crate::locator::{locate_result_files, TagSelection};

/// Size above which `eplusout_err` is stripped from a result file.
pub const DEFAULT_MAX_OSW_BYTES: u64 = 100_000;

/// Which custom-tagged result files to delete.
#[derive(Debug, Clone)]
pub enum TagFilter {
    All,
    /// File name contains the string.
    Contains(String),
    /// File name matches the regular expression anywhere.
    Pattern(Regex),
}

impl TagFilter {
    pub fn from_options(contains: Option<String>, pattern: Option<&str>) -> Result<Self> {
        match (contains, pattern) {
            (_, Some(pattern)) => Ok(TagFilter::Pattern(Regex::new(pattern)?)),
            (Some(contains), None) => Ok(TagFilter::Contains(contains)),
            (None, None) => Ok(TagFilter::All),
        }
    }

    fn matches(&self, file_name: &str) -> bool {
        match self {
            TagFilter::All => true,
            TagFilter::Contains(needle) => file_name.contains(needle.as_str()),
            TagFilter::Pattern(re) => re.is_match(file_name),
        }
    }
}

/// Delete custom-tagged result files selected by `filter`.
pub fn delete_custom_tagged(test_dir: &Path, filter: &TagFilter) -> Result<Vec<PathBuf>> {
    let mut deleted = Vec::new();
    for file in locate_result_files(test_dir, TagSelection::Tagged)? {
        let name = file
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if !filter.matches(name) {
            continue;
        }
        fs::remove_file(&file.path).map_err(|source| AnalysisError::io(&file.path, source))?;
        deleted.push(file.path);
    }
    info!(count = deleted.len(), dir = %test_dir.display(), "deleted custom-tagged result files");
    Ok(deleted)
}

/// Remove `eplusout_err` from `*.osw` files larger than `max_bytes` and
/// rewrite them in place. Returns the rewritten files.
pub fn strip_bloated_osws(test_dir: &Path, max_bytes: u64) -> Result<Vec<PathBuf>> {
    let mut rewritten = Vec::new();
    for entry in WalkDir::new(test_dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("osw") {
            continue;
        }
        let size = entry.metadata()?.len();
        if size <= max_bytes {
            continue;
        }
        let text = fs::read_to_string(path).map_err(|source| AnalysisError::io(path, source))?;
        let mut data: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&text)
            .map_err(|source| AnalysisError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        if data.remove("eplusout_err").is_none() {
            warn!(path = %path.display(), size, "large result file has no eplusout_err");
            continue;
        }
        let serialized = serde_json::to_string(&data).map_err(|source| AnalysisError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, serialized).map_err(|source| AnalysisError::io(path, source))?;
        info!(path = %path.display(), size, "stripped eplusout_err");
        rewritten.push(path.to_path_buf());
    }
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn filter_prefers_pattern() {
        let filter = TagFilter::from_options(Some("Ubuntu".into()), Some(r"2\.4\.\d+_out_.+\.osw")).unwrap();
        assert!(matches!(filter, TagFilter::Pattern(_)));
        assert!(filter.matches("x.rb_2.4.1_out_Linux_1.osw"));
        assert!(TagFilter::from_options(None, Some("(")).is_err());
    }

    #[test]
    fn deletes_only_matching_tagged_files() {
        let dir = tempdir().unwrap();
        for name in [
            "a.rb_3.7.0_out.osw",
            "a.rb_3.7.0_out_Linux_1.osw",
            "a.rb_3.7.0_out_Darwin_1.osw",
        ] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }
        let deleted = delete_custom_tagged(dir.path(), &TagFilter::Contains("Linux".into())).unwrap();
        assert_eq!(deleted.len(), 1);
        assert!(dir.path().join("a.rb_3.7.0_out.osw").exists());
        assert!(dir.path().join("a.rb_3.7.0_out_Darwin_1.osw").exists());

        let deleted = delete_custom_tagged(dir.path(), &TagFilter::All).unwrap();
        assert_eq!(deleted.len(), 1);
        assert!(dir.path().join("a.rb_3.7.0_out.osw").exists());
    }

    #[test]
    fn strips_error_log_from_large_files() {
        let dir = tempdir().unwrap();
        let big = dir.path().join("fuelcell.osm_3.7.0_out.osw");
        let lines: Vec<String> = (0..200).map(|i| format!("** Warning ** Regula Falsi {i}")).collect();
        let data = serde_json::json!({"completed_status": "Success", "eplusout_err": lines});
        fs::write(&big, data.to_string()).unwrap();
        let small = dir.path().join("small.rb_3.7.0_out.osw");
        fs::write(&small, r#"{"completed_status":"Success","eplusout_err":["ok"]}"#).unwrap();

        let rewritten = strip_bloated_osws(dir.path(), 1_000).unwrap();
        assert_eq!(rewritten, vec![big.clone()]);
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&big).unwrap()).unwrap();
        assert!(value.get("eplusout_err").is_none());
        assert_eq!(value["completed_status"], "Success");
        assert!(fs::read_to_string(&small).unwrap().contains("eplusout_err"));
    }
}
