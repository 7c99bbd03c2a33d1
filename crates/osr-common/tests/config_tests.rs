//! ---
//! osr_section: "01-core-functionality"
//! osr_subsection: "integration-tests"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Configuration loading tests."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
use std::fs;

use osr_common::config::{AppConfig, UnknownVersions};
use osr_common::LogFormat;
use tempfile::tempdir;

#[test]
fn first_existing_candidate_is_loaded() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.toml");
    let present = dir.path().join("osr-regress.toml");
    fs::write(
        &present,
        r#"
[paths]
test_dir = "results"

[compat]
offline = true
cache_path = "compat.csv"
unknown_versions = "latest"
http_timeout = 5

[compat.overrides]
"3.9.0" = "24.2.0"

[heatmap]
row_threshold = 0.02
display_threshold = 0.005

[logging]
format = "structured-json"
"#,
    )
    .unwrap();

    let loaded = AppConfig::load_with_source(&[missing, present.clone()]).unwrap();
    assert_eq!(loaded.source.as_deref(), Some(present.as_path()));
    let config = loaded.config;
    assert_eq!(config.paths.test_dir.to_str(), Some("results"));
    assert!(config.compat.offline);
    assert_eq!(config.compat.unknown_versions, UnknownVersions::Latest);
    assert_eq!(config.compat.http_timeout.as_secs(), 5);
    assert_eq!(
        config.compat.overrides.get("3.9.0").map(String::as_str),
        Some("24.2.0")
    );
    assert_eq!(config.heatmap.row_threshold, 0.02);
    assert_eq!(config.heatmap.max_rows_per_chunk, 40);
    assert_eq!(config.logging.format, LogFormat::StructuredJson);
}

#[test]
fn defaults_when_nothing_found() {
    let dir = tempdir().unwrap();
    let loaded = AppConfig::load_with_source(&[dir.path().join("nope.toml")]).unwrap();
    assert!(loaded.source.is_none());
    assert_eq!(loaded.config.stability.os_cli, "openstudio");
    assert_eq!(loaded.config.stability.default_runs, 5);
}

#[test]
fn invalid_file_reports_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[heatmap\nrow_threshold = ").unwrap();
    let err = AppConfig::from_path(&path).unwrap_err();
    assert!(format!("{err:#}").contains("broken.toml"));
}
