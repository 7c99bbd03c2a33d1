//! ---
//! osr_section: "01-core-functionality"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Shared primitives and utilities for the regression toolkit."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use tracing::debug;

use crate::logging::LogFormat;
use crate::release::is_version_triplet;

pub const DEFAULT_MATRIX_URL: &str =
    "https://github.com/NREL/OpenStudio/wiki/OpenStudio-Version-Compatibility-Matrix";
pub const DEFAULT_DOCKER_TAGS_URL: &str =
    "https://registry.hub.docker.com/v2/repositories/nrel/openstudio/tags";

fn default_test_dir() -> PathBuf {
    PathBuf::from("test")
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("model/simulationtests")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_matrix_url() -> String {
    DEFAULT_MATRIX_URL.to_owned()
}

fn default_docker_tags_url() -> String {
    DEFAULT_DOCKER_TAGS_URL.to_owned()
}

fn default_cache_path() -> Option<PathBuf> {
    Some(PathBuf::from("target/compat_matrix.csv"))
}

fn default_true() -> bool {
    true
}

fn default_http_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_row_threshold() -> f64 {
    0.01
}

fn default_display_threshold() -> f64 {
    0.001
}

fn default_granular_row_threshold() -> f64 {
    0.0005
}

fn default_granular_display_threshold() -> f64 {
    0.0001
}

fn default_max_rows_per_chunk() -> usize {
    40
}

fn default_width_in() -> f64 {
    16.0
}

fn default_dpi() -> u32 {
    150
}

fn default_vmax() -> f64 {
    0.5
}

fn default_font_family() -> String {
    "DejaVu Sans".to_owned()
}

fn default_os_cli() -> String {
    "openstudio".to_owned()
}

fn default_runner_script() -> PathBuf {
    PathBuf::from("model_tests.rb")
}

fn default_runs() -> u32 {
    5
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

/// Primary configuration object for the regression toolkit.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub compat: CompatConfig,
    #[serde(default)]
    pub heatmap: HeatmapConfig,
    #[serde(default)]
    pub stability: StabilityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    /// `None` when no candidate existed and defaults were used.
    pub source: Option<PathBuf>,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "OSR_CONFIG";

    /// Load configuration from disk, respecting the `OSR_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration together with the effective source path.
    ///
    /// An explicit `OSR_CONFIG` path must exist. Otherwise the first existing
    /// candidate wins and, when none exists, defaults are returned.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: Some(path),
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: Some(path),
                });
            }
        }

        debug!(
            inspected = %candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
            "no configuration file found, using defaults"
        );
        Ok(LoadedAppConfig {
            config: AppConfig::default(),
            source: None,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.heatmap.validate()?;
        self.compat.validate()?;
        Ok(())
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

/// Locations of the regression suite inputs and report outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the `*_out*.osw` result files.
    #[serde(default = "default_test_dir")]
    pub test_dir: PathBuf,
    /// Directory holding the `*.osm` simulation test models.
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            test_dir: default_test_dir(),
            model_dir: default_model_dir(),
            output_dir: default_output_dir(),
        }
    }
}

/// What to do with an OpenStudio version absent from the compatibility matrix.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnknownVersions {
    #[default]
    Error,
    Latest,
    Prompt,
}

impl std::str::FromStr for UnknownVersions {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(UnknownVersions::Error),
            "latest" => Ok(UnknownVersions::Latest),
            "prompt" => Ok(UnknownVersions::Prompt),
            other => Err(format!("unknown version policy: {}", other)),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatConfig {
    #[serde(default = "default_matrix_url")]
    pub matrix_url: String,
    #[serde(default = "default_docker_tags_url")]
    pub docker_tags_url: String,
    #[serde(default = "default_cache_path")]
    pub cache_path: Option<PathBuf>,
    /// Skip all network access and read the cached matrix.
    #[serde(default)]
    pub offline: bool,
    #[serde(default = "default_true")]
    pub query_docker: bool,
    /// Treat the docker `latest` tag as the most recently released version.
    #[serde(default)]
    pub force_latest: bool,
    #[serde(default = "default_http_timeout")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub http_timeout: Duration,
    #[serde(default)]
    pub unknown_versions: UnknownVersions,
    /// OpenStudio version -> EnergyPlus version for releases ahead of the wiki.
    #[serde(default)]
    pub overrides: IndexMap<String, String>,
}

impl Default for CompatConfig {
    fn default() -> Self {
        Self {
            matrix_url: default_matrix_url(),
            docker_tags_url: default_docker_tags_url(),
            cache_path: default_cache_path(),
            offline: false,
            query_docker: true,
            force_latest: false,
            http_timeout: default_http_timeout(),
            unknown_versions: UnknownVersions::default(),
            overrides: IndexMap::new(),
        }
    }
}

impl CompatConfig {
    pub fn validate(&self) -> Result<()> {
        if self.offline && self.cache_path.is_none() {
            return Err(anyhow!("compat.offline requires compat.cache_path"));
        }
        for (openstudio, energyplus) in &self.overrides {
            for version in [openstudio, energyplus] {
                if !is_version_triplet(version) {
                    return Err(anyhow!(
                        "compat override '{}' = '{}' must use X.Y.Z versions",
                        openstudio,
                        energyplus
                    ));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapConfig {
    #[serde(default = "default_row_threshold")]
    pub row_threshold: f64,
    #[serde(default = "default_display_threshold")]
    pub display_threshold: f64,
    #[serde(default = "default_granular_row_threshold")]
    pub granular_row_threshold: f64,
    #[serde(default = "default_granular_display_threshold")]
    pub granular_display_threshold: f64,
    #[serde(default = "default_max_rows_per_chunk")]
    pub max_rows_per_chunk: usize,
    #[serde(default = "default_width_in")]
    pub width_in: f64,
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    /// Upper bound of the colour scale, as a fraction.
    #[serde(default = "default_vmax")]
    pub vmax: f64,
    #[serde(default = "default_font_family")]
    pub font_family: String,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            row_threshold: default_row_threshold(),
            display_threshold: default_display_threshold(),
            granular_row_threshold: default_granular_row_threshold(),
            granular_display_threshold: default_granular_display_threshold(),
            max_rows_per_chunk: default_max_rows_per_chunk(),
            width_in: default_width_in(),
            dpi: default_dpi(),
            vmax: default_vmax(),
            font_family: default_font_family(),
        }
    }
}

impl HeatmapConfig {
    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("row_threshold", self.row_threshold),
            ("display_threshold", self.display_threshold),
            ("granular_row_threshold", self.granular_row_threshold),
            ("granular_display_threshold", self.granular_display_threshold),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(anyhow!(
                    "heatmap.{} must be a non-negative number (got {})",
                    name,
                    value
                ));
            }
        }
        if self.max_rows_per_chunk == 0 {
            return Err(anyhow!("heatmap.max_rows_per_chunk must be at least 1"));
        }
        if self.width_in <= 0.0 || self.dpi == 0 {
            return Err(anyhow!("heatmap.width_in and heatmap.dpi must be positive"));
        }
        if self.vmax <= 0.0 {
            return Err(anyhow!("heatmap.vmax must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilityConfig {
    /// Interpreter used to launch the test runner (`openstudio` or `ruby`).
    #[serde(default = "default_os_cli")]
    pub os_cli: String,
    #[serde(default = "default_runner_script")]
    pub runner_script: PathBuf,
    #[serde(default = "default_runs")]
    pub default_runs: u32,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            os_cli: default_os_cli(),
            runner_script: default_runner_script(),
            default_runs: default_runs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// When set, a daily rolling JSON log is written here as well.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            format: default_log_format(),
            file_prefix: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: AppConfig = "".parse().unwrap();
        assert_eq!(config.heatmap.row_threshold, 0.01);
        assert_eq!(config.heatmap.display_threshold, 0.001);
        assert_eq!(config.heatmap.max_rows_per_chunk, 40);
        assert_eq!(config.compat.unknown_versions, UnknownVersions::Error);
        assert_eq!(config.compat.http_timeout, Duration::from_secs(30));
        assert_eq!(config.paths.test_dir, PathBuf::from("test"));
    }

    #[test]
    fn overrides_must_be_triplets() {
        let err = "[compat.overrides]\n\"3.9\" = \"24.2.0\"\n"
            .parse::<AppConfig>()
            .unwrap_err();
        assert!(err.to_string().contains("X.Y.Z"));
    }

    #[test]
    fn negative_threshold_rejected() {
        let err = "[heatmap]\nrow_threshold = -0.1\n"
            .parse::<AppConfig>()
            .unwrap_err();
        assert!(err.to_string().contains("row_threshold"));
    }

    #[test]
    fn offline_requires_cache() {
        let mut config = AppConfig::default();
        config.compat.offline = true;
        config.compat.cache_path = None;
        assert!(config.validate().is_err());
    }
}
