//! ---
//! osr_section: "06-command-line"
//! osr_subsection: "binary"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Command line front end for regression result analysis."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
//! Shared command plumbing: configuration, compatibility matrix, version
//! resolution and the result file matrix.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Args;
use osr_analysis::{
    build_file_matrix, locate_result_files, openstudio_versions, Matrix, TagSelection,
};
use osr_common::{AppConfig, CompatConfig, UnknownVersions};
use osr_compat::{
    CompatClient, CompatSettings, CompatibilityMatrix, UnknownVersionPolicy, VersionResolver,
};
use path_absolutize::Absolutize;
use tokio::runtime::Runtime;
use tracing::info;

use crate::prompt::StdinPrompt;

const CONFIG_CANDIDATES: [&str; 2] = ["osr-regress.toml", "configs/osr-regress.toml"];

/// Flags accepted by every command.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Configuration file (defaults to OSR_CONFIG, then ./osr-regress.toml).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Use the cached compatibility matrix instead of the network.
    #[arg(long, global = true, action = clap::ArgAction::SetTrue)]
    pub offline: bool,
    /// What to do with OpenStudio versions missing from the matrix: error, latest or prompt.
    #[arg(long = "unknown-versions", global = true, value_name = "POLICY")]
    pub unknown_versions: Option<UnknownVersions>,
    /// Directory holding the result files (overrides paths.test_dir).
    #[arg(long = "test-dir", global = true, value_name = "DIR")]
    pub test_dir: Option<PathBuf>,
}

impl GlobalArgs {
    pub fn load_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => {
                if !path.exists() {
                    return Err(anyhow!("config file {} does not exist", path.display()));
                }
                AppConfig::from_path(path)?
            }
            None => AppConfig::load(&CONFIG_CANDIDATES[..])?,
        };
        if self.offline {
            config.compat.offline = true;
        }
        if let Some(policy) = self.unknown_versions {
            config.compat.unknown_versions = policy;
        }
        if let Some(dir) = &self.test_dir {
            config.paths.test_dir = dir.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

/// `--tagged` / `--all` selection shared by the analysis commands.
#[derive(Debug, Args)]
pub struct SelectionArgs {
    /// Only analyze custom tagged result files.
    #[arg(long, conflicts_with = "all")]
    pub tagged: bool,
    /// Analyze both tagged and untagged result files.
    #[arg(long)]
    pub all: bool,
}

impl SelectionArgs {
    pub fn selection(&self) -> TagSelection {
        TagSelection::from_flags(self.tagged, self.all)
    }
}

pub fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(path
        .absolutize()
        .with_context(|| format!("cannot resolve {}", path.display()))?
        .into_owned())
}

pub fn compat_settings(config: &CompatConfig) -> CompatSettings {
    CompatSettings {
        matrix_url: config.matrix_url.clone(),
        docker_tags_url: config.docker_tags_url.clone(),
        cache_path: config.cache_path.clone(),
        offline: config.offline,
        query_docker: config.query_docker,
        force_latest: config.force_latest,
        http_timeout: config.http_timeout,
    }
}

pub fn policy(unknown: UnknownVersions) -> UnknownVersionPolicy {
    match unknown {
        UnknownVersions::Error => UnknownVersionPolicy::Error,
        UnknownVersions::Latest => UnknownVersionPolicy::Latest,
        UnknownVersions::Prompt => UnknownVersionPolicy::Prompt,
    }
}

/// Load the compatibility matrix, from the cache when offline.
pub fn load_compat_matrix(config: &CompatConfig) -> Result<CompatibilityMatrix> {
    let client = CompatClient::new(compat_settings(config))?;
    let runtime = Runtime::new()?;
    let matrix = runtime
        .block_on(client.load())
        .context("failed to load the compatibility matrix")?;
    Ok(matrix)
}

/// Locate the selected result files and arrange them by test and version.
pub fn result_matrix(config: &AppConfig, selection: TagSelection) -> Result<Matrix<PathBuf>> {
    let test_dir = absolute(&config.paths.test_dir)?;
    let files = locate_result_files(&test_dir, selection)
        .with_context(|| format!("failed to scan {}", test_dir.display()))?;
    if files.is_empty() {
        return Err(anyhow!(
            "no result files ({:?}) found in {}",
            selection,
            test_dir.display()
        ));
    }

    let compat = load_compat_matrix(&config.compat)?;
    let versions = resolve_versions(config, &compat, openstudio_versions(&files).iter())?;
    let matrix = build_file_matrix(&files, &versions)?;
    info!(
        files = files.len(),
        tests = matrix.n_rows(),
        versions = matrix.n_cols(),
        "result matrix assembled"
    );
    Ok(matrix)
}

fn resolve_versions<'v>(
    config: &AppConfig,
    compat: &CompatibilityMatrix,
    versions: impl Iterator<Item = &'v String>,
) -> Result<BTreeMap<String, String>> {
    let unknown = policy(config.compat.unknown_versions);
    let mut resolver = VersionResolver::new(compat, config.compat.overrides.clone(), unknown);
    if unknown == UnknownVersionPolicy::Prompt {
        resolver = resolver.with_prompt(StdinPrompt);
    }
    Ok(resolver.resolve_all(versions.map(String::as_str))?)
}
