//! ---
//! osr_section: "02-version-compatibility"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Compatibility matrix loading and version resolution."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
//! OpenStudio <-> EnergyPlus compatibility data.
//!
//! The matrix is scraped from the OpenStudio wiki, annotated with the Docker
//! Hub tag list and optionally cached as CSV so later runs can work offline.

pub mod cache;
pub mod docker;
pub mod errors;
pub mod html;
pub mod matrix;
pub mod resolver;

use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

pub use cache::{load_cache, save_cache};
pub use docker::{apply_docker_tags, fetch_docker_tags, normalize_docker_tags};
pub use errors::{CompatError, Result};
pub use html::parse_compatibility_html;
pub use matrix::{CompatibilityMatrix, CompatibilityRow};
pub use resolver::{UnknownVersionPolicy, VersionPrompt, VersionResolver};

/// Where and how the compatibility matrix is obtained.
#[derive(Debug, Clone)]
pub struct CompatSettings {
    pub matrix_url: String,
    pub docker_tags_url: String,
    pub cache_path: Option<PathBuf>,
    pub offline: bool,
    pub query_docker: bool,
    pub force_latest: bool,
    pub http_timeout: Duration,
}

pub struct CompatClient {
    settings: CompatSettings,
    http: reqwest::Client,
}

impl CompatClient {
    pub fn new(settings: CompatSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.http_timeout)
            .user_agent(concat!("osr-regress/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| CompatError::Http {
                url: settings.matrix_url.clone(),
                source,
            })?;
        Ok(Self { settings, http })
    }

    pub fn settings(&self) -> &CompatSettings {
        &self.settings
    }

    /// Download the wiki page and the Docker tags. Never touches the cache.
    pub async fn fetch(&self) -> Result<CompatibilityMatrix> {
        let url = self.settings.matrix_url.as_str();
        info!(url, "fetching compatibility matrix");
        let html = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| CompatError::Http {
                url: url.to_owned(),
                source,
            })?
            .text()
            .await
            .map_err(|source| CompatError::Http {
                url: url.to_owned(),
                source,
            })?;
        let mut matrix = parse_compatibility_html(&html)?;

        if self.settings.query_docker {
            let tags = fetch_docker_tags(&self.http, &self.settings.docker_tags_url).await?;
            let forced = if self.settings.force_latest {
                matrix.latest_released().map(|row| row.openstudio.clone())
            } else {
                None
            };
            let tags = normalize_docker_tags(tags, forced.as_deref());
            apply_docker_tags(&mut matrix, &tags);
        }
        Ok(matrix)
    }

    /// Cached matrix when offline, freshly fetched (and cached) otherwise.
    pub async fn load(&self) -> Result<CompatibilityMatrix> {
        if self.settings.offline {
            let path = self
                .settings
                .cache_path
                .as_deref()
                .ok_or_else(|| CompatError::MissingCache(PathBuf::from("<unset>")))?;
            info!(path = %path.display(), "offline, using cached compatibility matrix");
            return load_cache(path);
        }
        let matrix = self.fetch().await?;
        match &self.settings.cache_path {
            Some(path) => save_cache(&matrix, path)?,
            None => warn!("no cache path configured, compatibility matrix not cached"),
        }
        Ok(matrix)
    }
}

/// One-shot helper around [`CompatClient::load`].
pub async fn fetch_compatibility_matrix(settings: CompatSettings) -> Result<CompatibilityMatrix> {
    CompatClient::new(settings)?.load().await
}
