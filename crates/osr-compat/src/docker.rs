//! ---
//! osr_section: "02-version-compatibility"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Compatibility matrix loading and version resolution."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::errors::{CompatError, Result};
use crate::matrix::CompatibilityMatrix;

const LATEST_TAG: &str = "latest";

#[derive(Debug, Deserialize)]
struct TagPage {
    #[serde(default)]
    results: Vec<TagEntry>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

/// Walk the paginated Docker Hub tag listing until a page is not served.
pub async fn fetch_docker_tags(client: &reqwest::Client, tags_url: &str) -> Result<Vec<String>> {
    let mut tags = Vec::new();
    let mut page = 1u32;
    loop {
        let url = Url::parse_with_params(tags_url, &[("page", page.to_string())])?;
        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| CompatError::Http {
                url: url.to_string(),
                source,
            })?;
        if !response.status().is_success() {
            debug!(page, status = %response.status(), "docker tag listing exhausted");
            break;
        }
        let body: TagPage = response.json().await.map_err(|source| CompatError::Http {
            url: url.to_string(),
            source,
        })?;
        let exhausted = body.results.is_empty() || body.next.is_none();
        tags.extend(body.results.into_iter().map(|entry| entry.name));
        if exhausted {
            break;
        }
        page += 1;
    }
    info!(count = tags.len(), "fetched docker tags");
    Ok(tags)
}

/// Resolve the `latest` tag: replaced by `latest_version` when given, dropped otherwise.
pub fn normalize_docker_tags(tags: Vec<String>, latest_version: Option<&str>) -> Vec<String> {
    tags.into_iter()
        .filter_map(|tag| {
            if tag == LATEST_TAG {
                latest_version.map(str::to_owned)
            } else {
                Some(tag)
            }
        })
        .collect()
}

/// Set `has_docker` on every row whose OpenStudio version is a published tag.
pub fn apply_docker_tags(matrix: &mut CompatibilityMatrix, tags: &[String]) {
    let available: HashSet<&str> = tags.iter().map(String::as_str).collect();
    for row in matrix.rows_mut() {
        row.has_docker = available.contains(row.openstudio.as_str());
    }
}
