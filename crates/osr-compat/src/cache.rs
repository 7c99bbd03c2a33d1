//! ---
//! osr_section: "02-version-compatibility"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Compatibility matrix loading and version resolution."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
//! CSV cache of the compatibility matrix.
//!
//! Fixed columns `OpenStudio,E+,Released,Has_Docker` come first, followed by
//! the extra wiki columns in the order they appear on the first row.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use tracing::info;

use crate::errors::{CompatError, Result};
use crate::html::parse_release_date;
use crate::matrix::{CompatibilityMatrix, CompatibilityRow};

const FIXED_COLUMNS: [&str; 4] = ["OpenStudio", "E+", "Released", "Has_Docker"];

pub fn save_cache(matrix: &CompatibilityMatrix, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let extra_headers: Vec<String> = matrix
        .rows()
        .first()
        .map(|row| row.extra.keys().cloned().collect())
        .unwrap_or_default();

    let mut writer = csv::Writer::from_path(path)?;
    let mut header: Vec<&str> = FIXED_COLUMNS.to_vec();
    header.extend(extra_headers.iter().map(String::as_str));
    writer.write_record(&header)?;

    for row in matrix.rows() {
        let mut record = vec![
            row.openstudio.clone(),
            row.energyplus.clone(),
            row.released
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            row.has_docker.to_string(),
        ];
        for key in &extra_headers {
            record.push(row.extra.get(key).cloned().unwrap_or_default());
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = matrix.len(), "compatibility matrix cached");
    Ok(())
}

pub fn load_cache(path: &Path) -> Result<CompatibilityMatrix> {
    if !path.exists() {
        return Err(CompatError::MissingCache(path.to_path_buf()));
    }
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
    for (idx, expected) in FIXED_COLUMNS.iter().enumerate().take(2) {
        if headers.get(idx).map(String::as_str) != Some(*expected) {
            return Err(CompatError::MissingColumn(*expected));
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = CompatibilityRow::new(
            record.get(0).unwrap_or_default(),
            record.get(1).unwrap_or_default(),
        );
        row.released = record.get(2).and_then(parse_release_date);
        row.has_docker = record
            .get(3)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let mut extra = IndexMap::new();
        for (idx, header) in headers.iter().enumerate().skip(FIXED_COLUMNS.len()) {
            extra.insert(header.clone(), record.get(idx).unwrap_or_default().to_owned());
        }
        row.extra = extra;
        rows.push(row);
    }
    if rows.is_empty() {
        return Err(CompatError::EmptyMatrix);
    }
    Ok(CompatibilityMatrix::new(rows))
}
