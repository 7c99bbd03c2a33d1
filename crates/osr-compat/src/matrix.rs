//! ---
//! osr_section: "02-version-compatibility"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Compatibility matrix loading and version resolution."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
use std::collections::BTreeMap;

use chrono::NaiveDate;
use indexmap::IndexMap;
use osr_common::compare_versions;
use serde::{Deserialize, Serialize};

/// One OpenStudio release as listed on the compatibility wiki page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityRow {
    pub openstudio: String,
    pub energyplus: String,
    #[serde(default)]
    pub released: Option<NaiveDate>,
    #[serde(default)]
    pub has_docker: bool,
    /// Remaining wiki columns (Ruby, Radiance, ...), keyed by header.
    #[serde(default)]
    pub extra: IndexMap<String, String>,
}

impl CompatibilityRow {
    pub fn new(openstudio: impl Into<String>, energyplus: impl Into<String>) -> Self {
        Self {
            openstudio: openstudio.into(),
            energyplus: energyplus.into(),
            released: None,
            has_docker: false,
            extra: IndexMap::new(),
        }
    }
}

/// Immutable lookup table keyed by OpenStudio version string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityMatrix {
    rows: Vec<CompatibilityRow>,
}

impl CompatibilityMatrix {
    pub fn new(rows: Vec<CompatibilityRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[CompatibilityRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [CompatibilityRow] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, openstudio: &str) -> Option<&CompatibilityRow> {
        self.rows.iter().find(|row| row.openstudio == openstudio)
    }

    pub fn energyplus_for(&self, openstudio: &str) -> Option<&str> {
        self.get(openstudio).map(|row| row.energyplus.as_str())
    }

    /// Row with the highest OpenStudio version.
    pub fn latest(&self) -> Option<&CompatibilityRow> {
        self.rows
            .iter()
            .max_by(|a, b| compare_versions(&a.openstudio, &b.openstudio))
    }

    /// Row with the most recent release date, if any row carries one.
    pub fn latest_released(&self) -> Option<&CompatibilityRow> {
        self.rows
            .iter()
            .filter(|row| row.released.is_some())
            .max_by_key(|row| row.released)
    }

    /// OpenStudio -> EnergyPlus mapping for every known release.
    pub fn version_map(&self) -> BTreeMap<String, String> {
        self.rows
            .iter()
            .map(|row| (row.openstudio.clone(), row.energyplus.clone()))
            .collect()
    }
}
