//! ---
//! osr_section: "04-result-analysis"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Parsing and aggregation of regression test results."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
//! Test status and test coverage sheets.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;

use osr_common::compare_versions;
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::matrix::Matrix;
use crate::model::{ColumnKey, FileType, RowKey, TestStatus};
use crate::osm_versions::OsmVersion;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusRow {
    pub key: RowKey,
    pub cells: Vec<TestStatus>,
    pub n_fail: usize,
    pub n_missing: usize,
    pub n_fail_missing: usize,
}

/// Per-version status of every test, worst tests first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSheet {
    pub columns: Vec<ColumnKey>,
    pub rows: Vec<StatusRow>,
}

impl StatusSheet {
    /// Marks OSM cells older than the model as `N/A`, counts failures and
    /// orders tests by summed fails, then summed fails + missing.
    pub fn build(status: &Matrix<TestStatus>, osm_versions: &BTreeMap<String, OsmVersion>) -> Self {
        let columns = status.columns().to_vec();
        let mut rows: Vec<StatusRow> = status
            .iter_rows()
            .map(|(key, values)| {
                let model_version = match key.file_type {
                    FileType::Osm => osm_versions.get(&key.test).map(|v| v.version.as_str()),
                    _ => None,
                };
                let cells: Vec<TestStatus> = values
                    .iter()
                    .zip(&columns)
                    .map(|(value, column)| {
                        let value = value.unwrap_or(TestStatus::Missing);
                        match model_version {
                            Some(model) if value == TestStatus::Missing
                                && compare_versions(&column.openstudio, model).is_lt() =>
                            {
                                TestStatus::NotApplicable
                            }
                            _ => value,
                        }
                    })
                    .collect();
                let n_fail = cells.iter().filter(|s| **s == TestStatus::Fail).count();
                let n_missing = cells.iter().filter(|s| **s == TestStatus::Missing).count();
                StatusRow {
                    key: key.clone(),
                    cells,
                    n_fail,
                    n_missing,
                    n_fail_missing: n_fail + n_missing,
                }
            })
            .collect();

        let mut per_test: HashMap<String, (usize, usize)> = HashMap::new();
        for row in &rows {
            let entry = per_test.entry(row.key.test.clone()).or_default();
            entry.0 += row.n_fail;
            entry.1 += row.n_fail_missing;
        }
        // Stable sort keeps the rows of one test together and in type order.
        rows.sort_by(|a, b| {
            let ta = per_test[&a.key.test];
            let tb = per_test[&b.key.test];
            tb.0.cmp(&ta.0)
                .then(tb.1.cmp(&ta.1))
                .then_with(|| a.key.test.cmp(&b.key.test))
        });
        Self { columns, rows }
    }

    /// Rows with at least one failure or missing result.
    pub fn failing_or_missing(&self) -> impl Iterator<Item = &StatusRow> {
        self.rows.iter().filter(|row| row.n_fail_missing > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImplementedRow {
    pub test: String,
    pub has: BTreeMap<FileType, bool>,
    pub osm_version: Option<OsmVersion>,
    /// OpenStudio version of the first successful Ruby run.
    pub first_ruby_success: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImplementedSheet {
    pub rows: Vec<ImplementedRow>,
}

impl ImplementedSheet {
    /// With `only_for_missing_osm`, the first Ruby success is only reported
    /// for tests that have a Ruby script but no OSM.
    pub fn build(
        files: &Matrix<PathBuf>,
        status: &StatusSheet,
        osm_versions: &BTreeMap<String, OsmVersion>,
        only_for_missing_osm: bool,
    ) -> Self {
        let mut has: BTreeMap<String, BTreeSet<FileType>> = BTreeMap::new();
        for key in files.rows() {
            has.entry(key.test.clone()).or_default().insert(key.file_type);
        }

        let rows = has
            .into_iter()
            .map(|(test, types)| {
                let missing_osm = !types.contains(&FileType::Osm) && types.contains(&FileType::Rb);
                let first_ruby_success = if only_for_missing_osm && !missing_osm {
                    None
                } else {
                    first_success(status, &test, FileType::Rb)
                };
                ImplementedRow {
                    has: FileType::iter().map(|t| (t, types.contains(&t))).collect(),
                    osm_version: osm_versions.get(&test).cloned(),
                    first_ruby_success,
                    test,
                }
            })
            .collect();
        Self { rows }
    }
}

fn first_success(status: &StatusSheet, test: &str, file_type: FileType) -> Option<String> {
    let row = status
        .rows
        .iter()
        .find(|row| row.key.test == test && row.key.file_type == file_type)?;
    row.cells
        .iter()
        .zip(&status.columns)
        .find(|(cell, _)| **cell == TestStatus::Success)
        .map(|(_, column)| column.openstudio.clone())
}
