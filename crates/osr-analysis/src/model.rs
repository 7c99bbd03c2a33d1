//! ---
//! osr_section: "04-result-analysis"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Parsing and aggregation of regression test results."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
use std::cmp::Ordering;
use std::fmt;

use osr_common::compare_versions;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Kind of regression test that produced a result file.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FileType {
    /// Saved `.osm` model.
    Osm,
    /// Ruby measure script.
    Rb,
    /// Python measure script.
    Py,
}

/// Everything the file name tells about a result file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResultFileKey {
    pub test: String,
    pub file_type: FileType,
    pub version: String,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestStatus {
    Success,
    Fail,
    /// No result file: the test was not run for that version.
    Missing,
    /// OSM model newer than the OpenStudio version of the column.
    NotApplicable,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Success => "Success",
            TestStatus::Fail => "Fail",
            TestStatus::Missing => "",
            TestStatus::NotApplicable => "N/A",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowKey {
    pub test: String,
    pub file_type: FileType,
}

impl RowKey {
    pub fn new(test: impl Into<String>, file_type: FileType) -> Self {
        Self {
            test: test.into(),
            file_type,
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.test, self.file_type)
    }
}

/// Column of a result matrix: one OpenStudio build, optionally a tagged rerun.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnKey {
    pub energyplus: String,
    pub openstudio: String,
    pub tag: Option<String>,
}

impl ColumnKey {
    pub fn new(
        energyplus: impl Into<String>,
        openstudio: impl Into<String>,
        tag: Option<String>,
    ) -> Self {
        Self {
            energyplus: energyplus.into(),
            openstudio: openstudio.into(),
            tag,
        }
    }
}

impl Ord for ColumnKey {
    /// OpenStudio version first (numeric), then untagged before tagged.
    fn cmp(&self, other: &Self) -> Ordering {
        compare_versions(&self.openstudio, &other.openstudio)
            .then_with(|| self.tag.cmp(&other.tag))
            .then_with(|| compare_versions(&self.energyplus, &other.energyplus))
    }
}

impl PartialOrd for ColumnKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "{} ({})", self.openstudio, tag),
            None => f.write_str(&self.openstudio),
        }
    }
}
