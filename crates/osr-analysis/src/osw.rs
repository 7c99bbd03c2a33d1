//! ---
//! osr_section: "04-result-analysis"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Parsing and aggregation of regression test results."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
//! Reading of the `out.osw` workflow results.
//!
//! Only the fields the reports need are modelled; everything else in the
//! file is ignored by serde.

use std::fs;
use std::path::Path;

use osr_logging::{osr_debug, osr_warn, LogContext};
use serde::Deserialize;

use crate::errors::{AnalysisError, Result};
use crate::model::TestStatus;

pub const OPENSTUDIO_RESULTS: &str = "openstudio_results";
pub const TOTAL_SITE_ENERGY: &str = "total_site_energy";
const ENERGYPLUS_COMPLETED: &str = "EnergyPlus Completed Successfully";
/// This release reports `Fail` for runs that actually completed.
const LEGACY_STATUS_VERSION: &str = "2.0.4";

#[derive(Debug, Clone, Deserialize)]
pub struct OutOsw {
    pub completed_status: String,
    #[serde(default)]
    pub steps: Vec<WorkflowStep>,
    #[serde(default)]
    pub eplusout_err: Option<ErrLog>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowStep {
    #[serde(default)]
    pub measure_dir_name: Option<String>,
    #[serde(default)]
    pub result: Option<StepResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepResult {
    #[serde(default)]
    pub measure_name: Option<String>,
    #[serde(default)]
    pub step_values: Vec<StepValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StepValue {
    pub name: String,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub units: Option<String>,
}

/// `eplusout_err` is a list of lines in current files and one string in old ones.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrLog {
    Lines(Vec<String>),
    Text(String),
}

impl ErrLog {
    pub fn contains(&self, needle: &str) -> bool {
        match self {
            ErrLog::Lines(lines) => lines.iter().any(|line| line.contains(needle)),
            ErrLog::Text(text) => text.contains(needle),
        }
    }
}

/// Status and site energy extracted from one result file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultRecord {
    pub status: TestStatus,
    /// kBTU; `None` unless the run succeeded.
    pub total_site_energy: Option<f64>,
}

impl ResultRecord {
    pub fn missing() -> Self {
        Self {
            status: TestStatus::Missing,
            total_site_energy: None,
        }
    }

    /// `None` path yields a `Missing` record; malformed JSON is an error.
    pub fn from_path(path: Option<&Path>, version: &str) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::missing());
        };
        let osw = load_osw(path)?;
        let status = parse_success(&osw, version);
        let total_site_energy = parse_total_site_energy(&osw, version, path)?;
        Ok(Self {
            status,
            total_site_energy,
        })
    }
}

pub fn load_osw(path: &Path) -> Result<OutOsw> {
    let text = fs::read_to_string(path).map_err(|source| AnalysisError::io(path, source))?;
    serde_json::from_str(&text).map_err(|source| AnalysisError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn is_legacy(version: &str) -> bool {
    version == LEGACY_STATUS_VERSION
}

/// `completed_status`, corrected for the legacy release that misreports failures.
pub fn parse_success(osw: &OutOsw, version: &str) -> TestStatus {
    if osw.completed_status == "Success" {
        return TestStatus::Success;
    }
    if is_legacy(version)
        && osw.completed_status == "Fail"
        && osw
            .eplusout_err
            .as_ref()
            .is_some_and(|log| log.contains(ENERGYPLUS_COMPLETED))
    {
        osr_debug!(
            context = LogContext::new().with_version(version),
            "status is Fail but EnergyPlus completed successfully"
        );
        return TestStatus::Success;
    }
    TestStatus::Fail
}

/// The `openstudio_results` step result, first one if there are several.
pub fn openstudio_results<'a>(osw: &'a OutOsw, version: &str, path: &Path) -> Option<&'a StepResult> {
    let legacy = is_legacy(version);
    let mut matches = osw.steps.iter().filter(|step| {
        if legacy {
            step.measure_dir_name.as_deref() == Some(OPENSTUDIO_RESULTS)
        } else {
            step.result
                .as_ref()
                .and_then(|r| r.measure_name.as_deref())
                == Some(OPENSTUDIO_RESULTS)
        }
    });
    let context = LogContext::new().with_version(version);
    let Some(first) = matches.next() else {
        osr_warn!(context = context, "no OpenStudio results for {}", path.display());
        return None;
    };
    if matches.next().is_some() {
        osr_warn!(
            context = context,
            "more than one openstudio_results measure in {}, using the first",
            path.display()
        );
    }
    first.result.as_ref()
}

/// `total_site_energy` in kBTU when the run succeeded.
pub fn parse_total_site_energy(osw: &OutOsw, version: &str, path: &Path) -> Result<Option<f64>> {
    if parse_success(osw, version) != TestStatus::Success {
        return Ok(None);
    }
    let Some(result) = openstudio_results(osw, version, path) else {
        return Ok(None);
    };
    result
        .step_values
        .iter()
        .find(|value| value.name == TOTAL_SITE_ENERGY)
        .and_then(|value| value.value.as_f64())
        .map(Some)
        .ok_or_else(|| AnalysisError::MissingMetric {
            path: path.to_path_buf(),
            metric: TOTAL_SITE_ENERGY,
        })
}
