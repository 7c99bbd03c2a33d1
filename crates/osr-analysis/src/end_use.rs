//! ---
//! osr_section: "04-result-analysis"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Parsing and aggregation of regression test results."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
//! Fuel by end use breakdown from the `openstudio_results` step values.

use std::io::Write;
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;

use crate::errors::{AnalysisError, Result};
use crate::model::TestStatus;
use crate::osw::{load_osw, openstudio_results, parse_success};

/// Substituted in this order into the raw step value name.
const PRETTY_NAMES: &[(&str, &str)] = &[
    ("cooling", "Cooling"),
    ("exterior_equipment", "Exterior Equipment"),
    ("exterior_lighting", "Exterior Lighting"),
    ("fans", "Fans"),
    ("generators", "Generators"),
    ("heat_recovery", "Heat Recovery"),
    ("heat_rejection", "Heat Rejection"),
    ("heating", "Heating"),
    ("humidification", "Humidification"),
    ("interior_equipment", "Interior Equipment"),
    ("interior_lighting", "Interior Lighting"),
    ("pumps", "Pumps"),
    ("refrigeration", "Refrigeration"),
    ("water_systems", "Water Systems"),
    ("electricity", "Electricity"),
    ("natural_gas", "Natural Gas"),
];

pub const TOTAL_FUEL: &str = "Total";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndUseValue {
    pub fuel: String,
    pub end_use: String,
    pub units: String,
    /// Zero consumption is reported as blank.
    pub value: Option<f64>,
}

/// End use values of a successful run, in step order.
pub fn parse_end_use(path: &Path, version: &str) -> Result<Vec<EndUseValue>> {
    let osw = load_osw(path)?;
    if parse_success(&osw, version) != TestStatus::Success {
        return Err(AnalysisError::SimulationFailed(path.to_path_buf()));
    }
    let result = openstudio_results(&osw, version, path)
        .ok_or_else(|| AnalysisError::MissingResults(path.to_path_buf()))?;

    Ok(result
        .step_values
        .iter()
        .filter(|value| value.name.contains("end_use"))
        .filter_map(|value| {
            let units = value.units.clone()?;
            let (fuel, end_use) = split_end_use_name(&value.name);
            Some(EndUseValue {
                fuel,
                end_use,
                units,
                value: value.value.as_f64().filter(|v| *v != 0.0),
            })
        })
        .collect())
}

/// `end_use_natural_gas_heating` -> (`Natural Gas`, `Heating`);
/// `end_use_electricity` -> (`Total`, `Electricity`).
pub fn split_end_use_name(name: &str) -> (String, String) {
    let mut pretty = name.to_owned();
    for (raw, nice) in PRETTY_NAMES {
        pretty = pretty.replace(raw, nice);
    }
    let stripped = pretty.replace("end_use_", "");
    match stripped.split_once('_') {
        Some((fuel, end_use)) => (fuel.to_owned(), end_use.to_owned()),
        None => (TOTAL_FUEL.to_owned(), stripped),
    }
}

/// Pivot as CSV: one row per end use, one column per `Fuel [units]`.
pub fn write_end_use_csv<W: Write>(values: &[EndUseValue], out: W) -> Result<()> {
    let mut columns: IndexMap<String, ()> = IndexMap::new();
    let mut table: IndexMap<String, IndexMap<String, Option<f64>>> = IndexMap::new();
    for value in values {
        let column = format!("{} [{}]", value.fuel, value.units);
        columns.insert(column.clone(), ());
        table
            .entry(value.end_use.clone())
            .or_default()
            .insert(column, value.value);
    }

    let mut writer = csv::Writer::from_writer(out);
    let mut header = vec!["End Use".to_owned()];
    header.extend(columns.keys().cloned());
    writer.write_record(&header)?;
    for (end_use, cells) in &table {
        let mut record = vec![end_use.clone()];
        for column in columns.keys() {
            record.push(
                cells
                    .get(column)
                    .copied()
                    .flatten()
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            );
        }
        writer.write_record(&record)?;
    }
    writer
        .flush()
        .map_err(|source| AnalysisError::io("<end-use csv>", source))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn names_split_into_fuel_and_end_use() {
        assert_eq!(
            split_end_use_name("end_use_natural_gas_heat_recovery"),
            ("Natural Gas".to_owned(), "Heat Recovery".to_owned())
        );
        assert_eq!(
            split_end_use_name("end_use_electricity_interior_lighting"),
            ("Electricity".to_owned(), "Interior Lighting".to_owned())
        );
        assert_eq!(
            split_end_use_name("end_use_electricity"),
            ("Total".to_owned(), "Electricity".to_owned())
        );
    }

    #[test]
    fn parses_successful_run_and_blanks_zeros() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.rb_3.7.0_out.osw");
        let osw = json!({
            "completed_status": "Success",
            "steps": [{"result": {"measure_name": "openstudio_results", "step_values": [
                {"name": "end_use_electricity_cooling", "value": 12.5, "units": "kWh"},
                {"name": "end_use_natural_gas_heating", "value": 0.0, "units": "MBtu"},
                {"name": "end_use_electricity", "value": 40.0, "units": "kWh"},
                {"name": "end_use_flag", "value": true},
                {"name": "total_site_energy", "value": 10.0, "units": "kBtu"}
            ]}}]
        });
        fs::write(&path, osw.to_string()).unwrap();

        let values = parse_end_use(&path, "3.7.0").unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[0].fuel, "Electricity");
        assert_eq!(values[0].value, Some(12.5));
        assert_eq!(values[1].value, None);
        assert_eq!(values[2].fuel, "Total");

        let mut out = Vec::new();
        write_end_use_csv(&values, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("End Use,Electricity [kWh],Natural Gas [MBtu],Total [kWh]")
        );
        assert_eq!(lines.next(), Some("Cooling,12.5,,"));
    }

    #[test]
    fn failed_run_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.rb_3.7.0_out.osw");
        fs::write(&path, r#"{"completed_status": "Fail"}"#).unwrap();
        assert!(matches!(
            parse_end_use(&path, "3.7.0"),
            Err(AnalysisError::SimulationFailed(_))
        ));
    }
}
