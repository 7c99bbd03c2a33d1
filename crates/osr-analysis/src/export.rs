//! ---
//! osr_section: "04-result-analysis"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Parsing and aggregation of regression test results."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
//! CSV export of the report sheets.
//!
//! Version matrices carry three header rows (`E+`, `OS`, `Tag`) so that the
//! files read the same way as the published spreadsheet.

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use strum::IntoEnumIterator;
use tracing::info;

use crate::errors::{AnalysisError, Result};
use crate::matrix::Matrix;
use crate::model::{ColumnKey, FileType};
use crate::sheets::{ImplementedSheet, StatusSheet};

pub const TEST_STATUS_CSV: &str = "test_status.csv";
pub const TESTS_IMPLEMENTED_CSV: &str = "tests_implemented.csv";
pub const SITE_KBTU_CSV: &str = "site_kbtu.csv";
pub const SITE_KBTU_PCT_CHANGE_CSV: &str = "site_kbtu_pct_change.csv";

#[derive(Debug)]
pub struct SheetExporter<'a> {
    pub status: &'a StatusSheet,
    pub implemented: &'a ImplementedSheet,
    pub site_kbtu: &'a Matrix<f64>,
    pub pct_change: &'a Matrix<f64>,
}

impl<'a> SheetExporter<'a> {
    /// Write every sheet into `output_dir`, returning the written paths.
    pub fn export_all(&self, output_dir: &Path) -> Result<Vec<PathBuf>> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir).map_err(|source| AnalysisError::io(output_dir, source))?;
        }
        let written = vec![
            write_status_csv(self.status, &output_dir.join(TEST_STATUS_CSV))?,
            write_implemented_csv(self.implemented, &output_dir.join(TESTS_IMPLEMENTED_CSV))?,
            write_matrix_csv(self.site_kbtu, &output_dir.join(SITE_KBTU_CSV))?,
            write_matrix_csv(self.pct_change, &output_dir.join(SITE_KBTU_PCT_CHANGE_CSV))?,
        ];
        info!("Sheets exported to {}", output_dir.display());
        Ok(written)
    }
}

fn header_rows(columns: &[ColumnKey], trailing: &[&str]) -> [Vec<String>; 3] {
    let mut eplus = vec!["E+".to_owned(), String::new()];
    let mut os = vec!["OS".to_owned(), String::new()];
    let mut tag = vec!["Tag".to_owned(), String::new()];
    for column in columns {
        eplus.push(column.energyplus.clone());
        os.push(column.openstudio.clone());
        tag.push(column.tag.clone().unwrap_or_default());
    }
    for name in trailing {
        eplus.push((*name).to_owned());
        os.push(String::new());
        tag.push(String::new());
    }
    [eplus, os, tag]
}

pub fn write_matrix_csv<T: Display>(matrix: &Matrix<T>, path: &Path) -> Result<PathBuf> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in header_rows(matrix.columns(), &[]) {
        writer.write_record(&row)?;
    }
    for (key, values) in matrix.iter_rows() {
        let mut record = vec![key.test.clone(), key.file_type.to_string()];
        record.extend(
            values
                .iter()
                .map(|v| v.as_ref().map(ToString::to_string).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }
    writer.flush().map_err(|source| AnalysisError::io(path, source))?;
    Ok(path.to_path_buf())
}

pub fn write_status_csv(sheet: &StatusSheet, path: &Path) -> Result<PathBuf> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in header_rows(&sheet.columns, &["n_fail", "n_missing", "n_fail+missing"]) {
        writer.write_record(&row)?;
    }
    for row in &sheet.rows {
        let mut record = vec![row.key.test.clone(), row.key.file_type.to_string()];
        record.extend(row.cells.iter().map(ToString::to_string));
        record.push(row.n_fail.to_string());
        record.push(row.n_missing.to_string());
        record.push(row.n_fail_missing.to_string());
        writer.write_record(&record)?;
    }
    writer.flush().map_err(|source| AnalysisError::io(path, source))?;
    Ok(path.to_path_buf())
}

pub fn write_implemented_csv(sheet: &ImplementedSheet, path: &Path) -> Result<PathBuf> {
    let mut writer = csv::Writer::from_path(path)?;
    let mut header = vec!["Test".to_owned()];
    header.extend(FileType::iter().map(|t| t.to_string()));
    header.extend(
        ["OSM version", "Major", "Minor", "Patch", "First Version Ruby Worked"]
            .iter()
            .map(|s| (*s).to_owned()),
    );
    writer.write_record(&header)?;

    for row in &sheet.rows {
        let mut record = vec![row.test.clone()];
        record.extend(
            FileType::iter().map(|t| row.has.get(&t).copied().unwrap_or(false).to_string()),
        );
        match &row.osm_version {
            Some(v) => record.extend([
                v.version.clone(),
                v.major.to_string(),
                v.minor.to_string(),
                v.patch.to_string(),
            ]),
            None => record.extend(std::iter::repeat(String::new()).take(4)),
        }
        record.push(row.first_ruby_success.clone().unwrap_or_default());
        writer.write_record(&record)?;
    }
    writer.flush().map_err(|source| AnalysisError::io(path, source))?;
    Ok(path.to_path_buf())
}
