//! ---
//! osr_section: "04-result-analysis"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Parsing and aggregation of regression test results."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
pub mod cleanup;
pub mod end_use;
pub mod errors;
pub mod export;
pub mod locator;
pub mod matrix;
pub mod model;
pub mod osm_versions;
pub mod osw;
pub mod sheets;

use std::path::PathBuf;

use tracing::info;

pub use errors::{AnalysisError, Result};
pub use locator::{
    build_file_matrix, locate_result_files, openstudio_versions, parse_result_filename,
    LocatedFile, TagSelection,
};
pub use matrix::{filter_rows_above, pct_change, site_energy_matrix, status_matrix, Matrix};
pub use model::{ColumnKey, FileType, ResultFileKey, RowKey, TestStatus};
pub use osw::{load_osw, parse_success, parse_total_site_energy, ResultRecord};

/// Site energy, its release-over-release change and the rows worth plotting.
#[derive(Debug, Clone)]
pub struct SiteEnergyReport {
    pub site_kbtu: Matrix<f64>,
    pub pct_change: Matrix<f64>,
    /// `pct_change` restricted to rows above the row threshold.
    pub filtered: Matrix<f64>,
}

/// Parse every result file and compute the percent change sheet.
pub fn analyze_site_energy(files: &Matrix<PathBuf>, row_threshold: f64) -> Result<SiteEnergyReport> {
    info!(rows = files.n_rows(), columns = files.n_cols(), "parsing total site energy");
    let site_kbtu = site_energy_matrix(files)?;
    let pct_change = pct_change(&site_kbtu);
    let filtered = filter_rows_above(&pct_change, row_threshold);
    info!(
        kept = filtered.n_rows(),
        total = pct_change.n_rows(),
        row_threshold,
        "filtered rows by percent change"
    );
    Ok(SiteEnergyReport {
        site_kbtu,
        pct_change,
        filtered,
    })
}
