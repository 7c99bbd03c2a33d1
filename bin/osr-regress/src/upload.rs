//! ---
//! osr_section: "06-command-line"
//! osr_subsection: "binary"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Command line front end for regression result analysis."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use osr_analysis::osm_versions::scan_osm_versions;
use osr_analysis::sheets::{ImplementedSheet, StatusSheet};
use osr_analysis::{analyze_site_energy, export::SheetExporter, status_matrix, TagSelection};
use osr_common::AppConfig;
use osr_logging::{log_report_event, LogContext, ReportOutcome};

use crate::context::{absolute, result_matrix};

#[derive(Debug, Args)]
pub struct UploadCommand {
    /// Output directory (defaults to paths.output_dir).
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,
    /// Restrict the implemented sheet to tests without an OSM model version.
    #[arg(long = "only-missing-osm")]
    only_missing_osm: bool,
}

/// Writes the status, implemented, site kBTU and percent change sheets.
pub fn run(cmd: UploadCommand, config: &AppConfig) -> Result<()> {
    let files = result_matrix(config, TagSelection::Untagged)?;
    let model_dir = absolute(&config.paths.model_dir)?;
    let osm_versions = if model_dir.is_dir() {
        scan_osm_versions(&model_dir)
            .with_context(|| format!("failed to scan models in {}", model_dir.display()))?
    } else {
        Default::default()
    };

    let status = StatusSheet::build(&status_matrix(&files)?, &osm_versions);
    let implemented = ImplementedSheet::build(&files, &status, &osm_versions, cmd.only_missing_osm);
    let report = analyze_site_energy(&files, config.heatmap.row_threshold)?;

    let output_dir = absolute(cmd.output.as_deref().unwrap_or(&config.paths.output_dir))?;
    let written = SheetExporter {
        status: &status,
        implemented: &implemented,
        site_kbtu: &report.site_kbtu,
        pct_change: &report.pct_change,
    }
    .export_all(&output_dir)?;

    log_report_event(
        Some(&LogContext::new().with_command("upload")),
        "report.sheets",
        &format!("{} sheets written to {}", written.len(), output_dir.display()),
        ReportOutcome::Success,
    );
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}
