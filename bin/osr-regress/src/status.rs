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
use osr_analysis::sheets::StatusSheet;
use osr_analysis::status_matrix;
use osr_common::AppConfig;
use osr_render::write_status_html;
use tracing::info;

use crate::context::{absolute, result_matrix, SelectionArgs};

#[derive(Debug, Args)]
pub struct StatusCommand {
    #[command(flatten)]
    selection: SelectionArgs,
    /// Also list tests without any failing or missing result.
    #[arg(long = "entire-table")]
    entire_table: bool,
    /// Output directory (defaults to paths.output_dir).
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,
}

pub fn run(cmd: StatusCommand, config: &AppConfig) -> Result<()> {
    let files = result_matrix(config, cmd.selection.selection())?;
    let model_dir = absolute(&config.paths.model_dir)?;
    let osm_versions = if model_dir.is_dir() {
        scan_osm_versions(&model_dir)
            .with_context(|| format!("failed to scan models in {}", model_dir.display()))?
    } else {
        Default::default()
    };
    let sheet = StatusSheet::build(&status_matrix(&files)?, &osm_versions);
    info!(
        failing = sheet.failing_or_missing().count(),
        total = sheet.rows.len(),
        "test status computed"
    );

    let output_dir = absolute(cmd.output.as_deref().unwrap_or(&config.paths.output_dir))?;
    let path = write_status_html(&sheet, cmd.entire_table, &output_dir)?;
    println!("{}", path.display());
    Ok(())
}
