//! ---
//! osr_section: "06-command-line"
//! osr_subsection: "binary"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Command line front end for regression result analysis."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use osr_analysis::end_use::{parse_end_use, write_end_use_csv};
use osr_analysis::parse_result_filename;

#[derive(Debug, Args)]
pub struct EndUseCommand {
    /// Result file, e.g. `test/baseline_sys01.osm_3.7.0_out.osw`.
    #[arg(value_name = "OSW")]
    osw: PathBuf,
}

pub fn run(cmd: EndUseCommand) -> Result<()> {
    // The version only matters for legacy result layouts; unknown names parse as current.
    let version = cmd
        .osw
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(parse_result_filename)
        .map(|key| key.version)
        .unwrap_or_default();
    let values = parse_end_use(&cmd.osw, &version)
        .with_context(|| format!("cannot read end uses from {}", cmd.osw.display()))?;
    write_end_use_csv(&values, io::stdout().lock())?;
    Ok(())
}
