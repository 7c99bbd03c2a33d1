//! ---
//! osr_section: "06-command-line"
//! osr_subsection: "binary"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Command line front end for regression result analysis."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
use anyhow::Result;
use clap::Args;
use osr_analysis::cleanup::{strip_bloated_osws, DEFAULT_MAX_OSW_BYTES};
use osr_common::AppConfig;
use tracing::info;

use crate::context::absolute;

#[derive(Debug, Args)]
pub struct CleanupCommand {
    /// Size in bytes above which `eplusout_err` is removed.
    #[arg(long = "max-bytes", value_name = "N", default_value_t = DEFAULT_MAX_OSW_BYTES)]
    max_bytes: u64,
}

pub fn run(cmd: CleanupCommand, config: &AppConfig) -> Result<()> {
    let test_dir = absolute(&config.paths.test_dir)?;
    let stripped = strip_bloated_osws(&test_dir, cmd.max_bytes)?;
    info!(count = stripped.len(), dir = %test_dir.display(), "stripped bloated result files");
    for path in stripped {
        println!("{}", path.display());
    }
    Ok(())
}
