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
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use osr_common::version::VersionInfo;
use osr_common::init_tracing;

mod cleanup;
mod compat;
mod context;
mod end_use;
mod heatmap;
mod prompt;
mod stability;
mod status;
mod upload;

use context::GlobalArgs;

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    about = "Parse and analyze OpenStudio regression test results",
    long_about = None
)]
struct Cli {
    #[arg(
        short = 'V',
        long = "version",
        action = ArgAction::SetTrue,
        help = "Print extended version information and exit"
    )]
    version: bool,
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Percent change heatmap of total site kBTU between versions.
    Heatmap(heatmap::HeatmapCommand),
    /// Export every result sheet as CSV.
    Upload(upload::UploadCommand),
    #[command(subcommand, name = "test-stability", about = "Repeated runs to detect unstable tests")]
    TestStability(stability::StabilityCommand),
    /// HTML table of test status per version.
    #[command(name = "test-status")]
    TestStatus(status::StatusCommand),
    #[command(subcommand, about = "OpenStudio / EnergyPlus compatibility matrix")]
    Compat(compat::CompatCommand),
    /// Print the end use breakdown of one result file as CSV.
    #[command(name = "end-use")]
    EndUse(end_use::EndUseCommand),
    /// Remove `eplusout_err` from oversized result files.
    #[command(name = "cleanup-bloated")]
    CleanupBloated(cleanup::CleanupCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.version {
        println!("{}", VersionInfo::current().extended());
        return Ok(());
    }
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = cli.global.load_config()?;
    init_tracing("osr-regress", &config.logging)?;

    match command {
        Commands::Heatmap(cmd) => heatmap::run(cmd, &config)?,
        Commands::Upload(cmd) => upload::run(cmd, &config)?,
        Commands::TestStability(cmd) => stability::run(cmd, &config)?,
        Commands::TestStatus(cmd) => status::run(cmd, &config)?,
        Commands::Compat(cmd) => compat::run(cmd, &config)?,
        Commands::EndUse(cmd) => end_use::run(cmd)?,
        Commands::CleanupBloated(cmd) => cleanup::run(cmd, &config)?,
    }
    Ok(())
}
