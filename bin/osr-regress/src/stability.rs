//! ---
//! osr_section: "06-command-line"
//! osr_subsection: "binary"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Command line front end for regression result analysis."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
//! Repeated runs of a test subset, each tagged `<platform>_<i>`, and cleanup
//! of the tagged result files they leave behind.

use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use osr_analysis::cleanup::{delete_custom_tagged, TagFilter};
use osr_common::AppConfig;
use osr_logging::{osr_info, osr_warn, LogContext};

use crate::context::absolute;

#[derive(Debug, Subcommand)]
pub enum StabilityCommand {
    /// Run the filtered tests several times with a custom tag per run.
    Run(RunArgs),
    /// Delete custom tagged result files.
    Clean(CleanArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Test filter passed to the runner as `-n /FILTER/`.
    #[arg(short = 'n', long = "test-filter", value_name = "FILTER")]
    test_filter: String,
    /// Number of runs (defaults to stability.default_runs).
    #[arg(short = 'N', long = "run-n-times", value_name = "N")]
    run_n_times: Option<u32>,
    /// Index of the first run.
    #[arg(short = 'S', long = "start-at", value_name = "I", default_value_t = 1)]
    start_at: u32,
    /// OpenStudio CLI (or `ruby`) used to launch the runner.
    #[arg(long = "os-cli", value_name = "PATH")]
    os_cli: Option<String>,
    /// Exported as ENERGYPLUS_EXE_PATH.
    #[arg(long = "eplus-exe", value_name = "PATH")]
    eplus_exe: Option<PathBuf>,
    /// Keep the IDF files next to the result files.
    #[arg(long = "save-idf")]
    save_idf: bool,
    /// Platform part of the tag (defaults to the host, e.g. `Linux`).
    #[arg(long = "platform-name", value_name = "NAME")]
    platform_name: Option<String>,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Only delete tagged files whose name contains this string.
    #[arg(long, value_name = "STR", conflicts_with = "pattern")]
    contains: Option<String>,
    /// Only delete tagged files whose name matches this regular expression.
    #[arg(long, value_name = "REGEX")]
    pattern: Option<String>,
}

/// One invocation of the test runner.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRun {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl PlannedRun {
    pub fn custom_tag(&self) -> &str {
        self.env
            .iter()
            .find(|(key, _)| key == "CUSTOMTAG")
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }
}

pub fn run(command: StabilityCommand, config: &AppConfig) -> Result<()> {
    match command {
        StabilityCommand::Run(args) => execute_runs(&plan_runs(&args, config)),
        StabilityCommand::Clean(args) => clean(args, config),
    }
}

/// Host platform as reported by `uname`, e.g. `Linux` or `Darwin`.
pub fn host_platform() -> String {
    match std::env::consts::OS {
        "linux" => "Linux".to_owned(),
        "macos" => "Darwin".to_owned(),
        "windows" => "Windows".to_owned(),
        other => other.to_owned(),
    }
}

pub fn plan_runs(args: &RunArgs, config: &AppConfig) -> Vec<PlannedRun> {
    let platform = args.platform_name.clone().unwrap_or_else(host_platform);
    let program = args
        .os_cli
        .clone()
        .unwrap_or_else(|| config.stability.os_cli.clone());
    let runs = args.run_n_times.unwrap_or(config.stability.default_runs);

    (args.start_at..args.start_at + runs)
        .map(|i| {
            let mut env = vec![("CUSTOMTAG".to_owned(), format!("{platform}_{i}"))];
            if let Some(exe) = &args.eplus_exe {
                env.push(("ENERGYPLUS_EXE_PATH".to_owned(), exe.display().to_string()));
            }
            if args.save_idf {
                env.push(("SAVE_IDF".to_owned(), "True".to_owned()));
            }
            PlannedRun {
                program: program.clone(),
                args: vec![
                    config.stability.runner_script.display().to_string(),
                    "-n".to_owned(),
                    format!("/{}/", args.test_filter),
                ],
                env,
            }
        })
        .collect()
}

fn execute_runs(runs: &[PlannedRun]) -> Result<()> {
    for run in runs {
        let ctx = LogContext::new()
            .with_command("test-stability")
            .with_tag(run.custom_tag());
        osr_info!(context = ctx, "running {} {}", run.program, run.args.join(" "));
        let status = Command::new(&run.program)
            .args(&run.args)
            .envs(run.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .status()
            .with_context(|| format!("failed to launch {}", run.program))?;
        // Failing tests are recorded in the result files; keep going.
        if !status.success() {
            osr_warn!(context = ctx, "runner exited with {}", status);
        }
    }
    Ok(())
}

fn clean(args: CleanArgs, config: &AppConfig) -> Result<()> {
    let filter = TagFilter::from_options(args.contains, args.pattern.as_deref())?;
    let test_dir = absolute(&config.paths.test_dir)?;
    let deleted = delete_custom_tagged(&test_dir, &filter)?;
    osr_info!(
        context = LogContext::new().with_command("test-stability"),
        "deleted {} custom tagged result files",
        deleted.len()
    );
    for path in deleted {
        println!("{}", path.display());
    }
    Ok(())
}
