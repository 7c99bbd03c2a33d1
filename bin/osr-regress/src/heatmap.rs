//! ---
//! osr_section: "06-command-line"
//! osr_subsection: "binary"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Command line front end for regression result analysis."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use clap::Args;
use osr_analysis::analyze_site_energy;
use osr_common::{AppConfig, HeatmapConfig};
use osr_logging::{osr_warn, LogContext};
use osr_render::{figure_name, HeatmapOptions, HeatmapRenderer};
use tracing::info;

use crate::context::{absolute, result_matrix, SelectionArgs};

#[derive(Debug, Args)]
pub struct HeatmapCommand {
    #[command(flatten)]
    selection: SelectionArgs,
    /// Only plot tests with at least one change greater than this fraction.
    #[arg(short = 'r', long = "row-threshold", value_name = "FRACTION")]
    row_threshold: Option<f64>,
    /// Cells at or below this fraction are greyed out.
    #[arg(short = 'd', long = "display-threshold", value_name = "FRACTION")]
    display_threshold: Option<f64>,
    /// Use the granular thresholds (0.0005 / 0.0001 by default).
    #[arg(short = 'g', long, conflicts_with_all = ["row_threshold", "display_threshold"])]
    granular: bool,
    /// Also save one image per panel.
    #[arg(short = 'i', long = "indiv-axes")]
    individual_axes: bool,
    /// Append both thresholds to the figure name.
    #[arg(short = 'f', long = "figname-with-thresholds")]
    figname_with_thresholds: bool,
    /// Also write the coloured table as HTML.
    #[arg(long)]
    html: bool,
    /// Open the image in the system viewer once written.
    #[arg(long)]
    open: bool,
    /// Output directory (defaults to paths.output_dir).
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,
}

impl HeatmapCommand {
    fn thresholds(&self, config: &HeatmapConfig) -> (f64, f64) {
        if self.granular {
            return (config.granular_row_threshold, config.granular_display_threshold);
        }
        (
            self.row_threshold.unwrap_or(config.row_threshold),
            self.display_threshold.unwrap_or(config.display_threshold),
        )
    }
}

pub fn options_from_config(config: &HeatmapConfig, row_threshold: f64, display_threshold: f64) -> HeatmapOptions {
    HeatmapOptions {
        row_threshold,
        display_threshold,
        max_rows_per_chunk: config.max_rows_per_chunk,
        width_in: config.width_in,
        dpi: config.dpi,
        vmax: config.vmax,
        font_family: config.font_family.clone(),
    }
}

pub fn run(cmd: HeatmapCommand, config: &AppConfig) -> Result<()> {
    let (row_threshold, display_threshold) = cmd.thresholds(&config.heatmap);
    let files = result_matrix(config, cmd.selection.selection())?;
    let report = analyze_site_energy(&files, row_threshold)?;

    if report.filtered.is_empty() {
        osr_warn!(
            context = LogContext::new().with_command("heatmap"),
            "no test changed by more than {:.2}%, nothing to plot",
            row_threshold * 100.0
        );
        return Ok(());
    }

    let options = options_from_config(&config.heatmap, row_threshold, display_threshold);
    let figname = figure_name(cmd.figname_with_thresholds, row_threshold, display_threshold);
    let mut renderer = HeatmapRenderer::new(&options, figname);
    renderer.individual_axes = cmd.individual_axes;
    renderer.html = cmd.html;

    let output_dir = absolute(cmd.output.as_deref().unwrap_or(&config.paths.output_dir))?;
    let artifacts = renderer.render(&report.filtered, &output_dir)?;
    println!("{}", artifacts.png.display());
    for path in artifacts.axes.iter().chain(artifacts.html.iter()) {
        println!("{}", path.display());
    }

    if cmd.open {
        open_in_viewer(&artifacts.png)?;
    }
    Ok(())
}

fn open_in_viewer(path: &Path) -> Result<()> {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };
    info!(opener, path = %path.display(), "opening heatmap");
    Command::new(opener)
        .arg(path)
        .status()
        .with_context(|| format!("failed to launch {opener}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        cmd: HeatmapCommand,
    }

    #[test]
    fn granular_overrides_defaults() {
        let config = HeatmapConfig::default();
        let parsed = Harness::parse_from(["heatmap", "-g", "-i", "-f"]);
        assert_eq!(parsed.cmd.thresholds(&config), (0.0005, 0.0001));
        assert!(parsed.cmd.individual_axes);

        let parsed = Harness::parse_from(["heatmap", "-r", "0.02"]);
        assert_eq!(parsed.cmd.thresholds(&config), (0.02, 0.001));
    }

    #[test]
    fn granular_conflicts_with_explicit_thresholds() {
        assert!(Harness::try_parse_from(["heatmap", "-g", "-r", "0.02"]).is_err());
        assert!(Harness::try_parse_from(["heatmap", "--tagged", "--all"]).is_err());
    }
}
