//! ---
//! osr_section: "05-report-rendering"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Heatmap and table rendering for regression reports."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
pub mod colormap;
pub mod errors;
pub mod heatmap;
pub mod html;
pub mod png;

use std::fs;
use std::path::{Path, PathBuf};

use osr_analysis::sheets::StatusSheet;
use osr_analysis::Matrix;
use osr_logging::{log_report_event, LogContext, ReportOutcome};
use tracing::info;

pub use errors::{RenderError, Result};
pub use heatmap::{
    classify, figure_name, render_chunk_svgs, render_heatmap_svg, CellClass, HeatmapOptions,
};
pub use html::{heatmap_table_html, status_table_html};
pub use png::Rasterizer;

pub const TEST_STATUS_HTML: &str = "test_status.html";

/// Files produced by [`HeatmapRenderer::render`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeatmapArtifacts {
    pub png: PathBuf,
    pub svg: PathBuf,
    pub axes: Vec<PathBuf>,
    pub html: Option<PathBuf>,
}

/// Writes the percent change heatmap and its companions into one directory.
#[derive(Debug, Clone)]
pub struct HeatmapRenderer<'a> {
    pub options: &'a HeatmapOptions,
    /// File name of the PNG; the SVG, HTML and per-panel files share its stem.
    pub figname: String,
    pub individual_axes: bool,
    pub html: bool,
}

impl<'a> HeatmapRenderer<'a> {
    pub fn new(options: &'a HeatmapOptions, figname: impl Into<String>) -> Self {
        Self {
            options,
            figname: figname.into(),
            individual_axes: false,
            html: false,
        }
    }

    pub fn render(&self, values: &Matrix<f64>, output_dir: &Path) -> Result<HeatmapArtifacts> {
        let ctx = LogContext::new().with_command("heatmap");
        match self.render_inner(values, output_dir) {
            Ok(artifacts) => {
                log_report_event(
                    Some(&ctx),
                    "report.heatmap",
                    &format!("heatmap written to {}", artifacts.png.display()),
                    ReportOutcome::Success,
                );
                Ok(artifacts)
            }
            Err(err) => {
                log_report_event(Some(&ctx), "report.heatmap", &err.to_string(), ReportOutcome::Fault);
                Err(err)
            }
        }
    }

    fn render_inner(&self, values: &Matrix<f64>, output_dir: &Path) -> Result<HeatmapArtifacts> {
        create_dir(output_dir)?;
        let opts = self.options;
        let stem = Path::new(&self.figname)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "heatmap".to_owned());

        let svg = render_heatmap_svg(values, opts)?;
        let svg_path = output_dir.join(format!("{stem}.svg"));
        write_text(&svg_path, &svg)?;
        let raster = Rasterizer::with_system_fonts(&opts.font_family);
        let png_path = output_dir.join(format!("{stem}.png"));
        raster.write_png(&svg, opts.width_px(), &png_path)?;
        info!(path = %png_path.display(), rows = values.n_rows(), "rendered heatmap");

        let mut artifacts = HeatmapArtifacts {
            png: png_path,
            svg: svg_path,
            ..HeatmapArtifacts::default()
        };

        if self.individual_axes {
            for (i, chunk_svg) in render_chunk_svgs(values, opts)?.iter().enumerate() {
                let path = output_dir.join(format!("{stem}_ax{i}.png"));
                raster.write_png(chunk_svg, opts.width_px(), &path)?;
                artifacts.axes.push(path);
            }
        }

        if self.html {
            let path = output_dir.join(format!("{stem}.html"));
            write_text(&path, &heatmap_table_html(values, opts))?;
            artifacts.html = Some(path);
        }
        Ok(artifacts)
    }
}

/// Write the HTML status table into `output_dir`.
pub fn write_status_html(sheet: &StatusSheet, entire_table: bool, output_dir: &Path) -> Result<PathBuf> {
    create_dir(output_dir)?;
    let path = output_dir.join(TEST_STATUS_HTML);
    write_text(&path, &status_table_html(sheet, entire_table))?;
    log_report_event(
        Some(&LogContext::new().with_command("test-status")),
        "report.test_status",
        &format!("status table written to {}", path.display()),
        ReportOutcome::Success,
    );
    Ok(path)
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| RenderError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_text(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })
}
