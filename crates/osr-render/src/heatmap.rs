//! ---
//! osr_section: "05-report-rendering"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Heatmap and table rendering for regression reports."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
//! SVG layout of the percent change heatmap.
//!
//! Rows are split into panels of at most `max_rows_per_chunk` rows stacked in
//! one figure, each with its own version labels and colour bar. Cells fall in
//! four classes: heat-coloured above the display threshold, grey italic below
//! it, flat green for exact zeros and white when blank.
//!
//! Units are SVG user units with 72 per inch, so the figure is
//! `width_in * 72` wide and the rasteriser scales it to `width_in * dpi`.

use osr_analysis::{ColumnKey, Matrix};

use crate::colormap::{scaled, Rgb, YL_OR_RD};
use crate::errors::{RenderError, Result};

pub const TITLE: &str = "Percent difference total site kBTU from one version to the next";
pub const DEFAULT_FIGNAME: &str = "site_kbtu_pct_change.png";

const PT_PER_IN: f64 = 72.0;
/// Figures taller than this repeat the version labels above each panel.
const REPEAT_LABELS_ABOVE_IN: f64 = 9.0;

const MARGIN: f64 = 18.0;
const TITLE_H: f64 = 40.0;
const TITLE_FONT: f64 = 16.0;
const LABEL_FONT: f64 = 8.0;
const LABEL_LINE: f64 = 10.0;
const FOOTER_FONT: f64 = 9.0;
const FOOTER_LINE: f64 = 13.0;
const CHUNK_GAP: f64 = 16.0;
const COLORBAR_AREA: f64 = 72.0;
const COLORBAR_W: f64 = 12.0;
const MIN_CELL_H: f64 = 11.0;
const MAX_CELL_H: f64 = 40.0;

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapOptions {
    pub row_threshold: f64,
    pub display_threshold: f64,
    pub max_rows_per_chunk: usize,
    pub width_in: f64,
    pub dpi: u32,
    pub vmax: f64,
    pub font_family: String,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            row_threshold: 0.01,
            display_threshold: 0.001,
            max_rows_per_chunk: 40,
            width_in: 16.0,
            dpi: 150,
            vmax: 0.5,
            font_family: "DejaVu Sans".to_owned(),
        }
    }
}

impl HeatmapOptions {
    /// Raster width of the full figure.
    pub fn width_px(&self) -> u32 {
        (self.width_in * f64::from(self.dpi)).round() as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellClass {
    Missing,
    Zero,
    BelowThreshold(f64),
    Heat(f64),
}

pub fn classify(value: Option<f64>, display_threshold: f64) -> CellClass {
    match value {
        None => CellClass::Missing,
        Some(v) if v.is_nan() => CellClass::Missing,
        Some(v) if v == 0.0 => CellClass::Zero,
        Some(v) if v.abs() <= display_threshold => CellClass::BelowThreshold(v),
        Some(v) => CellClass::Heat(v),
    }
}

impl CellClass {
    pub fn fill(&self, vmax: f64) -> Rgb {
        match self {
            CellClass::Missing => Rgb::WHITE,
            CellClass::Zero => Rgb::ZERO,
            CellClass::BelowThreshold(_) => Rgb::BELOW_THRESHOLD,
            CellClass::Heat(v) => scaled(v.abs(), vmax),
        }
    }

    pub fn label(&self) -> Option<String> {
        match self {
            CellClass::Heat(v) => Some(format_pct(*v, 2)),
            CellClass::BelowThreshold(v) => Some(format_pct(*v, 3)),
            CellClass::Missing | CellClass::Zero => None,
        }
    }

    pub fn italic(&self) -> bool {
        matches!(self, CellClass::BelowThreshold(_))
    }
}

/// `0.0123` -> `1.23%` with `decimals = 2`.
pub fn format_pct(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value * 100.0)
}

/// Nominal figure height: a third of the width per column-to-row ratio.
pub fn figure_height_in(width_in: f64, rows: usize, cols: usize) -> f64 {
    if cols == 0 {
        return 0.0;
    }
    width_in * rows as f64 / (3.0 * cols as f64)
}

pub fn repeat_labels_on_top(width_in: f64, rows: usize, cols: usize) -> bool {
    figure_height_in(width_in, rows, cols) > REPEAT_LABELS_ABOVE_IN
}

/// Output file name, optionally carrying both thresholds.
pub fn figure_name(with_thresholds: bool, row_threshold: f64, display_threshold: f64) -> String {
    if with_thresholds {
        format!(
            "site_kbtu_pct_change_row{}_display{}.png",
            row_threshold, display_threshold
        )
    } else {
        DEFAULT_FIGNAME.to_owned()
    }
}

pub fn explanation(row_threshold: f64, display_threshold: f64) -> Vec<String> {
    vec![
        format!(
            "Rows (Tests) have been filtered and are only displayed if there is at least one cell with more than {} change.",
            format_pct(row_threshold, 2)
        ),
        format!(
            "Colorscale applies to cells that are above a display threshold of {}.",
            format_pct(display_threshold, 2)
        ),
        "Cells in grey are below the display threshold. Cells in green are zero.".to_owned(),
        "White cells indicate a missing/failed test.".to_owned(),
    ]
}

/// Full figure: title, every panel and the explanation footer.
pub fn render_heatmap_svg(values: &Matrix<f64>, opts: &HeatmapOptions) -> Result<String> {
    if values.is_empty() {
        return Err(RenderError::EmptyHeatmap);
    }
    let chunks = values.row_chunks(opts.max_rows_per_chunk);
    let repeat_top = repeat_labels_on_top(opts.width_in, values.n_rows(), values.n_cols());
    let footer = explanation(opts.row_threshold, opts.display_threshold);
    Ok(compose(&chunks, opts, repeat_top, true, Some(footer.as_slice())))
}

/// One standalone SVG per panel; the first one carries the title.
pub fn render_chunk_svgs(values: &Matrix<f64>, opts: &HeatmapOptions) -> Result<Vec<String>> {
    if values.is_empty() {
        return Err(RenderError::EmptyHeatmap);
    }
    let repeat_top = repeat_labels_on_top(opts.width_in, values.n_rows(), values.n_cols());
    Ok(values
        .row_chunks(opts.max_rows_per_chunk)
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| compose(std::slice::from_ref(&chunk), opts, repeat_top, i == 0, None))
        .collect())
}

struct Geometry {
    width: f64,
    left: f64,
    cell_w: f64,
    cell_h: f64,
    annot_font: f64,
    label_lines: usize,
}

impl Geometry {
    fn new(chunks: &[Matrix<f64>], opts: &HeatmapOptions) -> Self {
        let width = opts.width_in * PT_PER_IN;
        let cols = chunks.first().map(Matrix::n_cols).unwrap_or(1).max(1);
        let has_tags = chunks
            .iter()
            .flat_map(|c| c.columns())
            .any(|c| c.tag.is_some());
        let longest_label = chunks
            .iter()
            .flat_map(|c| c.rows())
            .map(|r| r.to_string().chars().count())
            .max()
            .unwrap_or(0);
        let left = MARGIN + (longest_label as f64 * LABEL_FONT * 0.6 + 8.0).max(48.0);
        let plot_w = (width - left - COLORBAR_AREA - MARGIN).max(cols as f64 * 8.0);
        let cell_w = plot_w / cols as f64;
        let cell_h = (width / (3.0 * cols as f64)).clamp(MIN_CELL_H, MAX_CELL_H);
        let annot_font = (cell_w / 5.5).clamp(4.0, 9.0).min(cell_h * 0.6);
        Self {
            width,
            left,
            cell_w,
            cell_h,
            annot_font,
            label_lines: if has_tags { 3 } else { 2 },
        }
    }

    fn label_block_h(&self) -> f64 {
        self.label_lines as f64 * LABEL_LINE + 4.0
    }

    fn plot_right(&self, cols: usize) -> f64 {
        self.left + self.cell_w * cols as f64
    }
}

fn compose(
    chunks: &[Matrix<f64>],
    opts: &HeatmapOptions,
    repeat_top: bool,
    with_title: bool,
    footer: Option<&[String]>,
) -> String {
    let geo = Geometry::new(chunks, opts);
    let mut body = String::new();
    let mut y = MARGIN;

    if with_title {
        body.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" font-size="{}" font-weight="bold" text-anchor="middle">{}</text>"#,
            geo.width / 2.0,
            y + TITLE_FONT,
            TITLE_FONT,
            escape_xml_text(TITLE)
        ));
        y += TITLE_H;
    }

    for chunk in chunks {
        if repeat_top {
            column_labels(&mut body, &geo, chunk.columns(), y);
            y += geo.label_block_h();
        }
        let top = y;
        for (r, (key, values)) in chunk.iter_rows().enumerate() {
            let cy = top + r as f64 * geo.cell_h;
            body.push_str(&format!(
                r#"<text x="{:.2}" y="{:.2}" font-size="{}" text-anchor="end">{}</text>"#,
                geo.left - 4.0,
                cy + geo.cell_h / 2.0 + LABEL_FONT * 0.35,
                LABEL_FONT,
                escape_xml_text(&key.to_string())
            ));
            for (c, value) in values.iter().enumerate() {
                let class = classify(*value, opts.display_threshold);
                let fill = class.fill(opts.vmax);
                let cx = geo.left + c as f64 * geo.cell_w;
                body.push_str(&format!(
                    r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" stroke="white" stroke-width="0.5"/>"#,
                    cx, cy, geo.cell_w, geo.cell_h, fill
                ));
                if let Some(label) = class.label() {
                    let style = if class.italic() { r#" font-style="italic""# } else { "" };
                    body.push_str(&format!(
                        r#"<text x="{:.2}" y="{:.2}" font-size="{:.2}" fill="{}" text-anchor="middle"{}>{}</text>"#,
                        cx + geo.cell_w / 2.0,
                        cy + geo.cell_h / 2.0 + geo.annot_font * 0.35,
                        geo.annot_font,
                        fill.text_color(),
                        style,
                        escape_xml_text(&label)
                    ));
                }
            }
        }
        let bottom = top + chunk.n_rows() as f64 * geo.cell_h;
        colorbar(&mut body, geo.plot_right(chunk.n_cols()) + 10.0, top, bottom - top, opts.vmax);
        column_labels(&mut body, &geo, chunk.columns(), bottom + 2.0);
        y = bottom + 2.0 + geo.label_block_h() + CHUNK_GAP;
    }

    if let Some(lines) = footer {
        for line in lines {
            y += FOOTER_LINE;
            body.push_str(&format!(
                r#"<text x="{:.2}" y="{:.2}" font-size="{}">{}</text>"#,
                MARGIN,
                y,
                FOOTER_FONT,
                escape_xml_text(line)
            ));
        }
    }
    let height = y + MARGIN;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.2}" height="{h:.2}" viewBox="0 0 {w:.2} {h:.2}" font-family="{font}, sans-serif">"#,
        w = geo.width,
        h = height,
        font = escape_xml_attr(&opts.font_family)
    );
    svg.push_str(&gradient_defs());
    svg.push_str(&format!(
        r#"<rect width="{:.2}" height="{:.2}" fill="white"/>"#,
        geo.width, height
    ));
    svg.push_str(&body);
    svg.push_str("</svg>");
    svg
}

/// Version labels under (or above) a panel: E+ then OS then the tag.
fn column_labels(out: &mut String, geo: &Geometry, columns: &[ColumnKey], top: f64) {
    for (c, column) in columns.iter().enumerate() {
        let x = geo.left + (c as f64 + 0.5) * geo.cell_w;
        let mut lines = vec![column.energyplus.as_str(), column.openstudio.as_str()];
        if geo.label_lines == 3 {
            lines.push(column.tag.as_deref().unwrap_or(""));
        }
        for (i, line) in lines.iter().enumerate() {
            out.push_str(&format!(
                r#"<text x="{:.2}" y="{:.2}" font-size="{}" text-anchor="middle">{}</text>"#,
                x,
                top + (i + 1) as f64 * LABEL_LINE,
                LABEL_FONT,
                escape_xml_text(line)
            ));
        }
    }
}

fn gradient_defs() -> String {
    let last = (YL_OR_RD.len() - 1) as f64;
    let stops: String = YL_OR_RD
        .iter()
        .enumerate()
        .map(|(i, color)| format!(r#"<stop offset="{:.4}" stop-color="{}"/>"#, i as f64 / last, color))
        .collect();
    format!(
        r#"<defs><linearGradient id="ylord" x1="0" y1="1" x2="0" y2="0">{}</linearGradient></defs>"#,
        stops
    )
}

/// Vertical bar from 0 (bottom) to `vmax` (top) with six ticks.
fn colorbar(out: &mut String, x: f64, top: f64, height: f64, vmax: f64) {
    out.push_str(&format!(
        r##"<rect x="{:.2}" y="{:.2}" width="{}" height="{:.2}" fill="url(#ylord)" stroke="#999999" stroke-width="0.5"/>"##,
        x, top, COLORBAR_W, height
    ));
    for i in 0..=5 {
        let fraction = i as f64 / 5.0;
        let ty = top + height * (1.0 - fraction);
        out.push_str(&format!(
            r##"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="#333333" stroke-width="0.5"/>"##,
            x + COLORBAR_W,
            ty,
            x + COLORBAR_W + 3.0,
            ty
        ));
        out.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" font-size="{}">{}</text>"#,
            x + COLORBAR_W + 5.0,
            ty + LABEL_FONT * 0.35,
            LABEL_FONT,
            format_pct(vmax * fraction, 1)
        ));
    }
}

pub(crate) fn escape_xml_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

pub(crate) fn escape_xml_attr(s: &str) -> String {
    escape_xml_text(s).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use osr_analysis::{FileType, RowKey};

    fn matrix(rows: usize, cols: usize) -> Matrix<f64> {
        let keys = (0..rows)
            .map(|i| RowKey::new(format!("test_{i:02}"), FileType::Rb))
            .collect();
        let columns = (0..cols)
            .map(|i| ColumnKey::new("9.0.0", format!("2.{i}.0"), None))
            .collect();
        let mut m = Matrix::empty(keys, columns);
        for r in 0..rows {
            m.set(r, 1.min(cols - 1), Some(0.02));
        }
        m
    }

    #[test]
    fn classes_follow_thresholds() {
        assert_eq!(classify(None, 0.001), CellClass::Missing);
        assert_eq!(classify(Some(0.0), 0.001), CellClass::Zero);
        assert_eq!(classify(Some(-0.001), 0.001), CellClass::BelowThreshold(-0.001));
        assert_eq!(classify(Some(0.0011), 0.001), CellClass::Heat(0.0011));
        assert_eq!(classify(Some(f64::NAN), 0.001), CellClass::Missing);
    }

    #[test]
    fn labels_and_fills() {
        assert_eq!(CellClass::Heat(-0.0523).label().as_deref(), Some("-5.23%"));
        assert_eq!(CellClass::BelowThreshold(0.00042).label().as_deref(), Some("0.042%"));
        assert_eq!(CellClass::Zero.fill(0.5), Rgb::ZERO);
        assert_eq!(CellClass::Heat(-0.6).fill(0.5), YL_OR_RD[8]);
        assert!(CellClass::BelowThreshold(0.0001).italic());
    }

    #[test]
    fn names_and_heights() {
        assert_eq!(figure_name(false, 0.01, 0.001), "site_kbtu_pct_change.png");
        assert_eq!(
            figure_name(true, 0.0005, 0.0001),
            "site_kbtu_pct_change_row0.0005_display0.0001.png"
        );
        assert!((figure_height_in(16.0, 30, 10) - 16.0).abs() < 1e-12);
        assert!(repeat_labels_on_top(16.0, 30, 10));
        assert!(!repeat_labels_on_top(16.0, 5, 10));
        assert_eq!(HeatmapOptions::default().width_px(), 2400);
    }

    #[test]
    fn figure_contains_title_panels_and_footer() {
        let svg = render_heatmap_svg(&matrix(85, 4), &HeatmapOptions::default()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(TITLE));
        assert!(svg.contains("more than 1.00% change"));
        assert!(svg.contains("test_84.rb"));
        assert_eq!(svg.matches(r#"fill="url(#ylord)""#).count(), 3);
        assert!(svg.contains("50.0%"));
    }

    #[test]
    fn chunk_svgs_title_only_first() {
        let svgs = render_chunk_svgs(&matrix(45, 3), &HeatmapOptions::default()).unwrap();
        assert_eq!(svgs.len(), 2);
        assert!(svgs[0].contains(TITLE));
        assert!(!svgs[1].contains(TITLE));
    }

    #[test]
    fn empty_matrix_is_rejected() {
        let empty = Matrix::<f64>::empty(Vec::new(), Vec::new());
        assert!(matches!(
            render_heatmap_svg(&empty, &HeatmapOptions::default()),
            Err(RenderError::EmptyHeatmap)
        ));
    }

    #[test]
    fn labels_are_escaped() {
        assert_eq!(escape_xml_attr(r#"a<b>&"c""#), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
