//! ---
//! osr_section: "05-report-rendering"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Heatmap and table rendering for regression reports."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
//! Standalone HTML tables: the coloured percent change table and the
//! per-version test status table.

use osr_analysis::sheets::StatusSheet;
use osr_analysis::{ColumnKey, Matrix, TestStatus};

use crate::colormap::Rgb;
use crate::heatmap::{classify, escape_xml_attr, escape_xml_text, HeatmapOptions, TITLE};

const STYLE: &str = "body{font-family:sans-serif;font-size:12px}\
table{border-collapse:collapse}\
td,th{border:1px solid #ddd;padding:2px 6px;text-align:center}\
th.row{text-align:left;font-weight:normal}\
td.below{font-style:italic}";

fn status_color(status: TestStatus) -> Rgb {
    match status {
        TestStatus::Success => Rgb(0xc6, 0xef, 0xce),
        TestStatus::Fail => Rgb(0xff, 0xc7, 0xce),
        TestStatus::Missing => Rgb(0xff, 0xeb, 0x9c),
        TestStatus::NotApplicable => Rgb(0xd9, 0xd9, 0xd9),
    }
}

fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{t}</title><style>{STYLE}</style></head>\n<body><h2>{t}</h2>\n{body}</body></html>\n",
        t = escape_xml_text(title),
    )
}

fn header_rows(columns: &[ColumnKey], leading: usize) -> String {
    let pad = "<th></th>".repeat(leading);
    let mut out = String::from("<thead>");
    let lines: [(&str, fn(&ColumnKey) -> &str); 3] = [
        ("E+", |c| c.energyplus.as_str()),
        ("OS", |c| c.openstudio.as_str()),
        ("Tag", |c| c.tag.as_deref().unwrap_or("")),
    ];
    for (label, value) in lines {
        out.push_str(&format!("<tr><th class=\"row\">{label}</th>{pad}"));
        for column in columns {
            out.push_str(&format!("<th>{}</th>", escape_xml_text(value(column))));
        }
        out.push_str("</tr>");
    }
    out.push_str("</thead>\n");
    out
}

/// Percent change table with the same cell classes as the heatmap image.
pub fn heatmap_table_html(values: &Matrix<f64>, opts: &HeatmapOptions) -> String {
    let mut table = String::from("<table>\n");
    table.push_str(&header_rows(values.columns(), 0));
    table.push_str("<tbody>\n");
    for (key, cells) in values.iter_rows() {
        table.push_str(&format!(
            "<tr><th class=\"row\">{}</th>",
            escape_xml_text(&key.to_string())
        ));
        for value in cells {
            let class = classify(*value, opts.display_threshold);
            let fill = class.fill(opts.vmax);
            let css = if class.italic() { " class=\"below\"" } else { "" };
            table.push_str(&format!(
                "<td{css} style=\"{}\">{}</td>",
                escape_xml_attr(&format!("background:{};color:{}", fill, fill.text_color())),
                class.label().unwrap_or_default()
            ));
        }
        table.push_str("</tr>\n");
    }
    table.push_str("</tbody></table>\n");
    document(TITLE, &table)
}

/// Status per test and version. Without `entire_table` only tests with at
/// least one failing or missing result are listed.
pub fn status_table_html(sheet: &StatusSheet, entire_table: bool) -> String {
    let rows: Vec<_> = if entire_table {
        sheet.rows.iter().collect()
    } else {
        sheet.failing_or_missing().collect()
    };

    let mut table = String::from("<table>\n");
    table.push_str(&header_rows(&sheet.columns, 3));
    table.push_str("<tbody>\n<tr><th class=\"row\">Test</th><th>n_fail</th><th>n_missing</th><th>n_fail+missing</th>");
    table.push_str(&"<th></th>".repeat(sheet.columns.len()));
    table.push_str("</tr>\n");
    for row in rows {
        table.push_str(&format!(
            "<tr><th class=\"row\">{}</th><td>{}</td><td>{}</td><td>{}</td>",
            escape_xml_text(&row.key.to_string()),
            row.n_fail,
            row.n_missing,
            row.n_fail_missing
        ));
        for status in &row.cells {
            table.push_str(&format!(
                "<td style=\"background:{}\">{}</td>",
                status_color(*status),
                status.as_str()
            ));
        }
        table.push_str("</tr>\n");
    }
    table.push_str("</tbody></table>\n");
    document("Test status", &table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use osr_analysis::sheets::StatusRow;
    use osr_analysis::{FileType, RowKey};

    fn sheet() -> StatusSheet {
        let columns = vec![
            ColumnKey::new("22.2.0", "3.5.0", None),
            ColumnKey::new("23.1.0", "3.6.0", Some("Linux_1".into())),
        ];
        let row = |test: &str, cells: Vec<TestStatus>, n_fail, n_missing| StatusRow {
            key: RowKey::new(test, FileType::Rb),
            cells,
            n_fail,
            n_missing,
            n_fail_missing: n_fail + n_missing,
        };
        StatusSheet {
            columns,
            rows: vec![
                row("boilers", vec![TestStatus::Fail, TestStatus::Success], 1, 0),
                row("chillers", vec![TestStatus::Success, TestStatus::Success], 0, 0),
            ],
        }
    }

    #[test]
    fn status_table_filters_clean_tests() {
        let html = status_table_html(&sheet(), false);
        assert!(html.contains("boilers.rb"));
        assert!(!html.contains("chillers.rb"));
        assert!(html.contains("Linux_1"));
        assert!(html.contains(">Fail</td>"));

        let full = status_table_html(&sheet(), true);
        assert!(full.contains("chillers.rb"));
    }

    #[test]
    fn heatmap_table_uses_cell_classes() {
        let mut values = Matrix::empty(
            vec![RowKey::new("boilers", FileType::Osm)],
            vec![
                ColumnKey::new("22.2.0", "3.5.0", None),
                ColumnKey::new("23.1.0", "3.6.0", None),
                ColumnKey::new("23.2.0", "3.7.0", None),
            ],
        );
        values.set(0, 1, Some(0.0));
        values.set(0, 2, Some(0.0004));
        let html = heatmap_table_html(&values, &HeatmapOptions::default());
        assert!(html.contains("background:#f0f7d9"));
        assert!(html.contains("class=\"below\""));
        assert!(html.contains("0.040%"));
        assert!(html.contains("background:#ffffff"));
    }
}
