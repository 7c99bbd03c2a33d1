//! ---
//! osr_section: "07-testing"
//! osr_subsection: "integration-tests"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "End-to-end tests across the regression analysis crates."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use osr_analysis::{
    analyze_site_energy, build_file_matrix, locate_result_files, openstudio_versions,
    status_matrix, TagSelection, TestStatus,
};
use osr_compat::{
    load_cache, parse_compatibility_html, save_cache, UnknownVersionPolicy, VersionResolver,
};
use osr_render::{render_heatmap_svg, HeatmapOptions};
use serde_json::json;
use tempfile::tempdir;

const WIKI: &str = r#"
<table>
<thead><tr><th>OpenStudio</th><th>Released</th><th>E+</th></tr></thead>
<tbody>
<tr><td>v3.7.0</td><td>2023-11-17</td><td>23.2.0</td></tr>
<tr><td>v3.6.1</td><td>2023-06-23</td><td>23.1.0</td></tr>
<tr><td>v2.0.4</td><td></td><td>8.6.0</td></tr>
</tbody>
</table>
"#;

fn write_result(dir: &Path, name: &str, body: serde_json::Value) {
    fs::write(dir.join(name), body.to_string()).unwrap();
}

fn success(site: f64) -> serde_json::Value {
    json!({
        "completed_status": "Success",
        "steps": [{
            "measure_dir_name": "openstudio_results",
            "result": {
                "measure_name": "openstudio_results",
                "step_values": [{"name": "total_site_energy", "value": site, "units": "kBtu"}]
            }
        }]
    })
}

#[test]
fn wiki_cache_results_and_heatmap() {
    let dir = tempdir().unwrap();
    let cache = dir.path().join("cache").join("compat.csv");
    save_cache(&parse_compatibility_html(WIKI).unwrap(), &cache).unwrap();
    let compat = load_cache(&cache).unwrap();
    assert_eq!(compat.energyplus_for("3.6.1"), Some("23.1.0"));

    let tests = dir.path().join("test");
    fs::create_dir_all(&tests).unwrap();
    // The legacy release reports Fail even when EnergyPlus completed.
    write_result(
        &tests,
        "airterminal.rb_2.0.4_out.osw",
        json!({
            "completed_status": "Fail",
            "eplusout_err": ["   ************* EnergyPlus Completed Successfully-- 0 Warning"],
            "steps": [{
                "measure_dir_name": "openstudio_results",
                "result": {
                    "step_values": [{"name": "total_site_energy", "value": 200.0, "units": "kBtu"}]
                }
            }]
        }),
    );
    write_result(&tests, "airterminal.rb_3.6.1_out.osw", success(210.0));
    write_result(&tests, "airterminal.rb_3.7.0_out.osw", success(210.0));
    write_result(&tests, "airterminal.rb_3.8.0_out.osw", success(231.0));

    let files = locate_result_files(&tests, TagSelection::Untagged).unwrap();
    let versions = openstudio_versions(&files);

    let mut strict = VersionResolver::new(&compat, IndexMap::new(), UnknownVersionPolicy::Error);
    assert!(strict.resolve_all(versions.iter().map(String::as_str)).is_err());

    let mut overrides = IndexMap::new();
    overrides.insert("3.8.0".to_owned(), "24.1.0".to_owned());
    let mut resolver = VersionResolver::new(&compat, overrides, UnknownVersionPolicy::Error);
    let mapping = resolver
        .resolve_all(versions.iter().map(String::as_str))
        .unwrap();
    assert_eq!(mapping["2.0.4"], "8.6.0");
    assert_eq!(mapping["3.8.0"], "24.1.0");

    let matrix = build_file_matrix(&files, &mapping).unwrap();
    let status = status_matrix(&matrix).unwrap();
    assert_eq!(status.get(0, 0), Some(&TestStatus::Success));

    let report = analyze_site_energy(&matrix, 0.01).unwrap();
    let changes: Vec<Option<f64>> = report.pct_change.row_values(0).to_vec();
    assert_eq!(changes[0], None);
    assert!((changes[1].unwrap() - 0.05).abs() < 1e-12);
    assert_eq!(changes[2], Some(0.0));
    assert!((changes[3].unwrap() - 0.1).abs() < 1e-12);
    assert_eq!(report.filtered.n_rows(), 1);

    let svg = render_heatmap_svg(&report.filtered, &HeatmapOptions::default()).unwrap();
    assert!(svg.contains("10.00%"));
    assert!(svg.contains("5.00%"));
    assert!(svg.contains("airterminal.rb"));
}
