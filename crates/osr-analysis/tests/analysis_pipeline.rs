//! ---
//! osr_section: "04-result-analysis"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Parsing and aggregation of regression test results."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use osr_analysis::{
    analyze_site_energy, build_file_matrix, locate_result_files, status_matrix,
    export::SheetExporter,
    sheets::{ImplementedSheet, StatusSheet},
    FileType, TagSelection, TestStatus,
};
use serde_json::json;
use tempfile::tempdir;

fn write_osw(dir: &Path, name: &str, status: &str, site: f64) {
    let data = json!({
        "completed_status": status,
        "steps": [{
            "measure_dir_name": "openstudio_results",
            "result": {
                "measure_name": "openstudio_results",
                "step_values": [{"name": "total_site_energy", "value": site, "units": "kBtu"}]
            }
        }]
    });
    fs::write(dir.join(name), data.to_string()).unwrap();
}

fn versions() -> BTreeMap<String, String> {
    [("3.5.0", "22.2.0"), ("3.6.0", "23.1.0"), ("3.7.0", "23.2.0")]
        .iter()
        .map(|(os, ep)| (os.to_string(), ep.to_string()))
        .collect()
}

#[test]
fn locate_parse_and_aggregate() {
    let dir = tempdir().unwrap();
    write_osw(dir.path(), "chillers.rb_3.5.0_out.osw", "Success", 1000.0);
    write_osw(dir.path(), "chillers.rb_3.6.0_out.osw", "Success", 1100.0);
    write_osw(dir.path(), "chillers.rb_3.7.0_out.osw", "Success", 1100.0);
    write_osw(dir.path(), "boilers.osm_3.5.0_out.osw", "Success", 500.0);
    write_osw(dir.path(), "boilers.osm_3.6.0_out.osw", "Fail", 0.0);
    write_osw(dir.path(), "boilers.osm_3.7.0_out.osw", "Success", 500.2);
    write_osw(dir.path(), "chillers.rb_3.7.0_out_Linux_1.osw", "Success", 1.0);
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let files = locate_result_files(dir.path(), TagSelection::Untagged).unwrap();
    assert_eq!(files.len(), 6);
    let again = locate_result_files(dir.path(), TagSelection::Untagged).unwrap();
    assert_eq!(files, again);

    let matrix = build_file_matrix(&files, &versions()).unwrap();
    let columns: Vec<&str> = matrix.columns().iter().map(|c| c.energyplus.as_str()).collect();
    assert_eq!(columns, vec!["22.2.0", "23.1.0", "23.2.0"]);

    let report = analyze_site_energy(&matrix, 0.01).unwrap();
    // boilers: the run after the failure is compared with the one before it.
    assert_eq!(report.site_kbtu.get(0, 1), None);
    assert_eq!(report.pct_change.get(0, 1), None);
    assert!((report.pct_change.get(0, 2).copied().unwrap() - 0.0004).abs() < 1e-9);
    let chillers = &report.pct_change;
    assert!((chillers.get(1, 1).copied().unwrap() - 0.1).abs() < 1e-12);
    assert_eq!(chillers.get(1, 2), Some(&0.0));
    let kept: Vec<&str> = report.filtered.rows().iter().map(|r| r.test.as_str()).collect();
    assert_eq!(kept, vec!["chillers"]);

    let status = status_matrix(&matrix).unwrap();
    let sheet = StatusSheet::build(&status, &BTreeMap::new());
    assert_eq!(sheet.rows[0].key.file_type, FileType::Osm);
    assert_eq!(sheet.rows[0].cells[1], TestStatus::Fail);

    let implemented = ImplementedSheet::build(&matrix, &sheet, &BTreeMap::new(), false);
    let out = dir.path().join("reports");
    let written = SheetExporter {
        status: &sheet,
        implemented: &implemented,
        site_kbtu: &report.site_kbtu,
        pct_change: &report.pct_change,
    }
    .export_all(&out)
    .unwrap();
    assert_eq!(written.len(), 4);
    assert!(written.iter().all(|p| p.exists()));
}

#[test]
fn tagged_selection_keeps_only_reruns() {
    let dir = tempdir().unwrap();
    write_osw(dir.path(), "chillers.rb_3.7.0_out.osw", "Success", 1.0);
    write_osw(dir.path(), "chillers.rb_3.7.0_out_Linux_1.osw", "Success", 1.0);
    write_osw(dir.path(), "chillers.rb_3.7.0_out_Linux_2.osw", "Success", 1.0);

    let tagged = locate_result_files(dir.path(), TagSelection::Tagged).unwrap();
    assert_eq!(tagged.len(), 2);
    let all = locate_result_files(dir.path(), TagSelection::All).unwrap();
    let matrix = build_file_matrix(&all, &versions()).unwrap();
    let tags: Vec<Option<&str>> = matrix.columns().iter().map(|c| c.tag.as_deref()).collect();
    assert_eq!(tags, vec![None, Some("Linux_1"), Some("Linux_2")]);
}

#[test]
fn status_ignores_missing_site_energy() {
    let dir = tempdir().unwrap();
    let data = json!({
        "completed_status": "Success",
        "steps": [{"result": {"measure_name": "openstudio_results", "step_values": []}}]
    });
    fs::write(dir.path().join("lights.rb_3.7.0_out.osw"), data.to_string()).unwrap();
    write_osw(dir.path(), "lights.rb_3.6.0_out.osw", "Fail", 0.0);

    let files = locate_result_files(dir.path(), TagSelection::Untagged).unwrap();
    let matrix = build_file_matrix(&files, &versions()).unwrap();
    let status = status_matrix(&matrix).unwrap();
    assert_eq!(
        status.row_values(0),
        &[Some(TestStatus::Fail), Some(TestStatus::Success)]
    );
}

#[test]
fn malformed_result_aborts() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("broken.rb_3.7.0_out.osw"), "{not json").unwrap();
    let files = locate_result_files(dir.path(), TagSelection::Untagged).unwrap();
    let matrix = build_file_matrix(&files, &versions()).unwrap();
    let err = analyze_site_energy(&matrix, 0.01).unwrap_err();
    assert!(matches!(err, osr_analysis::AnalysisError::Json { .. }));
}
