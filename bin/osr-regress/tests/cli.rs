//! ---
//! osr_section: "06-command-line"
//! osr_subsection: "binary"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Command line front end for regression result analysis."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::json;
use tempfile::{tempdir, TempDir};

const CACHE: &str = "OpenStudio,E+,Released,Has_Docker\n\
3.5.0,22.2.0,2022-11-10,true\n\
3.6.0,23.1.0,2023-05-12,true\n\
3.7.0,23.2.0,2023-11-10,true\n";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("test")).unwrap();
        fs::write(dir.path().join("compat.csv"), CACHE).unwrap();
        let config = format!(
            "[paths]\ntest_dir = \"{}\"\nmodel_dir = \"{}\"\noutput_dir = \"{}\"\n\n[compat]\ncache_path = \"{}\"\noffline = true\n",
            dir.path().join("test").display(),
            dir.path().join("model").display(),
            dir.path().join("out").display(),
            dir.path().join("compat.csv").display(),
        );
        fs::write(dir.path().join("osr-regress.toml"), config).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn out(&self, name: &str) -> PathBuf {
        self.path().join("out").join(name)
    }

    fn result(&self, name: &str, status: &str, site: f64) {
        let data = json!({
            "completed_status": status,
            "steps": [{
                "measure_dir_name": "openstudio_results",
                "result": {
                    "measure_name": "openstudio_results",
                    "step_values": [
                        {"name": "total_site_energy", "value": site, "units": "kBtu"},
                        {"name": "end_use_electricity_heating", "value": 12.5, "units": "kBtu"},
                        {"name": "end_use_natural_gas_heating", "value": 0.0, "units": "kBtu"}
                    ]
                }
            }]
        });
        fs::write(self.path().join("test").join(name), data.to_string()).unwrap();
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("osr-regress").unwrap();
        cmd.env_remove("OSR_CONFIG")
            .arg("--config")
            .arg(self.path().join("osr-regress.toml"));
        cmd
    }

    fn populated() -> Self {
        let ws = Self::new();
        ws.result("chillers.rb_3.5.0_out.osw", "Success", 1000.0);
        ws.result("chillers.rb_3.6.0_out.osw", "Success", 1100.0);
        ws.result("chillers.rb_3.7.0_out.osw", "Success", 1100.0);
        ws.result("boilers.osm_3.5.0_out.osw", "Success", 500.0);
        ws.result("boilers.osm_3.6.0_out.osw", "Fail", 0.0);
        ws.result("boilers.osm_3.7.0_out.osw", "Success", 500.0);
        ws
    }
}

#[test]
fn version_flag_prints_banner() {
    let output = Command::cargo_bin("osr-regress")
        .unwrap()
        .arg("-V")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("osr-regress v"));
}

#[test]
fn heatmap_writes_image_and_html() {
    let ws = Workspace::populated();
    let output = ws.cmd().args(["heatmap", "--html", "-f"]).output().unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let png = ws.out("site_kbtu_pct_change_row0.01_display0.001.png");
    assert!(png.exists());
    assert!(ws.out("site_kbtu_pct_change_row0.01_display0.001.svg").exists());
    let html = fs::read_to_string(ws.out("site_kbtu_pct_change_row0.01_display0.001.html")).unwrap();
    assert!(html.contains("chillers.rb"));
    assert!(!html.contains("boilers.osm"));
}

#[test]
fn heatmap_without_changes_skips_image() {
    let ws = Workspace::new();
    ws.result("chillers.rb_3.6.0_out.osw", "Success", 1000.0);
    ws.result("chillers.rb_3.7.0_out.osw", "Success", 1000.0);
    ws.cmd().arg("heatmap").assert().success();
    assert!(!ws.out("site_kbtu_pct_change.png").exists());
}

#[test]
fn upload_exports_all_sheets() {
    let ws = Workspace::populated();
    ws.cmd().arg("upload").assert().success();
    for name in [
        "test_status.csv",
        "tests_implemented.csv",
        "site_kbtu.csv",
        "site_kbtu_pct_change.csv",
    ] {
        assert!(ws.out(name).exists(), "{name} missing");
    }
    let status = fs::read_to_string(ws.out("test_status.csv")).unwrap();
    assert!(status.starts_with("E+,"));
    assert!(status.contains("Fail"));
}

#[test]
fn test_status_lists_failing_tests_only() {
    let ws = Workspace::populated();
    ws.cmd().arg("test-status").assert().success();
    let html = fs::read_to_string(ws.out("test_status.html")).unwrap();
    assert!(html.contains("boilers.osm"));
    assert!(!html.contains("chillers.rb"));

    ws.cmd().args(["test-status", "--entire-table"]).assert().success();
    let html = fs::read_to_string(ws.out("test_status.html")).unwrap();
    assert!(html.contains("chillers.rb"));
}

#[test]
fn unknown_version_fails_by_default() {
    let ws = Workspace::populated();
    ws.result("chillers.rb_3.8.0_out.osw", "Success", 1000.0);
    let output = ws.cmd().arg("heatmap").output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("3.8.0"));

    ws.cmd()
        .args(["--unknown-versions", "latest", "heatmap"])
        .assert()
        .success();
}

#[test]
fn compat_show_reads_the_cache_offline() {
    let ws = Workspace::new();
    let output = ws.cmd().args(["compat", "show"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("3.7.0"));
    assert!(stdout.contains("23.2.0"));

    ws.cmd().args(["compat", "refresh"]).assert().failure();
}

#[test]
fn stability_clean_deletes_tagged_files() {
    let ws = Workspace::populated();
    ws.result("chillers.rb_3.7.0_out_Ubuntu_1.osw", "Success", 1100.0);
    ws.result("chillers.rb_3.7.0_out_Darwin_1.osw", "Success", 1100.0);
    ws.cmd()
        .args(["test-stability", "clean", "--contains", "Ubuntu"])
        .assert()
        .success();
    let test = ws.path().join("test");
    assert!(!test.join("chillers.rb_3.7.0_out_Ubuntu_1.osw").exists());
    assert!(test.join("chillers.rb_3.7.0_out_Darwin_1.osw").exists());
    assert!(test.join("chillers.rb_3.7.0_out.osw").exists());
}

#[test]
fn end_use_prints_pivot() {
    let ws = Workspace::populated();
    let output = ws
        .cmd()
        .arg("end-use")
        .arg(ws.path().join("test").join("chillers.rb_3.7.0_out.osw"))
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("End Use,"));
    assert!(stdout.contains("Heating"));
}
