// Command-line contract: exit codes and which files a run leaves behind

use ap_coverage::cli::{SimulateArgs, run_simulate};
use ap_coverage::constants::{COVERAGE_GRID_FILE, REPORT_JSON};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn simulate_args(ap_file: &Path, output_dir: &Path) -> SimulateArgs {
    SimulateArgs {
        ap_file: ap_file.to_path_buf(),
        scene: None,
        output_dir: output_dir.to_path_buf(),
        config: None,
        resolution: Some(1.0),
        engine: None,
    }
}

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ap-coverage"))
}

fn write_ap_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn zero_valid_rows_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let ap_file = write_ap_file(dir.path(), "bad.csv", "AP_01,abc,1,2\nonly,two\n");
    let out = dir.path().join("out");

    let err = run_simulate(simulate_args(&ap_file, &out)).unwrap_err();
    assert!(err.to_string().contains("no valid AP records"));
    assert!(!out.exists());
}

#[test]
fn binary_exits_one_on_zero_valid_rows() {
    let dir = tempfile::tempdir().unwrap();
    let ap_file = write_ap_file(dir.path(), "bad.csv", "# header only\n,1,2,3\n");
    let out = dir.path().join("out");

    let status = binary()
        .arg("simulate")
        .arg("--ap-file")
        .arg(&ap_file)
        .arg("--output-dir")
        .arg(&out)
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(1));
    assert!(!out.exists());

    let status = binary().arg("validate").arg("--ap-file").arg(&ap_file).status().unwrap();
    assert_eq!(status.code(), Some(1));
}

#[test]
fn binary_exits_one_on_missing_file_and_bad_engine() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");

    let status = binary()
        .args(["simulate", "--ap-file"])
        .arg(dir.path().join("missing.csv"))
        .arg("--output-dir")
        .arg(&out)
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(1));

    let ap_file = write_ap_file(dir.path(), "aps.csv", "AP_01,5,10,3\n");
    let status = binary()
        .args(["simulate", "--engine", "sionna", "--ap-file"])
        .arg(&ap_file)
        .arg("--output-dir")
        .arg(&out)
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(1));
    assert!(!out.exists());
}

#[test]
fn oversized_grid_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let ap_file = write_ap_file(dir.path(), "aps.csv", "AP_01,0,0,3\nAP_02,1e300,1e300,3\n");

    let out = dir.path().join("out");
    let err = run_simulate(simulate_args(&ap_file, &out)).unwrap_err();
    assert!(err.to_string().contains("exceeds the limit"));
    assert!(!out.exists());
}

#[test]
fn binary_simulate_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let ap_file = write_ap_file(dir.path(), "aps.csv", "AP_01,5,10,3\nAP_02,15,20,3\n");
    let out = dir.path().join("out");

    let status = binary()
        .args(["simulate", "--resolution", "1", "--ap-file"])
        .arg(&ap_file)
        .arg("--output-dir")
        .arg(&out)
        .status()
        .unwrap();
    assert!(status.success());
    assert!(out.join(COVERAGE_GRID_FILE).is_file());
    assert!(out.join(REPORT_JSON).is_file());
}
