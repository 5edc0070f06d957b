use std::fs;
use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_afdb_eval"))
}

fn fixture_dir(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

#[test]
fn batch_prints_bracketed_sections() {
    let output = cli()
        .args([
            "batch",
            "--ground-truth-root",
            &fixture_dir("records"),
            "--predictions-dir",
            &fixture_dir("predictions"),
        ])
        .output()
        .expect("failed to run afdb_eval batch");
    assert!(
        output.status.success(),
        "CLI exited with {:?}",
        output.status.code()
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    assert_eq!(
        stdout,
        "=====00001ECG_traceback.csv=====\n\
         1 1\n\
         1 1\n\
         (0.5, 0.5)\n\
         ==============\n\
         =====00002ECG_traceback.csv=====\n\
         2 1\n\
         0 5\n\
         (0.6666666666666666, 1.0)\n\
         ==============\n"
    );
}

#[test]
fn batch_json_format() {
    let output = cli()
        .args([
            "batch",
            "--ground-truth-root",
            &fixture_dir("records"),
            "--predictions-dir",
            &fixture_dir("predictions"),
            "--format",
            "json",
        ])
        .output()
        .expect("failed to run afdb_eval batch --format json");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    let records: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("JSON line"))
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["record_id"], "00002");
    assert_eq!(records[1]["tally"]["tn"], 5);
    assert_eq!(records[1]["outcome"]["specificity"], 1.0);
}

#[test]
fn batch_aborts_on_missing_recording() {
    let output = cli()
        .args([
            "batch",
            "--ground-truth-root",
            &fixture_dir("records"),
            "--predictions-dir",
            &fixture_dir("predictions_mixed"),
        ])
        .output()
        .expect("failed to run afdb_eval batch");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(
        stderr.contains("00009"),
        "expected missing record in stderr, got {stderr}"
    );
}

#[test]
fn batch_keep_going_exits_two() {
    let output = cli()
        .args([
            "batch",
            "--ground-truth-root",
            &fixture_dir("records"),
            "--predictions-dir",
            &fixture_dir("predictions_mixed"),
            "--keep-going",
        ])
        .output()
        .expect("failed to run afdb_eval batch --keep-going");
    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    assert!(stdout.contains("=====00001ECG_traceback.csv====="));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(stderr.contains("00009ECG_traceback.csv"));
}

#[test]
fn single_derives_record_from_file_name() {
    let predictions = PathBuf::from(fixture_dir("predictions")).join("00002ECG_traceback.csv");
    let output = cli()
        .args(["single", "--ground-truth-root", &fixture_dir("records")])
        .arg("--predictions")
        .arg(&predictions)
        .output()
        .expect("failed to run afdb_eval single");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    assert!(stdout.contains("(0.6666666666666666, 1.0)"));
}

#[test]
fn single_standard_convention() {
    let predictions = PathBuf::from(fixture_dir("predictions")).join("00002ECG_traceback.csv");
    let output = cli()
        .args([
            "single",
            "--record",
            "00002",
            "--ground-truth-root",
            &fixture_dir("records"),
            "--convention",
            "standard",
        ])
        .arg("--predictions")
        .arg(&predictions)
        .output()
        .expect("failed to run afdb_eval single --convention standard");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    // The predicted-but-unannotated window moves from FN to FP
    assert!(stdout.contains("\n2 0\n1 5\n(1.0, 0.8333333333333334)\n"));
}

#[test]
fn degenerate_overlap_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let labels = "state\n".to_string() + &"1\n".repeat(2048);
    fs::write(dir.path().join("00001_traceback.csv"), labels).unwrap();

    let output = cli()
        .args(["batch", "--ground-truth-root", &fixture_dir("records")])
        .arg("--predictions-dir")
        .arg(dir.path())
        .output()
        .expect("failed to run afdb_eval batch");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(
        stderr.contains("DegenerateOverlap"),
        "expected overlap error, got {stderr}"
    );
}

#[test]
fn config_file_supplies_paths() {
    let dir = tempfile::tempdir().unwrap();
    let config = serde_json::json!({
        "paths": {
            "ground_truth_root": fixture_dir("records"),
            "predictions_dir": fixture_dir("predictions"),
            "filename_marker": "posterior"
        }
    });
    let config_path = dir.path().join("afdb_eval.json");
    fs::write(&config_path, config.to_string()).unwrap();

    let output = cli()
        .arg("list")
        .arg("--config")
        .arg(&config_path)
        .output()
        .expect("failed to run afdb_eval list");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    assert_eq!(stdout, "00001ECG_posterior.csv -> 00001\n");
}

#[test]
fn invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("bad.json");
    fs::write(&config_path, r#"{ "evaluation": { "window_cap": 0 } }"#).unwrap();

    let output = cli()
        .arg("list")
        .arg("--config")
        .arg(&config_path)
        .output()
        .expect("failed to run afdb_eval list");
    assert_eq!(output.status.code(), Some(1));
}
