use assert_cmd::Command;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use tempfile::{TempDir, tempdir};

fn write_layout(dir: &TempDir) -> PathBuf {
    let csv = "id,page,x,y,width,height\n\
               page-1-span-0,1,0,0,200,40\n\
               page-1-span-1,1,200,0,200,40\n";
    let path = dir.path().join("layout.csv");
    fs::write(&path, csv).unwrap();
    path
}

fn stdout_json(out: &std::process::Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&out.stdout);
    let line = stdout
        .lines()
        .find(|l| l.trim_start().starts_with('{'))
        .unwrap_or("")
        .to_string();
    assert!(!line.is_empty(), "no JSON line found; stdout was: {stdout}");
    serde_json::from_str(&line).expect("valid JSON")
}

/// Validate the JSON schema for a replay run.
#[rstest]
fn replay_json_schema() {
    let dir = tempdir().unwrap();
    let layout = write_layout(&dir);
    let trace = dir.path().join("trace.csv");
    let mut csv = String::from("timestamp_ms,x,y\n");
    for i in 0..12 {
        csv.push_str(&format!("{},100,20\n", i * 30));
    }
    fs::write(&trace, csv).unwrap();

    let mut cmd = Command::cargo_bin("gaze_cli").unwrap();
    cmd.arg("--json")
        .arg("--log-level")
        .arg("error")
        .arg("replay")
        .arg("--samples")
        .arg(&trace)
        .arg("--layout")
        .arg(&layout);

    let out = cmd.assert().success().get_output().clone();
    let v = stdout_json(&out);

    assert_eq!(v["timestamp"].as_f64(), Some(330.0));
    assert_eq!(v["started_at_ms"].as_f64(), Some(0.0));
    assert_eq!(v["verdict"], "partial");
    assert_eq!(v["label"], "Partial Read");
    assert_eq!(v["samples"], 12);
    assert_eq!(v["read_spans"], 1);
    assert_eq!(v["total_spans"], 2);
    assert_eq!(v["coverage_percent"].as_f64(), Some(50.0));
    assert_eq!(v["total_read_time_ms"].as_f64(), Some(330.0));
    assert_eq!(v["pages_read"], 1);
    assert_eq!(v["total_pages"], 1);
    assert!(v["drift"].as_array().is_some_and(|d| d.is_empty()));

    let span = &v["spans"]["page-1-span-0"];
    assert_eq!(span["read"], true);
    assert_eq!(span["fixations"], 1);
    assert_eq!(span["dwell_ms"].as_f64(), Some(330.0));
}

/// Stdin lines are scored until EOF.
#[rstest]
fn stream_reads_stdin_until_eof() {
    let dir = tempdir().unwrap();
    let layout = write_layout(&dir);

    let mut cmd = Command::cargo_bin("gaze_cli").unwrap();
    cmd.arg("--json")
        .arg("stream")
        .arg("--layout")
        .arg(&layout)
        .arg("--tick-ms")
        .arg("20")
        .write_stdin("timestamp_ms,x,y\n0,100,20\n33,101,21\nbad line\n66,99,19\n");

    let out = cmd.assert().success().get_output().clone();
    let v = stdout_json(&out);
    assert_eq!(v["samples"], 3);
    assert_eq!(v["total_spans"], 2);
    assert!(v["verdict"].is_string());
}

#[rstest]
fn errors_are_structured_in_json_mode() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("bad.toml");
    fs::write(&cfg, "[drift]\noff_screen_ratio = 1.5\n").unwrap();

    let mut cmd = Command::cargo_bin("gaze_cli").unwrap();
    cmd.arg("--json").arg("--config").arg(&cfg).arg("self-check");

    let out = cmd.assert().code(3).get_output().clone();
    let stderr = String::from_utf8_lossy(&out.stderr);
    let line = stderr
        .lines()
        .find(|l| l.contains("\"reason\""))
        .unwrap_or("")
        .to_string();
    let v: serde_json::Value = serde_json::from_str(&line).expect("valid JSON error");
    assert_eq!(v["reason"], "InvalidConfig");
    assert!(v["message"].as_str().is_some_and(|m| m.contains("off_screen_ratio")));
}

#[rstest]
fn calibrate_json_schema() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("validation.csv");
    fs::write(&csv, "target_x,target_y,gaze_x,gaze_y\n640,400,640,550\n").unwrap();

    let mut cmd = Command::cargo_bin("gaze_cli").unwrap();
    cmd.arg("--json").arg("calibrate").arg("--validation").arg(&csv);

    let out = cmd.assert().success().get_output().clone();
    let v = stdout_json(&out);
    assert_eq!(v["quality"], "fair");
    assert_eq!(v["average_error_px"].as_f64(), Some(150.0));
    assert_eq!(v["targets"].as_array().map(Vec::len), Some(1));
}
