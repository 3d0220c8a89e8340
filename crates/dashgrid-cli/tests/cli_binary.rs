use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tempfile::tempdir;

fn dashgrid_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_dashgrid"))
}

fn run_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(dashgrid_bin())
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn dashgrid");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(stdin.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait for dashgrid")
}

#[test]
fn compact_reads_stdin_and_writes_json() {
    let output = run_with_stdin(
        &["compact", "--columns", "3"],
        r#"[{"i":"a","x":0,"y":0,"w":1,"h":1},{"i":"b","x":0,"y":0,"w":1,"h":1}]"#,
    );
    assert!(output.status.success(), "{output:?}");
    let layout: Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(layout[0]["x"], 0);
    assert_eq!(layout[0]["y"], 0);
    assert_eq!(layout[1]["x"], 0);
    assert_eq!(layout[1]["y"], 1);
}

#[test]
fn check_failure_sets_exit_code() {
    let output = run_with_stdin(
        &["check", "--columns", "2"],
        r#"[{"id":"a","x":0,"y":4,"w":1,"h":1}]"#,
    );
    assert_eq!(output.status.code(), Some(2));
    let report: Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(report["issues"][0]["code"], "floating_item");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("layout breaks 1 invariant(s)"), "{stderr}");
}

#[test]
fn malformed_input_is_a_data_error() {
    let output = run_with_stdin(&["compact", "--columns", "3"], "{not json");
    assert_eq!(output.status.code(), Some(65));
}

#[test]
fn json_logs_go_to_stderr() {
    let output = run_with_stdin(
        &["--log-format", "json", "--log-level", "info", "compact", "-c", "2"],
        r#"[{"id":"a","x":1,"y":1,"w":1,"h":1}]"#,
    );
    assert!(output.status.success(), "{output:?}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    let line = stderr
        .lines()
        .find(|line| line.contains("compacted layout"))
        .expect("compaction log line");
    let event: Value = serde_json::from_str(line).expect("json log line");
    assert_eq!(event["moved"], 1);
    serde_json::from_slice::<Value>(&output.stdout).expect("stdout stays pure JSON");
}

#[test]
fn dashboard_round_trip_through_files() {
    let dir = tempdir().expect("tempdir");
    let store_dir = dir.path().to_str().expect("utf8 path");

    let output = run_with_stdin(
        &["dashboard", "--store-dir", store_dir, "--name", "desk", "toggle", "chat", "off"],
        "",
    );
    assert!(output.status.success(), "{output:?}");

    let saved = std::fs::read_to_string(dir.path().join("dashgrid--desk.json")).expect("snapshot");
    let snapshot: Value = serde_json::from_str(&saved).expect("snapshot json");
    assert_eq!(snapshot["key"], "dashgrid:desk");
    assert_eq!(snapshot["columns"], 3);
    let ids: Vec<&str> = snapshot["items"]
        .as_array()
        .expect("items")
        .iter()
        .filter_map(|item| item["id"].as_str())
        .collect();
    assert!(!ids.contains(&"chat"));
    assert_eq!(ids.len(), 6);
}
