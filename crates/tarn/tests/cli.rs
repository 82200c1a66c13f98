use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;
use tarn_contracts::{
    TARN_CAPS_REPORT_SCHEMA_VERSION, TARN_DIAG_SCHEMA_VERSION, TARN_TEXT_REPORT_SCHEMA_VERSION,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn run_tarn(args: &[&str]) -> std::process::Output {
    let exe = env!("CARGO_BIN_EXE_tarn");
    Command::new(exe)
        .args(args)
        .env_remove("TARN_CAPS")
        .output()
        .expect("run tarn")
}

fn parse_json_stdout(out: &std::process::Output) -> Value {
    serde_json::from_slice(&out.stdout).expect("parse stdout JSON")
}

#[test]
fn layout_check_accepts_fixture() {
    let manifest = fixture("layout.json");
    let out = run_tarn(&["layout", "check", manifest.to_str().unwrap()]);
    assert_eq!(
        out.status.code(),
        Some(0),
        "stderr:\n{}",
        String::from_utf8_lossy(&out.stderr)
    );
    let v = parse_json_stdout(&out);
    assert_eq!(v["schema_version"], TARN_DIAG_SCHEMA_VERSION);
    assert_eq!(v["ok"], true);
    assert_eq!(v["diagnostics"].as_array().expect("diagnostics[]").len(), 0);
    assert_eq!(v["meta"]["tables"], 3);
    assert_eq!(v["meta"]["ptables"], 1);
    let digest = v["meta"]["manifest_sha256"].as_str().expect("digest");
    assert_eq!(digest.len(), 64);
}

#[test]
fn layout_check_reports_problems() {
    let dir = tempfile::tempdir().expect("tempdir");
    let bytes = std::fs::read(fixture("layout.json")).expect("read fixture");
    let mut doc: Value = serde_json::from_slice(&bytes).expect("fixture JSON");
    doc["tables"]["list"] = serde_json::json!([1, 4, 4]);
    doc["ptables"]["range"]["min"] = serde_json::json!(5);
    let path = dir.path().join("bad.json");
    std::fs::write(&path, serde_json::to_vec(&doc).expect("encode")).expect("write");

    let report_path = dir.path().join("report.json");
    let out = run_tarn(&[
        "layout",
        "check",
        path.to_str().unwrap(),
        "--out",
        report_path.to_str().unwrap(),
    ]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());

    let v: Value =
        serde_json::from_slice(&std::fs::read(&report_path).expect("read report")).expect("JSON");
    assert_eq!(v["ok"], false);
    let codes: Vec<&str> = v["diagnostics"]
        .as_array()
        .expect("diagnostics[]")
        .iter()
        .map(|d| d["code"].as_str().expect("code"))
        .collect();
    assert_eq!(codes, vec!["TARN-LAYOUT-0020", "TARN-LAYOUT-0010"]);
}

#[test]
fn layout_check_reports_unparseable_manifest() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, b"{ not json").expect("write");
    let out = run_tarn(&["layout", "check", path.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    let v = parse_json_stdout(&out);
    assert_eq!(v["diagnostics"][0]["code"], "TARN-LAYOUT-0000");
    assert_eq!(v["diagnostics"][0]["stage"], "load");
}

#[test]
fn missing_manifest_is_a_usage_error() {
    let out = run_tarn(&["layout", "check", "/nonexistent/layout.json"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("read manifest"));
}

#[test]
fn caps_list_shows_profiles() {
    let out = run_tarn(&["caps", "list"]);
    assert_eq!(out.status.code(), Some(0));
    let v = parse_json_stdout(&out);
    assert_eq!(v["schema_version"], TARN_CAPS_REPORT_SCHEMA_VERSION);
    assert_eq!(v["capabilities"].as_array().expect("capabilities[]").len(), 4);
    assert_eq!(v["profiles"].as_array().expect("profiles[]").len(), 3);
    assert!(v.get("env").is_none());

    let out = run_tarn(&["caps", "list", "--profile", "io"]);
    let v = parse_json_stdout(&out);
    assert_eq!(v["profiles"][0]["name"], "io");
    assert_eq!(v["profiles"][0]["caps"], serde_json::json!(["io-error", "eof-error"]));
}

#[test]
fn caps_list_reads_env_override() {
    let exe = env!("CARGO_BIN_EXE_tarn");
    let out = Command::new(exe)
        .args(["caps", "list"])
        .env("TARN_CAPS", "mapping,os-error")
        .output()
        .expect("run tarn");
    let v = parse_json_stdout(&out);
    assert_eq!(v["env"], serde_json::json!(["mapping", "os-error"]));
}

#[test]
fn text_len_counts_code_points() {
    let out = run_tarn(&["text", "len", "héllo"]);
    assert_eq!(out.status.code(), Some(0));
    let v = parse_json_stdout(&out);
    assert_eq!(v["schema_version"], TARN_TEXT_REPORT_SCHEMA_VERSION);
    assert_eq!(v["bytes"], 6);
    assert_eq!(v["code_points"], 5);
}

#[test]
fn text_substr_walks_backwards() {
    let out = run_tarn(&[
        "text", "substr", "héllo", "--start", "4", "--end", "-1", "--step", "-1",
    ]);
    assert_eq!(
        out.status.code(),
        Some(0),
        "stderr:\n{}",
        String::from_utf8_lossy(&out.stderr)
    );
    let v = parse_json_stdout(&out);
    assert_eq!(v["result"], "olléh");

    let out = run_tarn(&["text", "substr", "héllo", "--start", "1", "--end", "2"]);
    assert_eq!(parse_json_stdout(&out)["result"], "é");
}

#[test]
fn text_substr_zero_step_fails() {
    let out = run_tarn(&["text", "substr", "abc", "--step", "0"]);
    assert_eq!(out.status.code(), Some(1));
    let v = parse_json_stdout(&out);
    assert_eq!(v["ok"], false);
    assert_eq!(v["error"], "ZeroDivisionError: division by zero");
}
