//! CLI integration tests: run the `epg` binary against feed files in a
//! temporary directory and assert on its output.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn epg_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("epg");
    path
}

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tv>
  <channel id="5">
    <display-name>News 5</display-name>
    <lcn>5.1</lcn>
  </channel>
  <programme start="20240101180000 +0000" stop="20240101183000 +0000" channel="5">
    <title>Evening News</title>
    <category>news</category>
    <episode-num system="dd_progid">EP00001234.0005</episode-num>
  </programme>
</tv>
"#;

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let feed_path = tmp.path().join("guide.xml");
    fs::write(&feed_path, FEED).unwrap();
    (tmp, feed_path)
}

fn run_epg(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = epg_binary();
    let output = Command::new(&binary)
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run epg binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_convert_summary() {
    let (tmp, feed) = setup_test_env();

    let (stdout, stderr, success) = run_epg(
        tmp.path(),
        &["convert", feed.to_str().unwrap(), "--source-id", "3"],
    );
    assert!(success, "convert failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("convert source 3"));
    assert!(stdout.contains("services: 1"));
    assert!(stdout.contains("schedule entries: 1"));
    assert!(stdout.contains("programs: 1"));
    assert!(stdout.contains("ok"));
}

#[test]
fn test_convert_json_dump() {
    let (tmp, feed) = setup_test_env();

    let (stdout, _, success) = run_epg(
        tmp.path(),
        &["convert", feed.to_str().unwrap(), "--json"],
    );
    assert!(success);

    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["source_id"], 1);
    assert_eq!(json["services"]["items"][0]["call_sign"], "News 5");
}

#[test]
fn test_missing_feed_is_skipped_not_an_error() {
    let tmp = TempDir::new().unwrap();

    let (stdout, _, success) = run_epg(tmp.path(), &["convert", "no-such-feed.xml"]);
    assert!(success, "a missing feed must not fail the command");
    assert!(stdout.contains("skipping source"));
}

#[test]
fn test_bad_timestamp_fails_the_conversion() {
    let tmp = TempDir::new().unwrap();
    let feed_path = tmp.path().join("guide.xml");
    fs::write(&feed_path, FEED.replace("20240101183000 +0000", "whenever")).unwrap();

    let (_, stderr, success) = run_epg(tmp.path(), &["convert", feed_path.to_str().unwrap()]);
    assert!(!success, "a malformed timestamp must abort the run");
    assert!(stderr.contains("Conversion failed"));
}

#[test]
fn test_inspect_reports_counts() {
    let (tmp, feed) = setup_test_env();

    let (stdout, _, success) = run_epg(tmp.path(), &["inspect", feed.to_str().unwrap()]);
    assert!(success);
    assert!(stdout.contains("channels: 1"));
    assert!(stdout.contains("programmes: 1"));
}

#[test]
fn test_config_lineup_name_is_used() {
    let (tmp, feed) = setup_test_env();
    let config_path = tmp.path().join("epg.toml");
    fs::write(&config_path, "[lineup]\nname = \"Cable One\"\n").unwrap();

    let (stdout, _, success) = run_epg(
        tmp.path(),
        &[
            "convert",
            feed.to_str().unwrap(),
            "--config",
            config_path.to_str().unwrap(),
        ],
    );
    assert!(success);
    assert!(stdout.contains("lineup: CABLE-ONE"));
}

#[test]
fn test_lineup_name_flag_overrides_config() {
    let (tmp, feed) = setup_test_env();

    let (stdout, _, success) = run_epg(
        tmp.path(),
        &[
            "convert",
            feed.to_str().unwrap(),
            "--lineup-name",
            "Flag Lineup",
        ],
    );
    assert!(success);
    assert!(stdout.contains("lineup: FLAG-LINEUP"));
}
