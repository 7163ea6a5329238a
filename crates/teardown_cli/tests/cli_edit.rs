use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn fixture_path() -> PathBuf {
    workspace_root().join("tests/fixtures/savegame.xml")
}

fn temp_save() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("savegame.xml");
    fs::copy(fixture_path(), &path).expect("failed to copy fixture");
    (dir, path)
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_teardown-se"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run teardown-se CLI")
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn cli_without_flags_prints_full_listing() {
    let output = run_cli(&[&path_arg(&fixture_path())]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("TEARDOWN SAVE"));
    assert!(stdout.contains(" ::: tool :::"));
    assert!(stdout.contains(" ::: reward :::"));
}

#[test]
fn cli_prints_selected_section_as_json() {
    let output = run_cli(&["--json", "--section", "reward", &path_arg(&fixture_path())]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["values"]["reward"]["1"], "1");
    assert_eq!(json["values"]["reward"]["3"], "0");
    assert!(json.get("tools").is_none());
}

#[test]
fn cli_lists_section_names() {
    let output = run_cli(&["--sections", &path_arg(&fixture_path())]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec!["cash", "tool", "valuable", "characters", "reward", "stats"]
    );
}

#[test]
fn cli_set_writes_value_and_backup() {
    let (_dir, path) = temp_save();
    let original = fs::read(&path).expect("failed to read save");

    let output = run_cli(&["--set", "tool/shotgun/ammo=50", &path_arg(&path)]);
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Saved "));
    assert!(stdout.contains("savegame.xml.bak"));

    let backup = fs::read(path.with_file_name("savegame.xml.bak")).expect("backup should exist");
    assert_eq!(backup, original);

    let saved = fs::read_to_string(&path).expect("failed to read saved file");
    let expected = String::from_utf8(original)
        .expect("fixture is UTF-8")
        .replacen("<ammo value=\"96\"/>", "<ammo value=\"50\"/>", 1);
    assert_eq!(saved, expected);
}

#[test]
fn cli_set_addresses_numeric_reward_ranks() {
    let (_dir, path) = temp_save();
    let output = run_cli(&[
        "--json",
        "--section",
        "reward",
        "--set",
        "reward/3/self=1",
        &path_arg(&path),
    ]);
    assert!(output.status.success(), "{output:?}");

    assert_eq!(stdout_json(&output)["values"]["reward"]["3"], "1");
    let saved = fs::read_to_string(&path).expect("failed to read saved file");
    assert!(saved.contains("<3 value=\"1\"/>"));
}

#[test]
fn cli_rejects_out_of_range_tool_value_without_touching_file() {
    let (_dir, path) = temp_save();
    let original = fs::read(&path).expect("failed to read save");

    let output = run_cli(&["--set", "tool/shotgun/ammo=5000", &path_arg(&path)]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("0..=2000"));

    assert_eq!(fs::read(&path).expect("failed to read save"), original);
    assert!(!path.with_file_name("savegame.xml.bak").exists());
}

#[test]
fn cli_rejects_non_flag_unlock_value() {
    let (_dir, path) = temp_save();
    let original = fs::read(&path).expect("failed to read save");

    let output = run_cli(&["--set", "valuable/mansion_art/self=7", &path_arg(&path)]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("0..=1"));
    assert_eq!(fs::read(&path).expect("failed to read save"), original);
}

#[test]
fn cli_stores_trimmed_numbers() {
    let (_dir, path) = temp_save();
    let output = run_cli(&["--set", "tool/shotgun/ammo= 50", &path_arg(&path)]);
    assert!(output.status.success(), "{output:?}");

    let saved = fs::read_to_string(&path).expect("failed to read saved file");
    assert!(saved.contains("<ammo value=\"50\"/>"), "{saved}");
}

#[test]
fn cli_rejects_malformed_assignment() {
    let output = run_cli(&["--set", "tool/shotgun=1", &path_arg(&fixture_path())]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn cli_reset_and_unlock_flags_apply_defaults() {
    let (_dir, path) = temp_save();
    let output = run_cli(&[
        "--json",
        "--tools",
        "--section",
        "valuable",
        "--reset-tool",
        "blowtorch",
        "--unlock-all",
        "valuable",
        &path_arg(&path),
    ]);
    assert!(output.status.success(), "{output:?}");

    let json = stdout_json(&output);
    assert_eq!(json["tools"]["blowtorch"]["ammo"], "60");
    assert_eq!(json["values"]["valuable"]["mansion_art"], "1");
    assert_eq!(json["values"]["valuable"]["marina_gps"], "1");
}

#[test]
fn cli_reports_unknown_tool_defaults_without_failing() {
    let (_dir, path) = temp_save();
    let output = run_cli(&["--reset-tool", "modgun", &path_arg(&path)]);
    assert!(output.status.success(), "{output:?}");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no default values known for 'modgun'"), "{stderr}");
}

#[test]
fn cli_set_version_updates_root() {
    let (_dir, path) = temp_save();
    let output = run_cli(&["--set-version", "2.1.0", "--info", "--json", &path_arg(&path)]);
    assert!(output.status.success(), "{output:?}");

    assert_eq!(stdout_json(&output)["version"], "2.1.0");
    let saved = fs::read_to_string(&path).expect("failed to read saved file");
    assert!(saved.starts_with("<registry version=\"2.1.0\">"));
}

#[test]
fn cli_reports_parse_failures() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("broken.xml");
    fs::write(&path, "<registry><savegame></registry>").expect("failed to write broken save");

    let output = run_cli(&[&path_arg(&path)]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error loading save file"));
    assert!(stderr.contains("Parse"));
}

#[test]
fn cli_reports_missing_file() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let output = run_cli(&[&path_arg(&dir.path().join("absent.xml"))]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Io"));
}
