use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn notepad(contents: &str) -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("budget.tally");
    fs::write(&file, contents).unwrap();
    (temp_dir, file)
}

#[test]
fn test_cli_run_prints_a_row_per_line() {
    let (_dir, file) = notepad("# Budget\nprice = 100\ntotal = price + 10% =>\n20% of 100\n");

    let mut cmd = Command::cargo_bin("tally").unwrap();
    cmd.arg("run").arg(&file);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("# Budget"))
        .stdout(predicate::str::contains("price = 100"))
        .stdout(predicate::str::contains("total = 110"))
        .stdout(predicate::str::contains("20"));
}

#[test]
fn test_cli_run_json_output() {
    let (_dir, file) = notepad("x = 2 =>\nx * 21");

    let mut cmd = Command::cargo_bin("tally").unwrap();
    cmd.arg("run").arg(&file).arg("--json");

    let output = cmd.assert().success().get_output().stdout.clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json[0]["type"], "combined");
    assert_eq!(json[0]["variableName"], "x");
    assert_eq!(json[1]["type"], "mathResult");
    assert_eq!(json[1]["result"], "42");
}

#[test]
fn test_cli_run_precision() {
    let (_dir, file) = notepad("1 / 3");

    let mut cmd = Command::cargo_bin("tally").unwrap();
    cmd.arg("run").arg(&file).arg("--precision").arg("2").arg("--json");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"result\": \"0.33\""));
}

#[test]
fn test_cli_run_date_format() {
    let (_dir, file) = notepad("2024-03-15 + 1 day");

    let mut cmd = Command::cargo_bin("tally").unwrap();
    cmd.arg("run").arg(&file).arg("--date-format").arg("long");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("16 March 2024"));
}

#[test]
fn test_cli_run_error_lines_do_not_fail() {
    let (_dir, file) = notepad("1 / 0\n2 + 2");

    let mut cmd = Command::cargo_bin("tally").unwrap();
    cmd.arg("run").arg(&file);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Division by zero"))
        .stdout(predicate::str::contains("4"));
}

#[test]
fn test_cli_run_missing_file() {
    let mut cmd = Command::cargo_bin("tally").unwrap();
    cmd.arg("run").arg("definitely-not-here.tally");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Cannot read"));
}
