use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_cli_eval_shares_one_document() {
    let mut cmd = Command::cargo_bin("tally").unwrap();
    cmd.arg("eval").arg("price = $40").arg("price * 3 =>");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("$120"));
}

#[test]
fn test_cli_eval_solves_equations() {
    let mut cmd = Command::cargo_bin("tally").unwrap();
    cmd.arg("eval").arg("solve x in y = 2*x + 3, y = 11 =>").arg("--json");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"result\": \"4\""));
}

#[test]
fn test_cli_eval_units() {
    let mut cmd = Command::cargo_bin("tally").unwrap();
    cmd.arg("eval").arg("50 m + 20 ft =>");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("56.096 m"));
}

#[test]
fn test_cli_eval_requires_a_line() {
    let mut cmd = Command::cargo_bin("tally").unwrap();
    cmd.arg("eval");

    cmd.assert().failure();
}
