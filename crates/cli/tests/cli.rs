use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn wfes() -> Command {
    Command::cargo_bin("wfes").unwrap()
}

fn neutral_args(cmd: &mut Command) -> &mut Command {
    cmd.args(["-N", "10", "-s", "0", "-u", "0", "-v", "0", "-d", "0.5"])
}

#[test]
fn test_neutral_summary_line() {
    let mut cmd = wfes();
    neutral_args(&mut cmd)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("10,0,0,0,0.5,0.95,0.05,"));
}

#[test]
fn test_summary_has_ten_fields() {
    let output = wfes()
        .args(["-N", "50", "-s", "-0.01", "-u", "1e-6", "-v", "1e-6", "-d", "0.5"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let line = stdout.trim();
    assert_eq!(line.split(',').count(), 10, "{line}");
    assert!(line.starts_with("50,-0.01,1e-06,1e-06,0.5,"), "{line}");
}

#[test]
fn test_unsafe_mutation_rate_needs_force() {
    let args = ["-N", "10", "-s", "0", "-u", "0.1", "-v", "0", "-d", "0.5"];

    wfes()
        .args(args)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--force"));

    wfes()
        .args(args)
        .arg("--force")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("10,0,0.1,0,0.5,"));
}

#[test]
fn test_invalid_population_size() {
    wfes()
        .args(["-N", "1", "-s", "0", "-u", "0", "-v", "0", "-d", "0.5"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("population size"));
}

#[test]
fn test_invalid_zero_threshold() {
    let mut cmd = wfes();
    neutral_args(&mut cmd)
        .args(["-z", "-1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("zero_threshold"));
}

#[test]
fn test_missing_required_argument() {
    wfes()
        .args(["-N", "10", "-s", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--forward-mutation-rate"));
}

#[test]
fn test_exports_written() {
    let temp = tempdir().unwrap();
    let sojourn = temp.path().join("sojourn.csv");
    let extinction = temp.path().join("extinction.csv");
    let fixation = temp.path().join("fixation.csv");

    let mut cmd = wfes();
    neutral_args(&mut cmd)
        .arg("-g")
        .arg(&sojourn)
        .arg("-e")
        .arg(&extinction)
        .arg("-f")
        .arg(&fixation)
        .assert()
        .success();

    for path in [&sojourn, &extinction, &fixation] {
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.ends_with('\n'));
        assert_eq!(content.trim().split(',').count(), 19, "{}", path.display());
    }

    let extinction = std::fs::read_to_string(&extinction).unwrap();
    assert!(extinction.starts_with("0.95,0.9,0.85,"), "{extinction}");
    let fixation = std::fs::read_to_string(&fixation).unwrap();
    assert!(fixation.starts_with("0.05,0.1,0.15,"), "{fixation}");
}

#[test]
fn test_json_format() {
    let mut cmd = wfes();
    let output = neutral_args(&mut cmd)
        .args(["--format", "json", "--solver", "dense-lu"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let record: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(record["population_size"], 10);
    let pe = record["probability_extinction"].as_f64().unwrap();
    assert!((pe - 0.95).abs() < 1e-10);
}

#[test]
fn test_unknown_solver_rejected() {
    let mut cmd = wfes();
    neutral_args(&mut cmd)
        .args(["--solver", "pardiso"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown solver strategy"));
}

#[test]
fn test_threads_and_verbose_logging() {
    let mut cmd = wfes();
    neutral_args(&mut cmd)
        .args(["-t", "2", "--verbose", "--verbose"])
        .assert()
        .success()
        .stderr(predicate::str::contains("built generator matrix"));
}
