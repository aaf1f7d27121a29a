use std::fs;

use tempfile::tempdir;

#[test]
fn prints_one_line_per_scenario() {
    let output = assert_cmd::cargo::cargo_bin_cmd!("contact-tracing-sim")
        .args(["--config", "tests/data/parameters.json", "--days", "5"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("app usage 0.00%"));
    assert!(stdout.contains("app usage 60.00%"));
}

#[test]
fn writes_results_file() {
    let temp_dir = tempdir().unwrap();
    assert_cmd::cargo::cargo_bin_cmd!("contact-tracing-sim")
        .args(["--config", "tests/data/parameters.json", "--days", "5"])
        .args(["--app-usage-step", "0.5", "--threads", "--output-dir"])
        .arg(temp_dir.path())
        .assert()
        .success();

    let contents = fs::read_to_string(temp_dir.path().join("results.tsv")).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Population Size\t"));
    assert!(lines[3].starts_with("300\t4\t20.00\t"));
    assert!(lines[3].ends_with("\t100.00"));
}

#[test]
fn existing_results_file_needs_overwrite() {
    let temp_dir = tempdir().unwrap();
    fs::write(temp_dir.path().join("results.tsv"), "old").unwrap();
    let run = |overwrite: bool| {
        let mut command = assert_cmd::cargo::cargo_bin_cmd!("contact-tracing-sim");
        command
            .args(["--config", "tests/data/parameters.json", "--days", "2"])
            .arg("--output-dir")
            .arg(temp_dir.path());
        if overwrite {
            command.arg("--overwrite");
        }
        command.output().unwrap()
    };

    let output = run(false);
    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr)
        .unwrap()
        .contains("already exists"));

    assert!(run(true).status.success());
    assert_ne!(
        fs::read_to_string(temp_dir.path().join("results.tsv")).unwrap(),
        "old"
    );
}

#[test]
fn daily_status_is_logged_at_info() {
    let output = assert_cmd::cargo::cargo_bin_cmd!("contact-tracing-sim")
        .args(["--config", "tests/data/parameters.json", "--days", "3"])
        .args(["--app-usage", "0.5", "--log-level", "info"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("INFO"));
    assert!(stdout.contains("contact_tracing_sim::simulation - day 2:"));
    assert!(!stdout.contains("DEBUG"));
}

#[test]
fn scenario_summary_is_logged_once() {
    let output = assert_cmd::cargo::cargo_bin_cmd!("contact-tracing-sim")
        .args(["--config", "tests/data/parameters.json", "--days", "3"])
        .args(["--app-usage", "0.5", "--log-level", "info"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let logged: Vec<&str> = stdout
        .lines()
        .filter(|line| line.contains("INFO") && line.contains("app usage 50.00%"))
        .collect();
    assert_eq!(logged.len(), 1, "{logged:?}");
    assert!(logged[0].contains("after 3 days"));
    // The plain summary line is still printed.
    assert_eq!(
        stdout
            .lines()
            .filter(|line| line.starts_with("app usage 50.00%"))
            .count(),
        1
    );
}

#[test]
fn invalid_parameter_fails() {
    let output = assert_cmd::cargo::cargo_bin_cmd!("contact-tracing-sim")
        .args(["--config", "tests/data/parameters.json", "--app-usage", "1.5"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8(output.stderr)
        .unwrap()
        .contains("invalid parameter"));
}
