//! Contract tests for the `tutor` binary: commands, text output and JSON schema.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

#[allow(deprecated)]
fn cli() -> Command {
    Command::cargo_bin("tutor").unwrap()
}

#[test]
fn help_lists_commands() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("solve"))
        .stdout(predicate::str::contains("repl"))
        .stdout(predicate::str::contains("examples"));
}

#[test]
fn solve_prints_steps_and_answer() {
    cli()
        .args(["solve", "2x + 5 = 13"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Kategori: algebra"))
        .stdout(predicate::str::contains("Langkah:"))
        .stdout(predicate::str::contains("Jawaban: x = 4"));
}

#[test]
fn no_steps_prints_only_the_answer() {
    cli()
        .args(["solve", "Turunan dari x^3", "--no-steps"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Jawaban: 3x^2"))
        .stdout(predicate::str::contains("Langkah:").not());
}

#[test]
fn json_output_has_schema_version() {
    let output = cli()
        .args(["solve", "Gaya 100 N sudut 45°", "--json"])
        .output()
        .expect("Failed to run CLI");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let json: Value = serde_json::from_str(&stdout).expect("Invalid JSON output");
    assert_eq!(json["schema_version"], 1);
    assert_eq!(json["ok"], true);
    assert_eq!(json["category"], "physics");
    assert_eq!(json["finalAnswer"], "Fx = 70.71 N, Fy = 70.71 N");
    assert_eq!(json["steps"][0]["index"], 1);
}

#[test]
fn conversation_json_has_no_results() {
    let output = cli().args(["solve", "Halo", "--json"]).output().unwrap();
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["category"], "conversation");
    for step in json["steps"].as_array().unwrap() {
        assert!(step.get("result").is_none());
    }
}

#[test]
fn degraded_json_is_not_ok() {
    let output = cli()
        .args(["solve", "resultan dua vektor", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["ok"], false);
    assert!(json["finalAnswer"].as_str().unwrap().starts_with("Maaf"));
}

#[test]
fn examples_lists_every_category() {
    let output = cli().arg("examples").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    for category in ["[arithmetic]", "[algebra]", "[trigonometry]", "[calculus]", "[physics]"] {
        assert!(stdout.contains(category), "missing {}", category);
    }
}

#[test]
fn verbose_logs_go_to_stderr() {
    cli()
        .args(["--verbose", "solve", "2x + 5 = 13", "--json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("classified"));
}

#[test]
fn invalid_config_file_is_reported_on_stderr() {
    let dir = std::env::temp_dir().join(format!("tutor_cli_bad_config_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("tutor_config.toml"), "this is = = not toml [[[").unwrap();

    cli()
        .current_dir(&dir)
        .env_remove("RUST_LOG")
        .args(["solve", "1 + 1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Jawaban: 2"))
        .stderr(predicate::str::contains("invalid config"));

    let _ = std::fs::remove_dir_all(&dir);
}
