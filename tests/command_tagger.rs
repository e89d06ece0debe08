//! The CLI driving a stand-in model program over stdin/stdout.

#![cfg(unix)]
#![allow(deprecated)] // cargo_bin deprecation, replacement not yet stable

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

/// Answers every single-text request with a PERSON at 8..18 and every
/// batch request with two fixed results.
const MODEL: &str = r#"
req=$(cat)
case "$req" in
  *'"texts"'*) echo '{"results":[[{"start":0,"end":5,"label":"ORG"}],[]]}' ;;
  *) echo '{"entities":[{"start":8,"end":18,"label":"PERSON"}]}' ;;
esac
"#;

fn entmark_with_model(script: &str) -> Command {
    let config = std::env::temp_dir().join(format!("entmark-cmd-{}.toml", std::process::id()));
    std::fs::write(&config, "").expect("temp config should be writable");

    let mut cmd = Command::cargo_bin("entmark").expect("binary 'entmark' should be built");
    cmd.arg("--config")
        .arg(config)
        .args(["--command", "sh", "--arg", "-c", "--arg", script, "--model", "stand-in"]);
    cmd
}

fn temp_lines(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("entmark-cmd-{}-{name}", std::process::id()));
    std::fs::write(&path, content).expect("temp file should be writable");
    path
}

#[test]
fn health_reports_configured_model() {
    entmark_with_model(MODEL)
        .arg("health")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""status": "healthy""#))
        .stdout(predicate::str::contains(r#""model": "stand-in""#));
}

#[test]
fn extract_contact_example() {
    entmark_with_model(MODEL)
        .args([
            "extract",
            "Contact John Smith at john.smith@company.com or call (555) 123-4567.",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""total_entities": 1"#))
        .stdout(predicate::str::contains(r#""PERSON": ["#))
        .stdout(predicate::str::contains("entity-mark entity-PERSON"))
        .stdout(predicate::str::contains(r#""EMAIL": ["#))
        .stdout(predicate::str::contains(r#""PHONE": []"#));
}

#[test]
fn extract_without_patterns_omits_custom_entities() {
    entmark_with_model(MODEL)
        .args(["--no-patterns", "extract", "Contact John Smith today"])
        .assert()
        .success()
        .stdout(predicate::str::contains("John Smith"))
        .stdout(predicate::str::contains("custom_entities").not());
}

#[test]
fn batch_reads_one_text_per_line() {
    let input = temp_lines("batch.txt", "Apple is big\n\nnothing here\n");
    entmark_with_model(MODEL)
        .arg("batch")
        .arg(input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""text": "Apple is big...""#))
        .stdout(predicate::str::contains(r#""text": "nothing here...""#))
        .stdout(predicate::str::contains(r#""label": "ORG""#))
        .stdout(predicate::str::contains("error").not());
}

#[test]
fn analyze_anonymizes_text() {
    entmark_with_model(MODEL)
        .args(["analyze", "Contact John Smith today", "--mode", "anonymize"])
        .assert()
        .success()
        .stdout(predicate::str::diff("Contact [PERSON] today\n"));
}

#[test]
fn analyze_exports_csv() {
    entmark_with_model(MODEL)
        .args([
            "analyze",
            "Contact John Smith today",
            "--mode",
            "export",
            "--format",
            "csv",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("text,label,start,end,description\n"))
        .stdout(predicate::str::contains(r#""John Smith",PERSON,8,18,"#));
}

#[test]
fn failing_model_is_a_processing_error() {
    entmark_with_model("cat >/dev/null; echo boom >&2; exit 1")
        .args(["extract", "Contact John Smith today"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("boom"));
}
