use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn recfill() -> Command {
    Command::cargo_bin("recfill").unwrap()
}

#[test]
fn test_inline_template_with_stdin_record() {
    recfill()
        .args(["--inline", "{join .items.name with \", \"}"])
        .write_stdin(r#"{"items": [{"name":"a"},{"name":"b"},{"name":"c"}]}"#)
        .assert()
        .success()
        .stdout("a, b, c");
}

#[test]
fn test_template_and_record_files() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("header.txt");
    let record = dir.path().join("index.json");
    fs::write(&template, "{.title} ({.num_words} words)\n").unwrap();
    fs::write(
        &record,
        r#"{"101": {"title": "First", "num_words": 900}, "102": {"title": "Second", "num_words": 40}}"#,
    )
    .unwrap();

    recfill()
        .arg("--template")
        .arg(&template)
        .arg("--record")
        .arg(&record)
        .args(["--key", "102"])
        .assert()
        .success()
        .stdout("Second (40 words)\n");
}

#[test]
fn test_fill_error_exits_nonzero() {
    recfill()
        .args(["-i", "before {.missing.path} after"])
        .write_stdin("{}")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("Failed to fill template"))
        .stderr(predicate::str::contains(".missing"));
}

#[test]
fn test_invalid_json_record() {
    recfill()
        .args(["-i", "{.a}"])
        .write_stdin("not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Record is not valid JSON"));
}

#[test]
fn test_iteration_limit_flag() {
    recfill()
        .args(["-i", "{join .a with \"\"}", "--max-iterations", "1"])
        .write_stdin(r#"{"a": [1, 2]}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("join iterations"));
}

#[test]
fn test_oversized_repeat_fails_cleanly() {
    recfill()
        .args(["-i", r#"{"ab" * 99999999999999}"#])
        .write_stdin("{}")
        .assert()
        .failure()
        .stderr(predicate::str::contains("output bytes"));
}
