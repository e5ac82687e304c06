use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn csvmerge() -> Command {
    Command::cargo_bin("csvmerge").unwrap()
}

#[test]
fn merges_files_into_default_output() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "A.csv", "id,name\n1,Al\n2,Bo\n");
    let b = write(dir.path(), "B.csv", "id,name\n3,Cy\n");

    csvmerge()
        .current_dir(dir.path())
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout(predicate::str::contains("All files have matching columns!"))
        .stdout(predicate::str::contains("Total Rows: 3"))
        .stdout(predicate::str::contains("merged_data.csv"));

    let merged = fs::read_to_string(dir.path().join("merged_data.csv")).unwrap();
    assert_eq!(merged, "id,name\n1,Al\n2,Bo\n3,Cy\n");
}

#[test]
fn custom_output_and_reordered_columns() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.csv", "id,name\n1,Al\n");
    let b = write(dir.path(), "b.csv", "name,id\n\"Bo, Jr.\",2\n");
    let out = dir.path().join("people.csv");

    csvmerge()
        .arg(&a)
        .arg(&b)
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let merged = fs::read_to_string(&out).unwrap();
    assert_eq!(merged, "id,name\n1,Al\n2,\"Bo, Jr.\"\n");
}

#[test]
fn mismatch_exits_with_one_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "A.csv", "id,name\n1,Al\n");
    let b = write(dir.path(), "B.csv", "id,email\n2,b@example.com\n");

    csvmerge()
        .current_dir(dir.path())
        .arg(&a)
        .arg(&b)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Not all files have the same columns!"))
        .stdout(predicate::str::contains("- A.csv: id, name"))
        .stdout(predicate::str::contains("- B.csv: id, email"));

    assert!(!dir.path().join("merged_data.csv").exists());
}

#[test]
fn parse_error_names_the_file() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "good.csv", "id\n1\n");
    let b = write(dir.path(), "broken.csv", "id,note\n2,\"open\n");

    csvmerge()
        .current_dir(dir.path())
        .arg(&a)
        .arg(&b)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to parse broken.csv"))
        .stderr(predicate::str::contains("unterminated quoted field"));

    assert!(!dir.path().join("merged_data.csv").exists());
}

#[test]
fn missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();

    csvmerge()
        .current_dir(dir.path())
        .arg("nope.csv")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to read file: nope.csv"));
}

#[test]
fn no_files_prints_instructions() {
    csvmerge()
        .assert()
        .success()
        .stderr(predicate::str::contains("Please supply CSV files"));
}

#[test]
fn stdout_output_moves_report_to_stderr() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.csv", "x,y\n1,2\n");
    let b = write(dir.path(), "b.csv", "x,y\n3,4\n");

    csvmerge()
        .arg(&a)
        .arg(&b)
        .args(["-o", "-"])
        .assert()
        .success()
        .stdout("x,y\n1,2\n3,4\n")
        .stderr(predicate::str::contains("written to stdout"));
}

#[test]
fn check_only_does_not_write() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.csv", "x\n1\n");

    csvmerge()
        .current_dir(dir.path())
        .arg(&a)
        .arg("--check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Check only"));

    assert!(!dir.path().join("merged_data.csv").exists());
}

#[test]
fn json_report() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "A.csv", "id,name\n");
    let b = write(dir.path(), "B.csv", "id,email\n");

    let output = csvmerge()
        .arg(&a)
        .arg(&b)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["status"], "mismatch");
    assert_eq!(value["comparison"][0]["columns"], serde_json::json!(["id", "name"]));
    assert_eq!(value["comparison"][1]["columns"], serde_json::json!(["id", "email"]));
}

#[test]
fn strict_rejects_short_rows() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.csv", "x,y\n1\n");

    csvmerge()
        .current_dir(dir.path())
        .arg(&a)
        .arg("--strict")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("expected 2 fields, found 1"));

    csvmerge()
        .current_dir(dir.path())
        .arg(&a)
        .args(["-o", "-"])
        .assert()
        .success()
        .stdout("x,y\n1,\n");
}

#[test]
fn explicit_delimiter() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.txt", "x;y\n1;2\n");

    csvmerge()
        .arg(&a)
        .args(["--delimiter", ";", "-o", "-"])
        .assert()
        .success()
        .stdout("x,y\n1,2\n");
}
