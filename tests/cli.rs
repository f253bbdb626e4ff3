use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;

const HEADER: &str =
    "filename,year,domaine,porte_greffe,parcelle,true_count,detect_count,tp,fp,fn,precision,recall";

fn write_model(dir: &Path, model: u32, rows: &[&str]) {
    let mut content = String::from(HEADER);
    for row in rows {
        content.push('\n');
        content.push_str(row);
    }
    content.push('\n');
    fs::write(dir.join(format!("eval_model_{model}_Sheet1.csv")), content).unwrap();
}

fn cmd() -> Command {
    Command::cargo_bin("grovemetrics").unwrap()
}

#[test]
fn models_lists_discovered_ids_without_18() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path(), 2, &["a.jpg,2022,north,SO4,1,1,1,1,0,0,1.0,1.0"]);
    write_model(dir.path(), 18, &["a.jpg,2022,north,SO4,1,1,1,1,0,0,1.0,1.0"]);
    cmd()
        .args(["models", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Model 2"))
        .stdout(contains("Model 18").not());
}

#[test]
fn summary_prints_ranked_table_and_winner() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path(), 1, &["a.jpg,2022,north,SO4,1,10,5,4,1,6,0.8,0.4"]);
    write_model(dir.path(), 2, &["a.jpg,2022,north,SO4,1,10,10,9,1,1,0.9,0.9"]);
    cmd()
        .args(["summary", dir.path().to_str().unwrap(), "--no-color"])
        .assert()
        .success()
        .stdout(contains("Model 1"))
        .stdout(contains("Model 2"))
        .stdout(contains("Winning model: Model 2"));
}

#[test]
fn summary_json_is_machine_readable() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path(), 1, &["a.jpg,2022,north,SO4,1,10,5,4,1,6,0.8,0.4"]);
    let output = cmd()
        .args(["summary", dir.path().to_str().unwrap(), "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed[0]["model"], 1);
    assert_eq!(parsed[0]["total_tp"], 4);
}

#[test]
fn summary_honors_filters() {
    let dir = tempfile::tempdir().unwrap();
    write_model(
        dir.path(),
        1,
        &[
            "a.jpg,2022,north,SO4,1,10,10,9,1,1,0.9,0.9",
            "b.jpg,2023,south,SO4,2,10,5,3,2,7,0.6,0.3",
        ],
    );
    let output = cmd()
        .args([
            "summary",
            dir.path().to_str().unwrap(),
            "--year",
            "2023",
            "--json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed[0]["total_tp"], 3);
}

#[test]
fn export_writes_csv_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path(), 1, &["a.jpg,2022,north,SO4,1,10,9,8,1,2,0.889,0.8"]);
    cmd()
        .args(["export", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("filename,year,domaine,porte_greffe,parcelle"))
        .stdout(contains("precision_1"))
        .stdout(contains("a.jpg"));
}

#[test]
fn export_writes_file_when_asked() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path(), 1, &["a.jpg,2022,north,SO4,1,10,9,8,1,2,0.889,0.8"]);
    let out = dir.path().join("export.csv");
    cmd()
        .args([
            "export",
            dir.path().to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();
    let content = fs::read_to_string(&out).unwrap();
    assert!(content.contains("a.jpg"));
}

#[test]
fn top_images_limits_output() {
    let dir = tempfile::tempdir().unwrap();
    write_model(
        dir.path(),
        1,
        &[
            "a.jpg,2022,north,SO4,1,10,10,9,1,1,0.9,0.9",
            "b.jpg,2022,north,SO4,1,10,5,3,2,7,0.6,0.3",
        ],
    );
    cmd()
        .args([
            "top-images",
            dir.path().to_str().unwrap(),
            "--limit",
            "1",
            "--no-color",
        ])
        .assert()
        .success()
        .stdout(contains("a.jpg"))
        .stdout(contains("b.jpg").not());
}

#[test]
fn missing_directory_content_fails_with_cause() {
    let dir = tempfile::tempdir().unwrap();
    cmd()
        .args(["summary", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("no evaluation files"));
}

#[test]
fn extra_exclusions_from_the_command_line() {
    let dir = tempfile::tempdir().unwrap();
    write_model(dir.path(), 1, &["a.jpg,2022,north,SO4,1,1,1,1,0,0,1.0,1.0"]);
    write_model(dir.path(), 2, &["a.jpg,2022,north,SO4,1,1,1,1,0,0,1.0,1.0"]);
    cmd()
        .args(["models", dir.path().to_str().unwrap(), "--exclude", "2"])
        .assert()
        .success()
        .stdout(contains("Model 1"))
        .stdout(contains("Model 2").not());
}
