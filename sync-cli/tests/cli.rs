//! End-to-end tests for the `formurl` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

const LOGGER: &str = r#"
debounce_ms = 20

[schema]
title = "scalar"
level = "array"
createdDateRange = "dateRange"

[defaults]
level = "error"
"#;

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn formurl() -> Command {
    assert_cmd::cargo::cargo_bin_cmd!("formurl")
}

#[test]
fn decode_prints_snapshot_json() {
    let config = config_file(LOGGER);

    formurl()
        .arg("decode")
        .arg("--config")
        .arg(config.path())
        .arg("?title=Bug%20report&createdDateRange=2024-01-01..2024-01-10")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""title": "Bug report""#))
        .stdout(predicate::str::contains(r#""from": "2024-01-01""#))
        .stdout(predicate::str::contains(r#""error""#));
}

#[test]
fn encode_prints_query_string() {
    let config = config_file(LOGGER);

    formurl()
        .args(["encode", "--config"])
        .arg(config.path())
        .arg(r#"{"title": "Bug", "level": ["warn", "error"]}"#)
        .assert()
        .success()
        .stdout(predicate::eq("level=error%2Cwarn&title=Bug\n"));
}

#[test]
fn simulate_reads_script_from_stdin() {
    let config = config_file(LOGGER);

    formurl()
        .args(["simulate", "--config"])
        .arg(config.path())
        .args(["--initial", "?page=2"])
        .write_stdin("edit title Bug\nwait 100\nshow\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("written: ?level=error&title=Bug"))
        .stdout(predicate::str::contains("url: ?level=error&page=2&title=Bug"));
}

#[test]
fn simulate_reads_script_file() {
    let config = config_file(LOGGER);
    let script = config_file("visit title=Linked\nwait 50\nshow\n");

    formurl()
        .args(["simulate", "--config"])
        .arg(config.path())
        .arg(script.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""title": "Linked""#));
}

#[test]
fn missing_config_fails() {
    formurl()
        .args(["decode", "--config", "/nonexistent/filter.toml", "title=x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load filter configuration"));
}

#[test]
fn invalid_default_fails() {
    let config = config_file("[schema]\nrange = \"dateRange\"\n[defaults]\nrange = \"soon\"\n");

    formurl()
        .args(["encode", "--config"])
        .arg(config.path())
        .arg("{}")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid filter config"));
}
