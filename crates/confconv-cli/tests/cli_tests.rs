//! Integration tests for the `confconv` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise conversions through
//! the actual binary, including stdin/stdout piping, file I/O, the error
//! taxonomy with its exit codes, and atomic output writes.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}

/// Helper: a fresh path in the temp dir, unique per test.
fn temp_output(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("confconv-test-{}-{name}", std::process::id()));
    let _ = std::fs::remove_file(&path);
    path
}

fn confconv() -> Command {
    let mut cmd = Command::cargo_bin("confconv").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// Successful conversions
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn yaml_stdin_to_json_stdout() {
    confconv()
        .args(["--input_format", "yaml", "--output_format", "json"])
        .write_stdin("name: svc\nport: 8080\ntags: [a, b]\n")
        .assert()
        .success()
        .stdout(r#"{"name":"svc","port":8080,"tags":["a","b"]}"#);
}

#[test]
fn dash_means_stdio() {
    confconv()
        .args(["-", "-", "--input_format", "json", "--output_format", "yaml"])
        .write_stdin(r#"{"b":1,"a":[true,null]}"#)
        .assert()
        .success()
        .stdout("b: 1\na:\n  - true\n  - null\n");
}

#[test]
fn kebab_case_flags_are_accepted() {
    confconv()
        .args(["--input-format", "json", "--output-format", "toml"])
        .write_stdin(r#"{"port": 80}"#)
        .assert()
        .success()
        .stdout("port = 80\n");
}

#[test]
fn format_names_are_case_insensitive_and_accept_yml() {
    confconv()
        .args(["--input_format", "YML", "--output_format", "Json"])
        .write_stdin("a: 1\n")
        .assert()
        .success()
        .stdout(r#"{"a":1}"#);
}

#[test]
fn long_json_key_converts_to_readable_yaml() {
    let key = "k".repeat(1100);
    let yaml = confconv()
        .args(["--input_format", "json", "--output_format", "yaml"])
        .write_stdin(format!(r#"{{"{key}": 1}}"#))
        .output()
        .unwrap();
    assert!(yaml.status.success());

    confconv()
        .args(["--input_format", "yaml", "--output_format", "json"])
        .write_stdin(yaml.stdout)
        .assert()
        .success()
        .stdout(format!(r#"{{"{key}":1}}"#));
}

#[test]
fn yaml_file_to_json_file() {
    let output = temp_output("sample.json");

    confconv()
        .arg(fixture("sample.yaml"))
        .arg(&output)
        .args(["--input_format", "yaml", "--output_format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let content = std::fs::read_to_string(&output).expect("output file must exist");
    let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed["name"], "svc");
    assert_eq!(parsed["port"], 8080);
    assert_eq!(parsed["tags"], serde_json::json!(["a", "b"]));
    assert_eq!(parsed["database"]["ratio"], 0.75);

    let _ = std::fs::remove_file(&output);
}

#[test]
fn json_output_keeps_document_key_order() {
    let output = confconv()
        .arg(fixture("sample.yaml"))
        .args(["--input_format", "yaml", "--output_format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let positions: Vec<usize> = ["\"name\"", "\"port\"", "\"tags\"", "\"database\""]
        .iter()
        .map(|key| stdout.find(key).expect("key present"))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{stdout}");
}

#[test]
fn toml_file_to_yaml_stdout() {
    confconv()
        .arg(fixture("sample.toml"))
        .args(["--input_format", "toml", "--output_format", "yaml"])
        .assert()
        .success()
        .stdout(
            "title: demo\nenabled: true\nowner:\n  name: x\nitems:\n  - id: 1\n  - id: 2\n",
        );
}

#[test]
fn pretty_flag_indents_json() {
    confconv()
        .args(["--input_format", "toml", "--output_format", "json", "--pretty"])
        .write_stdin("[server]\nport = 80\n")
        .assert()
        .success()
        .stdout("{\n  \"server\": {\n    \"port\": 80\n  }\n}");
}

#[test]
fn same_format_warns_and_normalizes() {
    confconv()
        .args(["--input_format", "yaml", "--output_format", "yaml"])
        .write_stdin("a:   1\nb: [x,   y]\n")
        .assert()
        .success()
        .stdout("a: 1\nb:\n  - x\n  - y\n")
        .stderr(predicate::str::contains("formats are the same"));
}

#[test]
fn verbose_logs_summary() {
    confconv()
        .args(["-v", "--input_format", "json", "--output_format", "yaml"])
        .write_stdin("{}")
        .assert()
        .success()
        .stdout("{}\n")
        .stderr(predicate::str::contains("converted document"));
}

#[test]
fn quiet_by_default() {
    confconv()
        .args(["--input_format", "json", "--output_format", "yaml"])
        .write_stdin("[1]")
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Error taxonomy
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn null_to_toml_is_encode_error() {
    let output = temp_output("nullable.toml");

    confconv()
        .arg(fixture("nullable.json"))
        .arg(&output)
        .args(["--input_format", "json", "--output_format", "toml"])
        .assert()
        .code(4)
        .stderr(predicate::str::starts_with("EncodeError:"))
        .stderr(predicate::str::contains("unsupported null"))
        .stderr(predicate::str::contains("$.enabled"));

    assert!(!output.exists(), "no output file on encode failure");
}

#[test]
fn sequence_root_to_toml_is_encode_error() {
    confconv()
        .args(["--input_format", "json", "--output_format", "toml"])
        .write_stdin("[1, 2]")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("non-mapping root"));
}

#[test]
fn malformed_input_is_decode_error() {
    let output = temp_output("broken.json");

    confconv()
        .arg("-")
        .arg(&output)
        .args(["--input_format", "yaml", "--output_format", "json"])
        .write_stdin("key: [unclosed\n")
        .assert()
        .code(3)
        .stderr(predicate::str::starts_with("DecodeError:"))
        .stderr(predicate::str::contains("invalid yaml input"));

    assert!(!output.exists(), "no output file on decode failure");
}

#[test]
fn non_finite_float_to_json_is_encode_error() {
    confconv()
        .args(["--input_format", "yaml", "--output_format", "json"])
        .write_stdin("x: .nan\n")
        .assert()
        .code(4)
        .stderr(predicate::str::starts_with("EncodeError:"));
}

#[test]
fn missing_input_file_is_io_error() {
    confconv()
        .args([
            "/nonexistent/confconv/input.yaml",
            "--input_format",
            "yaml",
            "--output_format",
            "json",
        ])
        .assert()
        .code(5)
        .stderr(predicate::str::starts_with("IOError:"))
        .stderr(predicate::str::contains("input.yaml"));
}

#[test]
fn unwritable_output_is_io_error() {
    confconv()
        .args([
            "-",
            "/nonexistent/confconv/output.json",
            "--input_format",
            "yaml",
            "--output_format",
            "json",
        ])
        .write_stdin("a: 1\n")
        .assert()
        .code(5)
        .stderr(predicate::str::starts_with("IOError:"));
}

#[test]
fn unknown_format_is_usage_error() {
    confconv()
        .args(["--input_format", "xml", "--output_format", "json"])
        .write_stdin("<a/>")
        .assert()
        .code(2)
        .stderr(predicate::str::starts_with("UsageError:"))
        .stderr(predicate::str::contains("xml"));
}

#[test]
fn help_lists_possible_formats() {
    confconv()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("yaml, toml, json"));
}

#[test]
fn missing_format_flag_is_usage_error() {
    confconv()
        .args(["--input_format", "yaml"])
        .write_stdin("a: 1\n")
        .assert()
        .code(2)
        .stderr(predicate::str::starts_with("UsageError:"));
}

#[test]
fn help_exits_zero() {
    confconv()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--input_format"))
        .stdout(predicate::str::contains("--output_format"));
}

#[test]
fn version_exits_zero() {
    confconv()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("confconv"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Atomic writes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn failed_conversion_leaves_existing_output_untouched() {
    let output = temp_output("existing.toml");
    std::fs::write(&output, "keep = true\n").unwrap();

    confconv()
        .arg(fixture("nullable.json"))
        .arg(&output)
        .args(["--input_format", "json", "--output_format", "toml"])
        .assert()
        .code(4);

    assert_eq!(std::fs::read_to_string(&output).unwrap(), "keep = true\n");
    let _ = std::fs::remove_file(&output);
}

#[test]
fn successful_conversion_replaces_output_without_leftovers() {
    let output = temp_output("replaced.toml");
    std::fs::write(&output, "stale = 1\n").unwrap();

    confconv()
        .arg(fixture("sample.yaml"))
        .arg(&output)
        .args(["--input_format", "yaml", "--output_format", "toml"])
        .assert()
        .success();

    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.starts_with("name = \"svc\"\n"), "{content}");
    assert!(content.contains("[database]\n"), "{content}");

    let dir = output.parent().unwrap();
    let prefix = format!(".{}", output.file_name().unwrap().to_string_lossy());
    let leftovers = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(&prefix))
        .count();
    assert_eq!(leftovers, 0, "temporary file must not survive");

    let _ = std::fs::remove_file(&output);
}
