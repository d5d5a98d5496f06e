//! CLI tests for `isobench run` and `isobench render`.
//!
//! Spawns the binary against a config that runs templates with `sh` and checks
//! stdout and the exit codes.

#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use isobench::exit_codes;
use isobench::test_support::entry_count;

fn write_workspace(root: &Path, template: &str) {
    fs::create_dir_all(root.join("scripts")).expect("scripts dir");
    fs::write(root.join("runner.sh.j2"), template).expect("template");
    fs::write(
        root.join("isobench.toml"),
        concat!(
            "runtime = \"sh\"\n",
            "template = \"runner.sh.j2\"\n",
            "script_dir = \"scripts\"\n",
            "script_suffix = \".sh\"\n",
            "bootstrap = \"vendor/autoload.sh\"\n",
        ),
    )
    .expect("config");
}

fn isobench(root: &Path, command: &str, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_isobench"))
        .current_dir(root)
        .arg(command)
        .args([
            "--unit",
            "SortBench",
            "--file",
            "bench/SortBench.sh",
            "--subject",
            "benchSort",
        ])
        .args(extra)
        .output()
        .expect("run isobench")
}

#[test]
fn run_prints_result_json() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_workspace(
        temp.path(),
        "printf '{\"time\":%s,\"memory\":4096}' {{ revolutions }}\n",
    );

    let output = isobench(temp.path(), "run", &["--revolutions", "120"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(result, serde_json::json!({"time": 120.0, "memory": 4096.0}));
    assert_eq!(entry_count(&temp.path().join("scripts")), 0);
}

#[test]
fn failing_subject_exits_with_subject_failed() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_workspace(temp.path(), "echo 'fatal' >&2\nexit 1\n");

    let output = isobench(temp.path(), "run", &[]);

    assert_eq!(output.status.code(), Some(exit_codes::SUBJECT_FAILED));
    assert!(String::from_utf8_lossy(&output.stderr).contains("fatal"));
    assert_eq!(entry_count(&temp.path().join("scripts")), 0);
}

#[test]
fn unknown_hook_exits_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_workspace(temp.path(), "exit 0\n");

    let output = isobench(temp.path(), "run", &["--before", "setUp"]);

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown before method \"setUp\""));
}

#[test]
fn render_resolves_bootstrap_against_config_dir() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_workspace(
        temp.path(),
        "{% if bootstrap %}. {{ bootstrap }}\n{% endif %}hooks={{ before_hooks }}\n",
    );

    let output = isobench(
        temp.path(),
        "render",
        &["--method", "setUp", "--before", "setUp"],
    );

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let script = String::from_utf8(output.stdout).expect("utf8");
    let first_line = script.lines().next().expect("bootstrap line");
    assert!(first_line.starts_with(". \"/"), "bootstrap not absolute: {first_line}");
    assert!(first_line.ends_with("/vendor/autoload.sh\""));
    assert!(script.contains("hooks=[\"setUp\"]"));
    assert_eq!(entry_count(&temp.path().join("scripts")), 0);
}
