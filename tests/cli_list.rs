//! CLI flows that run without a terminal: `list`, `init`, `completions`,
//! and the failure path of the interactive picker.

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

mod util;

use util::{hours, make_tries};

#[allow(deprecated)]
fn base_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("try").unwrap();
    cmd.env("TRY_CONFIG", home.path().join("config.toml"))
        .env_remove("TRY_PATH")
        .env_remove("TRY_LOG")
        .env_remove("RUST_LOG")
        .current_dir(home.path());
    cmd
}

fn seeded() -> (TempDir, std::path::PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("tries");
    make_tries(
        &root,
        &[
            ("2025-01-01-alpha", hours(72)),
            ("2025-01-02-beta", hours(1)),
            ("2025-01-03-api-client", hours(24)),
            (".archive", hours(0)),
        ],
    );
    std::fs::write(root.join("notes.txt"), "not a directory").unwrap();
    (tmp, root)
}

#[test]
fn list_without_query_orders_by_recency() {
    let (tmp, root) = seeded();
    let out = base_cmd(&tmp)
        .arg("--path")
        .arg(&root)
        .arg("list")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(out).unwrap();
    let names: Vec<&str> = text
        .lines()
        .map(|l| l.split('\t').next().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["2025-01-02-beta", "2025-01-03-api-client", "2025-01-01-alpha"]
    );
}

#[test]
fn list_json_carries_scores_and_positions() {
    let (tmp, root) = seeded();
    let out = base_cmd(&tmp)
        .args(["--path", root.to_str().unwrap(), "list", "--json", "api"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&out).unwrap();
    let hits = json.as_array().unwrap();
    assert!(!hits.is_empty());
    let top = &hits[0];
    assert_eq!(top["name"], "2025-01-03-api-client");
    assert_eq!(top["base_name"], "api-client");
    assert_eq!(top["date_prefix"], "2025-01-03");
    assert_eq!(top["positions"].as_array().unwrap().len(), 3);
    let score = top["score"].as_f64().unwrap();
    let fuzzy = top["fuzzy_score"].as_f64().unwrap();
    let time = top["time_score"].as_f64().unwrap();
    assert!((score - (0.7 * fuzzy + 0.3 * time)).abs() < 1e-9);
}

#[test]
fn list_with_unmatched_query_is_empty_not_an_error() {
    let (tmp, root) = seeded();
    base_cmd(&tmp)
        .args(["--path", root.to_str().unwrap(), "list", "zzzq"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn list_respects_limit() {
    let (tmp, root) = seeded();
    let out = base_cmd(&tmp)
        .args(["--path", root.to_str().unwrap(), "list", "--limit", "1"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
}

#[test]
fn missing_root_lists_nothing() {
    let tmp = TempDir::new().unwrap();
    base_cmd(&tmp)
        .args(["--path", tmp.path().join("nowhere").to_str().unwrap(), "list"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn root_comes_from_env_then_config() {
    let (tmp, root) = seeded();
    base_cmd(&tmp)
        .env("TRY_PATH", &root)
        .arg("list")
        .assert()
        .success()
        .stdout(contains("2025-01-02-beta"));

    std::fs::write(
        tmp.path().join("config.toml"),
        format!("path = {:?}\n", root.to_str().unwrap()),
    )
    .unwrap();
    base_cmd(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(contains("2025-01-01-alpha"));
}

#[test]
fn malformed_config_fails_with_path_in_message() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("config.toml"), "path = [").unwrap();
    base_cmd(&tmp)
        .arg("list")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(contains("error: parsing config"));
}

#[test]
fn exec_without_terminal_fails_and_keeps_stdout_clean() {
    let (tmp, root) = seeded();
    base_cmd(&tmp)
        .args(["--path", root.to_str().unwrap(), "exec", "beta"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(contains("needs a terminal"));
}

#[test]
fn init_prints_wrapper_for_each_shell() {
    let tmp = TempDir::new().unwrap();
    for (shell, head) in [("bash", "try() {"), ("zsh", "try() {"), ("fish", "function try")] {
        base_cmd(&tmp)
            .args(["init", "--shell", shell])
            .assert()
            .success()
            .stdout(predicate::str::starts_with(head))
            .stdout(contains("exec"));
    }
}

#[test]
fn unknown_shell_is_a_usage_error() {
    let tmp = TempDir::new().unwrap();
    base_cmd(&tmp)
        .args(["init", "--shell", "tcsh"])
        .assert()
        .code(2);
}

#[test]
fn completions_are_generated() {
    let tmp = TempDir::new().unwrap();
    base_cmd(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(contains("_try"));
}
