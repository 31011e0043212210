//! Integration tests for layered config loading through the binary.
//!
//! Precedence under test: defaults < config file < TERMKIT_* env vars.
//! Loading is infallible; bad keys warn on stderr and keep defaults.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn termkit_with_config(path: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("termkit").expect("binary builds");
    cmd.arg("--config").arg(path);
    for (key, _) in std::env::vars_os() {
        if key.to_string_lossy().starts_with("TERMKIT_") {
            cmd.env_remove(key);
        }
    }
    cmd
}

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write config");
    file
}

#[test]
fn given_config_file_when_showing_then_values_from_file_win() {
    let file = config_file(
        "[network]\ntimeout_secs = 25\nmax_retries = 7\n\n[security]\npassword_length = 20\n",
    );

    termkit_with_config(file.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("timeout_secs = 25"))
        .stdout(predicate::str::contains("max_retries = 7"))
        .stdout(predicate::str::contains("password_length = 20"));
}

#[test]
fn given_type_mismatch_when_showing_then_warns_and_uses_default() {
    let file = config_file("[network]\ntimeout_secs = \"fast\"\n");

    termkit_with_config(file.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Warning"))
        .stderr(predicate::str::contains("network.timeout_secs"))
        .stdout(predicate::str::contains("timeout_secs = 10"));
}

#[test]
fn given_missing_and_empty_file_when_showing_then_output_is_identical() {
    let empty = config_file("");

    let from_empty = termkit_with_config(empty.path())
        .args(["config", "show"])
        .assert()
        .success();
    let from_missing = termkit_with_config(std::path::Path::new("/nonexistent/termkit.toml"))
        .args(["config", "show"])
        .assert()
        .success();

    assert_eq!(
        from_empty.get_output().stdout,
        from_missing.get_output().stdout
    );
}

#[test]
fn given_env_override_when_file_also_sets_key_then_env_wins() {
    let file = config_file("[network]\ntimeout_secs = 25\n");

    termkit_with_config(file.path())
        .env("TERMKIT_NETWORK__TIMEOUT_SECS", "99")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("timeout_secs = 99"));
}

#[test]
fn given_init_when_target_missing_then_template_written() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("termkit.toml");

    termkit_with_config(&target)
        .args(["config", "init"])
        .assert()
        .success();

    let written = std::fs::read_to_string(&target).expect("template exists");
    assert!(written.contains("[network]"));
    assert!(written.contains("timeout_secs"));
}

#[test]
fn given_init_when_target_exists_then_refuses_without_force() {
    let file = config_file("[network]\ntimeout_secs = 25\n");

    termkit_with_config(file.path())
        .args(["config", "init"])
        .assert()
        .code(65)
        .stderr(predicate::str::contains("already exists"));

    termkit_with_config(file.path())
        .args(["config", "init", "--force"])
        .assert()
        .success();
    let written = std::fs::read_to_string(file.path()).expect("read back");
    assert!(written.contains("# termkit configuration"));
}

#[test]
fn given_config_path_when_run_then_candidate_locations_listed() {
    let file = config_file("");

    termkit_with_config(file.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("exists"));
}
