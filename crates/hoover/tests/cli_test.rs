//! Integration tests for the `hoover` CLI binary.
//!
//! These tests cover argument parsing, help output, shell completions,
//! config management, and whole capture runs against stand-in `ip`,
//! `iw` and `tshark` scripts.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `hoover` binary with env isolation.
///
/// Clears all `HOOVER_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn hoover_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("hoover");
    cmd.env("HOME", "/tmp/hoover-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/hoover-cli-test-nonexistent")
        .env_remove("HOOVER_PROFILE")
        .env_remove("HOOVER_CONFIG")
        .env_remove("HOOVER_OUTPUT")
        .env_remove("HOOVER_INTERFACE")
        .env_remove("HOOVER_TSHARK")
        .env_remove("HOOVER_DEFAULT_PROFILE")
        .env_remove("HOOVER_DEFAULTS__DWELL")
        .env_remove("RUST_LOG");
    cmd
}

/// `hoover_cmd()` reading and writing the config file at `path`.
fn hoover_with_config(path: &Path) -> assert_cmd::Command {
    let mut cmd = hoover_cmd();
    cmd.arg("--config").arg(path);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = hoover_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    hoover_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("probe requests")
            .and(predicate::str::contains("run"))
            .and(predicate::str::contains("channels"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    hoover_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hoover"));
}

#[test]
fn test_run_help_lists_capture_flags() {
    hoover_cmd().args(["run", "--help"]).assert().success().stdout(
        predicate::str::contains("--interface")
            .and(predicate::str::contains("--dwell"))
            .and(predicate::str::contains("--channels"))
            .and(predicate::str::contains("--tshark")),
    );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    hoover_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    hoover_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = hoover_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_run_without_interface() {
    let dir = tempfile::tempdir().unwrap();
    let output = hoover_with_config(&dir.path().join("config.toml"))
        .arg("run")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(
        text.contains("No interface configured"),
        "Expected missing interface error:\n{text}"
    );
}

#[test]
fn test_run_with_missing_tshark() {
    let dir = tempfile::tempdir().unwrap();
    let output = hoover_with_config(&dir.path().join("config.toml"))
        .args(["run", "-i", "wlan0", "--tshark", "/nonexistent/bin/tshark"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(5));
    let text = combined_output(&output);
    assert!(
        text.contains("tshark not found"),
        "Expected missing tool error:\n{text}"
    );
}

#[test]
fn test_run_rejects_zero_dwell() {
    let dir = tempfile::tempdir().unwrap();
    let output = hoover_with_config(&dir.path().join("config.toml"))
        .args(["run", "-i", "wlan0", "--dwell", "0s"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("dwell"));
}

#[test]
fn test_run_rejects_bad_channel_plan() {
    let dir = tempfile::tempdir().unwrap();
    let output = hoover_with_config(&dir.path().join("config.toml"))
        .args(["run", "-i", "wlan0", "--channels", "11-1"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("channels"));
}

#[test]
fn test_unknown_profile() {
    let dir = tempfile::tempdir().unwrap();
    let output = hoover_with_config(&dir.path().join("config.toml"))
        .args(["--profile", "office", "run", "-i", "wlan0"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("office"));
}

// ── Capture with stand-in tools ─────────────────────────────────────

/// Write an executable shell script named `name` into `dir`.
#[cfg(target_os = "linux")]
fn script(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// `hoover run` against scripts that accept every radio command and a
/// tshark running `capture` as its script body.
#[cfg(target_os = "linux")]
fn run_with_fake_tools(dir: &Path, capture: &str) -> assert_cmd::Command {
    let ip = script(dir, "ip", "exit 0");
    let iw = script(dir, "iw", "exit 0");
    let tshark = script(dir, "tshark", capture);

    let mut cmd = hoover_with_config(&dir.join("config.toml"));
    cmd.args(["run", "-i", "wlan0", "--dwell", "100ms", "--color", "never"])
        .arg("--ip")
        .arg(ip)
        .arg("--iw")
        .arg(iw)
        .arg("--tshark")
        .arg(tshark);
    cmd
}

#[cfg(target_os = "linux")]
#[test]
fn test_run_reports_pairs_until_capture_ends() {
    let dir = tempfile::tempdir().unwrap();
    run_with_fake_tools(
        dir.path(),
        r"printf 'aa:bb:cc:dd:ee:ff,Home\nnoise\naa:bb:cc:dd:ee:ff,Home\n11:22:33:44:55:66,Caf\351\n'",
    )
    .args(["-o", "plain"])
    .assert()
    .success()
    .stdout(
        predicate::str::contains("aa:bb:cc:dd:ee:ff,Home")
            .and(predicate::str::contains("11:22:33:44:55:66,Caf")),
    )
    .stderr(predicate::str::contains("capture ended: 2 pairs"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_log_lines_shows_capture_lines_without_verbose() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_with_fake_tools(dir.path(), "echo 'aa:bb:cc:dd:ee:ff,Home'")
        .arg("--log-lines")
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("capture line") && stderr.contains("aa:bb:cc:dd:ee:ff,Home"),
        "Expected per-line log records on stderr:\n{stderr}"
    );
}

#[cfg(target_os = "linux")]
#[test]
fn test_capture_lines_are_quiet_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_with_fake_tools(dir.path(), "echo 'aa:bb:cc:dd:ee:ff,Home'")
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(!String::from_utf8_lossy(&output.stderr).contains("capture line"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_failing_capture_exits_with_capture_code() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_with_fake_tools(dir.path(), "echo 'aa:bb:cc:dd:ee:ff,Home'\nexit 2")
        .args(["-o", "plain"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("aa:bb:cc:dd:ee:ff,Home"));
}

// ── Channels ────────────────────────────────────────────────────────

#[test]
fn test_channels_from_flag_plain() {
    hoover_cmd()
        .args(["channels", "--channels", "1-3,6", "-o", "plain"])
        .assert()
        .success()
        .stdout("1,2,3,6\n");
}

#[test]
fn test_channels_json_names_source() {
    hoover_cmd()
        .args(["channels", "-c", "36", "-o", "json"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains(r#""source": "flag""#)
                .and(predicate::str::contains(r#""channels": ["#)),
        );
}

#[test]
fn test_channels_follow_profile() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "default_profile = \"lab\"\n\n[profiles.lab]\ninterface = \"wlan1\"\nchannels = \"1,6,11\"\n",
    )
    .unwrap();

    hoover_with_config(&path)
        .args(["channels", "-o", "plain"])
        .assert()
        .success()
        .stdout("1,6,11\n");
}

// ── Config management ───────────────────────────────────────────────

#[test]
fn test_config_path_honours_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    hoover_with_config(&path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn test_config_init_then_profiles() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    hoover_with_config(&path)
        .args(["config", "init", "-i", "wlan0", "--name", "lab", "-c", "1,6,11"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Configuration written"));

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("default_profile = \"lab\""), "{written}");
    assert!(written.contains("interface = \"wlan0\""), "{written}");

    hoover_with_config(&path)
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout("lab *\n");
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    hoover_with_config(&path)
        .args(["config", "init", "-i", "wlan0"])
        .assert()
        .success();

    let output = hoover_with_config(&path)
        .args(["config", "init", "-i", "wlan1"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("already exists"));

    hoover_with_config(&path)
        .args(["config", "init", "-i", "wlan1", "--force"])
        .assert()
        .success();
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("wlan1"), "{written}");
}

#[test]
fn test_config_use_switches_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "default_profile = \"a\"\n\n[profiles.a]\ninterface = \"wlan0\"\n\n[profiles.b]\ninterface = \"wlan1\"\n",
    )
    .unwrap();

    hoover_with_config(&path)
        .args(["config", "use", "b"])
        .assert()
        .success();

    hoover_with_config(&path)
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout("a\nb *\n");

    let output = hoover_with_config(&path)
        .args(["config", "use", "missing"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("missing"));
}

#[test]
fn test_config_show_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[profiles.lab]\ninterface = \"wlan1\"\n").unwrap();

    hoover_with_config(&path)
        .args(["config", "show", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""interface": "wlan1""#));
}
