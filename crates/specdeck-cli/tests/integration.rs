#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn specdeck(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("specdeck").unwrap();
    cmd.current_dir(dir.path())
        .env("SPECDECK_ROOT", dir.path())
        .env_remove("SPECIFY_PATH")
        .env_remove("RUST_LOG");
    cmd
}

fn scaffold(root: &Path) {
    for dir in [
        ".specify/templates/commands",
        ".specify/memory",
        ".specify/specs/001-login",
    ] {
        std::fs::create_dir_all(root.join(dir)).unwrap();
    }
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}): {}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

// ---------------------------------------------------------------------------
// specdeck status
// ---------------------------------------------------------------------------

#[test]
fn status_of_empty_workspace_is_uninitialized() {
    let dir = TempDir::new().unwrap();
    let v = json_stdout(specdeck(&dir).args(["status", "--json"]));
    assert_eq!(v["isInitialized"], false);
    assert_eq!(v["hasConstitution"], false);
    assert_eq!(v["hasSpecification"], false);
    assert_eq!(v["hasPlan"], false);
    assert_eq!(v["hasTasks"], false);
}

#[test]
fn status_reports_artifacts() {
    let dir = TempDir::new().unwrap();
    scaffold(dir.path());
    std::fs::write(
        dir.path().join(".specify/memory/constitution.md"),
        "# Constitution\n".repeat(20),
    )
    .unwrap();
    std::fs::write(dir.path().join(".specify/specs/001-login/spec.md"), "# Spec").unwrap();
    std::fs::write(dir.path().join(".specify/specs/001-login/plan.md"), "# Plan").unwrap();

    let v = json_stdout(specdeck(&dir).args(["status", "--json"]));
    assert_eq!(v["isInitialized"], true);
    assert_eq!(v["hasConstitution"], true);
    assert_eq!(v["hasSpecification"], true);
    assert_eq!(v["hasPlan"], true);
    assert_eq!(v["hasTasks"], false);
}

#[test]
fn status_treats_short_constitution_as_missing() {
    let dir = TempDir::new().unwrap();
    scaffold(dir.path());
    std::fs::write(
        dir.path().join(".specify/memory/constitution.md"),
        "x".repeat(40),
    )
    .unwrap();

    let v = json_stdout(specdeck(&dir).args(["status", "--json"]));
    assert_eq!(v["isInitialized"], true);
    assert_eq!(v["hasConstitution"], false);
}

#[test]
fn status_human_output() {
    let dir = TempDir::new().unwrap();
    specdeck(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not initialized"));

    scaffold(dir.path());
    specdeck(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("constitution"))
        .stdout(predicate::str::contains("PRESENT"));
}

// ---------------------------------------------------------------------------
// specdeck config
// ---------------------------------------------------------------------------

#[test]
fn config_validate_defaults_is_clean() {
    let dir = TempDir::new().unwrap();
    specdeck(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn config_validate_flags_unreachable_executable() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".specdeck.yaml"), "auto_detect: false\n").unwrap();
    specdeck(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error]"))
        .stderr(predicate::str::contains("config validation found errors"));
}

#[test]
fn config_show_applies_overrides() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(".specdeck.yaml"),
        "command_timeout_secs: 30\nwatch:\n  debounce_ms: 500\n",
    )
    .unwrap();

    let v = json_stdout(specdeck(&dir).args(["config", "show", "--json"]));
    assert_eq!(v["command_timeout_secs"], 30);
    assert_eq!(v["watch"]["debounce_ms"], 500);

    let v = json_stdout(specdeck(&dir).args(["config", "show", "--json", "--timeout", "7"]));
    assert_eq!(v["command_timeout_secs"], 7);
}

#[test]
fn malformed_settings_fail_loudly() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".specdeck.yaml"), "command_timeout_secs: [oops\n").unwrap();
    specdeck(&dir)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}

// ---------------------------------------------------------------------------
// specdeck detect / init / check / version
// ---------------------------------------------------------------------------

#[test]
fn detect_fails_when_nothing_can_be_found() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".specdeck.yaml"), "auto_detect: false\n").unwrap();
    specdeck(&dir)
        .arg("detect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn init_requires_name_or_here() {
    let dir = TempDir::new().unwrap();
    specdeck(&dir)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--here"));
}

#[test]
fn init_rejects_unknown_script_kind() {
    let dir = TempDir::new().unwrap();
    specdeck(&dir)
        .args(["init", "--here", "--script", "bash"])
        .assert()
        .failure();
}

#[cfg(unix)]
mod with_fake_specify {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    const FAKE_SPECIFY: &str = r#"#!/bin/sh
case "$1" in
  --help) echo "Usage: specify [OPTIONS] COMMAND"; exit 0 ;;
  version)
    printf '\033[1;36m\342\226\210\342\226\210\342\226\210\342\226\210\342\226\210\342\226\210\033[0m\n'
    printf '\033[32mspecify-cli 1.2.3\033[0m\n'
    exit 0 ;;
  check)
    if [ -n "$FAKE_SPECIFY_SLOW" ]; then sleep 5; fi
    printf '\033[31mgit not found\033[0m\n' >&2
    exit 2 ;;
  init)
    mkdir -p .specify/templates/commands .specify/memory .specify/specs
    echo "args: $*"
    exit 0 ;;
esac
exit 0
"#;

    fn install(dir: &TempDir) -> PathBuf {
        let bin = dir.path().join("tools");
        std::fs::create_dir_all(&bin).unwrap();
        let exe = bin.join("specify");
        std::fs::write(&exe, FAKE_SPECIFY).unwrap();
        let mut perms = std::fs::metadata(&exe).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&exe, perms).unwrap();
        exe
    }

    #[test]
    fn detect_uses_specify_path() {
        let dir = TempDir::new().unwrap();
        let exe = install(&dir);
        let v = json_stdout(
            specdeck(&dir)
                .env("SPECIFY_PATH", &exe)
                .args(["detect", "--json"]),
        );
        assert_eq!(v["found"], true);
        assert_eq!(v["path"], exe.display().to_string());
        assert_eq!(v["version"], "1.2.3");
    }

    #[test]
    fn version_output_is_sanitized() {
        let dir = TempDir::new().unwrap();
        let exe = install(&dir);
        specdeck(&dir)
            .arg("--specify-path")
            .arg(&exe)
            .arg("version")
            .assert()
            .success()
            .stdout("specify-cli 1.2.3\n");
    }

    #[test]
    fn failed_check_exits_nonzero_with_reason() {
        let dir = TempDir::new().unwrap();
        let exe = install(&dir);
        let v = json_stdout(
            specdeck(&dir)
                .env("SPECIFY_PATH", &exe)
                .args(["check", "--json"]),
        );
        assert_eq!(v["success"], false);
        assert_eq!(v["exitCode"], 2);
        assert_eq!(v["failure"], "exit_status");

        specdeck(&dir)
            .env("SPECIFY_PATH", &exe)
            .arg("check")
            .assert()
            .failure()
            .stderr(predicate::str::contains("git not found"));
    }

    #[test]
    fn slow_check_times_out_with_hint() {
        let dir = TempDir::new().unwrap();
        let exe = install(&dir);
        specdeck(&dir)
            .env("SPECIFY_PATH", &exe)
            .env("FAKE_SPECIFY_SLOW", "1")
            .args(["check", "--timeout", "1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("timed out after 1s"));
    }

    #[test]
    fn init_here_passes_flags_and_initializes() {
        let dir = TempDir::new().unwrap();
        let exe = install(&dir);
        specdeck(&dir)
            .env("SPECIFY_PATH", &exe)
            .args(["init", "--here", "--ai", "claude", "--no-git"])
            .assert()
            .success()
            .stdout(predicate::str::contains("args: init --here --ai claude --no-git"));

        let v = json_stdout(specdeck(&dir).args(["status", "--json"]));
        assert_eq!(v["isInitialized"], true);
    }
}
