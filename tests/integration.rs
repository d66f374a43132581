#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;

/// Records its working directory and arguments, one per line, then exits with
/// `$NPW_TEST_EXIT`.
const RECORDING_NPM: &str = r#"#!/bin/sh
printf '%s\n' "$(pwd -P)" "$@" > "$NPW_TEST_LOG"
exit "${NPW_TEST_EXIT:-0}"
"#;

/// Waits until interrupted, then exits cleanly.
const PATIENT_NPM: &str = r#"#!/bin/sh
trap 'echo interrupted > "$NPW_TEST_LOG"; exit 0' INT
touch "$NPW_TEST_READY"
while :; do sleep 1; done
"#;

struct Fixture {
    _tmp: tempfile::TempDir,
    root: PathBuf,
    bin: PathBuf,
    log: PathBuf,
}

impl Fixture {
    fn new(npm_script: &str) -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().canonicalize().unwrap();
        let root = base.join("ws");
        std::fs::create_dir_all(root.join("pkgs/foo/src")).unwrap();
        std::fs::write(
            root.join("package.json"),
            r#"{"name": "ws", "private": true, "workspaces": ["pkgs/*"]}"#,
        )
        .unwrap();
        std::fs::write(root.join("pkgs/foo/package.json"), r#"{"name": "foo"}"#).unwrap();

        let bin = base.join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let npm = bin.join("npm");
        std::fs::write(&npm, npm_script).unwrap();
        std::fs::set_permissions(&npm, std::fs::Permissions::from_mode(0o755)).unwrap();

        let log = base.join("npm.log");
        Self {
            _tmp: tmp,
            root,
            bin,
            log,
        }
    }

    fn npw(&self, cwd: &Path, args: &[&str]) -> Command {
        let path = std::env::var("PATH").unwrap_or_default();
        let mut command = Command::new(env!("CARGO_BIN_EXE_npw"));
        command
            .args(args)
            .current_dir(cwd)
            .env("PATH", format!("{}:{path}", self.bin.display()))
            .env("NPW_TEST_LOG", &self.log)
            .env_remove("RUST_LOG");
        command
    }

    fn recorded(&self) -> Vec<String> {
        std::fs::read_to_string(&self.log)
            .unwrap()
            .lines()
            .map(ToString::to_string)
            .collect()
    }
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_scoped_run_from_package() {
    let fx = Fixture::new(RECORDING_NPM);
    let output = fx
        .npw(&fx.root.join("pkgs/foo"), &["run", "build"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let recorded = fx.recorded();
    assert_eq!(recorded[0], fx.root.display().to_string());
    assert_eq!(recorded[1..], ["run", "-w", "pkgs/foo", "build"]);
}

#[test]
fn test_scope_from_nested_directory() {
    let fx = Fixture::new(RECORDING_NPM);
    let output = fx
        .npw(&fx.root.join("pkgs/foo/src"), &["test"])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(fx.recorded()[1..], ["test", "-w", "pkgs/foo/src"]);
}

#[test]
fn test_unscoped_run_from_root() {
    let fx = Fixture::new(RECORDING_NPM);
    let output = fx
        .npw(&fx.root, &["run", "lint", "--", "--fix"])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(fx.recorded()[1..], ["run", "lint", "--", "--fix"]);
}

#[test]
fn test_child_exit_code_propagates() {
    let fx = Fixture::new(RECORDING_NPM);
    let output = fx
        .npw(&fx.root.join("pkgs/foo"), &["-q", "test"])
        .env("NPW_TEST_EXIT", "3")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    assert_eq!(stderr(&output), "");
}

#[test]
fn test_announces_unless_quiet() {
    let fx = Fixture::new(RECORDING_NPM);
    let cwd = fx.root.join("pkgs/foo");

    let loud = fx.npw(&cwd, &["run", "build"]).output().unwrap();
    assert_eq!(
        stderr(&loud).trim_end(),
        format!("❱ npm run -w pkgs/foo build (in {})", fx.root.display())
    );

    let quiet = fx.npw(&cwd, &["--quiet", "run", "build"]).output().unwrap();
    assert_eq!(stderr(&quiet), "");
}

#[test]
fn test_run_through_shell() {
    let fx = Fixture::new(RECORDING_NPM);
    let output = fx
        .npw(&fx.root.join("pkgs/foo"), &["-q", "--shell", "run", "build"])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(fx.recorded()[1..], ["run", "-w", "pkgs/foo", "build"]);
}

#[test]
fn test_no_command_is_usage_error() {
    let fx = Fixture::new(RECORDING_NPM);
    let output = fx.npw(&fx.root, &["-q"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Usage"));
    assert!(!fx.log.exists());
}

#[test]
fn test_root_not_found() {
    let fx = Fixture::new(RECORDING_NPM);
    let outside = fx.root.parent().unwrap().join("elsewhere");
    std::fs::create_dir_all(&outside).unwrap();
    let output = fx.npw(&outside, &["test"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to find workspace root"));
    assert!(!fx.log.exists());
}

#[test]
fn test_missing_package_manager_is_reported() {
    let fx = Fixture::new(RECORDING_NPM);
    let output = Command::new(env!("CARGO_BIN_EXE_npw"))
        .args(["-q", "test"])
        .current_dir(&fx.root)
        .env("PATH", fx.root.join("no-such-dir"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("failed to start `npm`"));
}

#[test]
fn test_interrupt_is_forwarded_and_exits_2() {
    let fx = Fixture::new(PATIENT_NPM);
    let ready = fx.root.parent().unwrap().join("ready");
    let mut child = fx
        .npw(&fx.root.join("pkgs/foo"), &["-q", "start"])
        .env("NPW_TEST_READY", &ready)
        .stdin(Stdio::null())
        .spawn()
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    while !ready.exists() {
        assert!(Instant::now() < deadline, "npm never started");
        std::thread::sleep(Duration::from_millis(20));
    }

    let pid = Pid::from_raw(i32::try_from(child.id()).unwrap());
    kill(pid, Signal::SIGINT).unwrap();
    let status = child.wait().unwrap();

    // npm exits 0 after the forwarded interrupt, but npw still reports 2
    assert_eq!(status.code(), Some(2));
    assert_eq!(fx.recorded(), ["interrupted"]);
}
