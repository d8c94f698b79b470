//! End-to-end tests for the covmerge binary

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn covmerge() -> Command {
    let mut cmd = Command::cargo_bin("covmerge").unwrap();
    cmd.env_remove("COVMERGE_GO").env_remove("COVMERGE_LOG");
    cmd
}

#[test]
fn test_help() {
    covmerge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--coverprofile"))
        .stdout(predicate::str::contains("--covermode"));
}

#[test]
fn test_version() {
    covmerge()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_coverprofile_is_usage_error() {
    covmerge()
        .arg("./...")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--coverprofile is required"))
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_empty_coverprofile_is_usage_error() {
    covmerge().args(["--coverprofile", ""]).assert().code(2);
}

#[test]
fn test_unknown_covermode_is_rejected() {
    covmerge()
        .args(["-o", "c.out", "--covermode", "often"])
        .assert()
        .failure();
}

#[cfg(unix)]
mod fake_tool {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const PROFILE_A: &str = "a.go:1.1,2.2 1 1\\nb.go:1.1,2.2 1 0\\nc.go:1.1,2.2 1 0";
    const PROFILE_B: &str = "a.go:1.1,2.2 1 0\\nb.go:1.1,2.2 1 2\\nc.go:1.1,2.2 1 0";
    const PROFILE_C: &str = "a.go:1.1,2.2 1 0\\nb.go:1.1,2.2 1 0\\nc.go:1.1,2.2 1 5";

    /// Writes a stand-in for the test tool. `list` prints `packages`; `test`
    /// writes a profile per package, `m/b` fails after writing its own, and
    /// `m/garbled` passes but leaves an unparseable profile.
    fn write_tool(dir: &Path, packages: &[&str], mode_for_c: &str) -> PathBuf {
        let script = format!(
            r#"#!/bin/sh
if [ "$1" = "list" ]; then
  printf '%s\n' {packages}
  exit 0
fi
pkg="$2"
out="$4"
case "$pkg" in
  m/a) printf 'mode: count\n{PROFILE_A}\n' > "$out"; echo "ok m/a" ;;
  m/b) printf 'mode: count\n{PROFILE_B}\n' > "$out"; echo "--- FAIL: TestB"; exit 1 ;;
  m/c) printf 'mode: {mode_for_c}\n{PROFILE_C}\n' > "$out"; echo "ok m/c" ;;
  m/garbled) printf 'not a profile\n' > "$out"; echo "ok m/garbled output" ;;
  *) echo "?   $pkg [no test files]" ;;
esac
"#,
            packages = packages.join(" "),
        );
        let path = dir.join("go");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_partial_failure_merges_all_profiles() {
        let dir = TempDir::new().unwrap();
        let tool = write_tool(dir.path(), &["m/a", "m/b", "m/c"], "count");
        let out = dir.path().join("coverage.out");

        covmerge()
            .arg("--go")
            .arg(&tool)
            .arg("--coverprofile")
            .arg(&out)
            .args(["--color", "never"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("--- FAIL: TestB"))
            .stderr(predicate::str::contains("1 of 3 packages failed"));

        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "mode: count\na.go:1.1,2.2 1 1\nb.go:1.1,2.2 1 2\nc.go:1.1,2.2 1 5\n"
        );
    }

    #[test]
    fn test_all_passing_exits_zero() {
        let dir = TempDir::new().unwrap();
        let tool = write_tool(dir.path(), &["m/a", "m/c", "m/empty"], "count");
        let out = dir.path().join("coverage.out");

        covmerge()
            .arg("--go")
            .arg(&tool)
            .arg("-o")
            .arg(&out)
            .arg("-q")
            .assert()
            .success();

        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "mode: count\na.go:1.1,2.2 1 1\nb.go:1.1,2.2 1 0\nc.go:1.1,2.2 1 5\n"
        );
    }

    #[test]
    fn test_unparseable_profile_echoes_output_and_fails() {
        let dir = TempDir::new().unwrap();
        let tool = write_tool(dir.path(), &["m/a", "m/garbled"], "count");
        let out = dir.path().join("coverage.out");

        covmerge()
            .arg("--go")
            .arg(&tool)
            .arg("-o")
            .arg(&out)
            .assert()
            .code(1)
            .stdout(predicate::str::contains("ok m/garbled output"))
            .stdout(predicate::str::contains("ok m/a").not())
            .stderr(predicate::str::contains("unreadable profile"));

        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "mode: count\na.go:1.1,2.2 1 1\nb.go:1.1,2.2 1 0\nc.go:1.1,2.2 1 0\n"
        );
    }

    #[test]
    fn test_mode_mismatch_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let tool = write_tool(dir.path(), &["m/a", "m/c"], "set");
        let out = dir.path().join("coverage.out");
        std::fs::write(&out, "mode: count\nstale.go:1.1,2.2 1 9\n").unwrap();

        covmerge()
            .arg("--go")
            .arg(&tool)
            .arg("-o")
            .arg(&out)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("mode mismatch"));

        assert!(!out.exists());
    }

    #[test]
    fn test_empty_resolution_writes_empty_profile() {
        let dir = TempDir::new().unwrap();
        let tool = write_tool(dir.path(), &[], "count");
        let out = dir.path().join("coverage.out");

        covmerge()
            .arg("--go")
            .arg(&tool)
            .arg("-o")
            .arg(&out)
            .assert()
            .success();

        assert_eq!(std::fs::read_to_string(&out).unwrap(), "");
    }

    #[test]
    fn test_empty_resolution_with_covermode_writes_header() {
        let dir = TempDir::new().unwrap();
        let tool = write_tool(dir.path(), &[], "count");
        let out = dir.path().join("coverage.out");

        covmerge()
            .env("COVMERGE_GO", &tool)
            .arg("-o")
            .arg(&out)
            .args(["--covermode", "atomic"])
            .assert()
            .success();

        assert_eq!(std::fs::read_to_string(&out).unwrap(), "mode: atomic\n");
    }

    #[test]
    fn test_race_with_non_atomic_mode_is_rejected() {
        let dir = TempDir::new().unwrap();
        let tool = write_tool(dir.path(), &["m/a"], "count");
        let out = dir.path().join("coverage.out");

        covmerge()
            .arg("--go")
            .arg(&tool)
            .arg("-o")
            .arg(&out)
            .args(["--race", "--covermode", "set"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("atomic"));

        assert!(!out.exists());
    }

    #[test]
    fn test_missing_tool_is_resolution_error() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("coverage.out");

        covmerge()
            .args(["--go", "/nonexistent/covmerge-go"])
            .arg("-o")
            .arg(&out)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Failed to resolve packages"));

        assert!(!out.exists());
    }
}
