//! Per-package test execution
//!
//! One package run moves from pending to exactly one terminal state:
//!
//! ```text
//! pending ─┬─► no-tests          (exit 0, no profile written)
//!          ├─► passed            (exit 0, profile written)
//!          ├─► failed            (exit ≠ 0, partial profile written)
//!          └─► execution-error   (could not start, exit ≠ 0 without a profile,
//!                                 or the profile could not be read)
//! ```
//!
//! Every state but execution-error may carry a profile into the merge.

use crate::config::RunConfig;
use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tracing::debug;

/// Name of the raw profile inside a run's scratch directory
const PROFILE_FILE: &str = "profile.out";

/// Terminal state of a package run, with the data it produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The package has no tests
    NoTests,
    /// Tests passed
    Passed {
        /// Raw profile text
        profile: String,
    },
    /// Tests ran and at least one failed
    Failed {
        /// Raw (partial) profile text
        profile: String,
    },
    /// The test process could not be run to completion
    ExecutionError {
        /// Error message
        message: String,
    },
}

/// Summary status of a package run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageStatus {
    /// The package has no tests
    NoTests,
    /// Tests passed
    Passed,
    /// Tests failed
    Failed,
    /// The run could not complete, or its profile was unreadable
    ExecutionError,
}

impl PackageStatus {
    /// Whether this status makes the overall run fail
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Failed | Self::ExecutionError)
    }
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoTests => "no-tests",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::ExecutionError => "execution-error",
        })
    }
}

/// Output captured from a quiet child process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Child stdout
    pub stdout: Vec<u8>,
    /// Child stderr
    pub stderr: Vec<u8>,
}

impl CapturedOutput {
    /// Whether nothing was captured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }
}

/// Result of running one package
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Package identifier
    pub package: String,
    /// Terminal state
    pub outcome: RunOutcome,
    /// Captured child output; `None` when it was streamed or empty.
    /// Replayed only if the run ends up failing.
    pub output: Option<CapturedOutput>,
    /// Wall time of the run
    pub duration: Duration,
}

impl RunResult {
    /// Create a result without captured output
    #[must_use]
    pub fn new(package: impl Into<String>, outcome: RunOutcome, duration: Duration) -> Self {
        Self {
            package: package.into(),
            outcome,
            output: None,
            duration,
        }
    }

    /// Attach captured output
    #[must_use]
    pub fn with_output(mut self, output: CapturedOutput) -> Self {
        self.output = Some(output);
        self
    }

    /// Whether the test tool reported success
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.outcome, RunOutcome::NoTests | RunOutcome::Passed { .. })
    }

    /// Raw profile text, if the run produced one
    #[must_use]
    pub fn profile(&self) -> Option<&str> {
        match &self.outcome {
            RunOutcome::Passed { profile } | RunOutcome::Failed { profile } => Some(profile),
            RunOutcome::NoTests | RunOutcome::ExecutionError { .. } => None,
        }
    }

    /// Error message, if the run could not complete
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            RunOutcome::ExecutionError { message } => Some(message),
            _ => None,
        }
    }

    /// Summary status
    #[must_use]
    pub const fn status(&self) -> PackageStatus {
        match self.outcome {
            RunOutcome::NoTests => PackageStatus::NoTests,
            RunOutcome::Passed { .. } => PackageStatus::Passed,
            RunOutcome::Failed { .. } => PackageStatus::Failed,
            RunOutcome::ExecutionError { .. } => PackageStatus::ExecutionError,
        }
    }
}

/// Runs instrumented tests for one package
pub trait PackageExecutor {
    /// Run `package`, instrumenting every package in `coverpkg`
    /// (comma-separated).
    fn execute(&mut self, package: &str, coverpkg: &str, config: &RunConfig) -> RunResult;
}

/// Executor backed by `go test -coverprofile`
#[derive(Debug, Clone, Copy, Default)]
pub struct GoTestExecutor;

impl GoTestExecutor {
    /// Create an executor
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn run(
        package: &str,
        coverpkg: &str,
        config: &RunConfig,
    ) -> CliResult<(RunOutcome, Option<CapturedOutput>)> {
        // Removed on drop, whichever way this function returns.
        let scratch = tempfile::Builder::new()
            .prefix("covmerge")
            .tempdir()
            .map_err(|e| CliError::execution(package, format!("creating scratch dir: {e}")))?;
        let profile_path = scratch.path().join(PROFILE_FILE);

        let mut cmd = Command::new(&config.go_binary);
        cmd.arg("test")
            .arg(package)
            .arg("-coverprofile")
            .arg(&profile_path)
            .arg("-coverpkg")
            .arg(coverpkg)
            .args(config.test_flags());
        debug!(package, profile = %profile_path.display(), "running tests");

        let (status, captured) = if config.is_verbose() {
            let status = cmd
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map_err(|e| CliError::execution(package, e.to_string()))?;
            (status, None)
        } else {
            let output = cmd
                .output()
                .map_err(|e| CliError::execution(package, e.to_string()))?;
            let captured = CapturedOutput {
                stdout: output.stdout,
                stderr: output.stderr,
            };
            (output.status, Some(captured))
        };

        Ok((classify(package, status, &profile_path), captured))
    }
}

/// Map an exited process and whatever it left at `profile_path` to a state
fn classify(package: &str, status: ExitStatus, profile_path: &Path) -> RunOutcome {
    let execution_error = |message: String| RunOutcome::ExecutionError {
        message: CliError::execution(package, message).to_string(),
    };

    if !profile_path.exists() {
        if status.success() {
            return RunOutcome::NoTests;
        }
        return execution_error(status.to_string());
    }

    // A failing test binary can still leave a usable profile behind.
    match std::fs::read_to_string(profile_path) {
        Ok(profile) if status.success() => RunOutcome::Passed { profile },
        Ok(profile) => RunOutcome::Failed { profile },
        Err(e) => execution_error(format!("reading profile: {e}")),
    }
}

impl PackageExecutor for GoTestExecutor {
    fn execute(&mut self, package: &str, coverpkg: &str, config: &RunConfig) -> RunResult {
        let start = Instant::now();
        let (outcome, captured) = match Self::run(package, coverpkg, config) {
            Ok(done) => done,
            Err(e) => (
                RunOutcome::ExecutionError {
                    message: e.to_string(),
                },
                None,
            ),
        };

        let result = RunResult::new(package, outcome, start.elapsed());
        match captured {
            Some(output) if !output.is_empty() => result.with_output(output),
            _ => result,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod run_result_tests {
        use super::*;

        fn result(outcome: RunOutcome) -> RunResult {
            RunResult::new("m/p", outcome, Duration::from_millis(5))
        }

        #[test]
        fn test_no_tests() {
            let r = result(RunOutcome::NoTests);
            assert!(r.success());
            assert!(r.profile().is_none());
            assert!(r.error().is_none());
            assert_eq!(r.status(), PackageStatus::NoTests);
        }

        #[test]
        fn test_passed() {
            let r = result(RunOutcome::Passed {
                profile: "mode: set\n".to_string(),
            });
            assert!(r.success());
            assert_eq!(r.profile(), Some("mode: set\n"));
            assert_eq!(r.status(), PackageStatus::Passed);
        }

        #[test]
        fn test_failed_keeps_profile() {
            let r = result(RunOutcome::Failed {
                profile: "mode: set\n".to_string(),
            });
            assert!(!r.success());
            assert!(r.profile().is_some());
            assert!(r.status().is_failure());
        }

        #[test]
        fn test_execution_error() {
            let r = result(RunOutcome::ExecutionError {
                message: "boom".to_string(),
            });
            assert!(!r.success());
            assert!(r.profile().is_none());
            assert_eq!(r.error(), Some("boom"));
            assert!(r.status().is_failure());
        }

        #[test]
        fn test_with_output() {
            let r = result(RunOutcome::NoTests).with_output(CapturedOutput {
                stdout: b"ok".to_vec(),
                stderr: Vec::new(),
            });
            assert!(!r.output.unwrap().is_empty());
        }

        #[test]
        fn test_status_display() {
            assert_eq!(PackageStatus::NoTests.to_string(), "no-tests");
            assert_eq!(PackageStatus::ExecutionError.to_string(), "execution-error");
            assert!(!PackageStatus::Passed.is_failure());
        }
    }

    #[cfg(unix)]
    mod go_test_executor_tests {
        use super::*;
        use crate::config::Verbosity;
        use std::os::unix::fs::PermissionsExt;
        use std::path::{Path, PathBuf};
        use tempfile::TempDir;

        /// Stand-in for the test tool. Behavior is chosen by package name;
        /// every invocation appends its arguments to `calls.log`.
        fn fake_tool(dir: &Path) -> PathBuf {
            let log = dir.join("calls.log");
            let script = format!(
                r#"#!/bin/sh
echo "$@" >> "{log}"
pkg="$2"
out="$4"
case "$pkg" in
  pass) printf 'mode: count\na.go:1.1,2.2 1 3\n' > "$out"; echo "ok pass" ;;
  notests) echo "?   notests [no test files]" ;;
  fail) printf 'mode: count\na.go:1.1,2.2 1 0\n' > "$out"; echo "--- FAIL: TestX"; exit 1 ;;
  broken) echo "cannot build" >&2; exit 2 ;;
  garbled) printf 'mode: count\n\377\376\n' > "$out"; echo "--- FAIL: TestGarbled"; exit 1 ;;
esac
"#,
                log = log.display()
            );
            let path = dir.join("fake-go");
            std::fs::write(&path, script).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn calls(dir: &Path) -> Vec<String> {
            std::fs::read_to_string(dir.join("calls.log"))
                .unwrap_or_default()
                .lines()
                .map(String::from)
                .collect()
        }

        fn run(dir: &TempDir, package: &str) -> RunResult {
            let config = RunConfig::new("unused.out").with_go_binary(fake_tool(dir.path()));
            GoTestExecutor::new().execute(package, "pass,fail", &config)
        }

        #[test]
        fn test_passed_run_returns_profile() {
            let dir = TempDir::new().unwrap();
            let result = run(&dir, "pass");
            assert_eq!(
                result.outcome,
                RunOutcome::Passed {
                    profile: "mode: count\na.go:1.1,2.2 1 3\n".to_string()
                }
            );
            // Kept so the caller can still replay it if the profile is rejected
            let output = result.output.unwrap();
            assert_eq!(String::from_utf8_lossy(&output.stdout), "ok pass\n");
        }

        #[test]
        fn test_no_profile_means_no_tests() {
            let dir = TempDir::new().unwrap();
            let result = run(&dir, "notests");
            assert_eq!(result.outcome, RunOutcome::NoTests);
        }

        #[test]
        fn test_failed_run_keeps_partial_profile_and_output() {
            let dir = TempDir::new().unwrap();
            let result = run(&dir, "fail");
            assert_eq!(result.status(), PackageStatus::Failed);
            assert!(result.profile().unwrap().contains("a.go:1.1,2.2 1 0"));
            let output = result.output.unwrap();
            assert!(String::from_utf8_lossy(&output.stdout).contains("--- FAIL"));
        }

        #[test]
        fn test_failure_without_profile_is_execution_error() {
            let dir = TempDir::new().unwrap();
            let result = run(&dir, "broken");
            assert_eq!(result.status(), PackageStatus::ExecutionError);
            assert!(result.error().unwrap().contains("broken"));
            let output = result.output.unwrap();
            assert!(String::from_utf8_lossy(&output.stderr).contains("cannot build"));
        }

        #[test]
        fn test_unreadable_profile_keeps_output() {
            let dir = TempDir::new().unwrap();
            let result = run(&dir, "garbled");
            assert_eq!(result.status(), PackageStatus::ExecutionError);
            assert!(result.error().unwrap().contains("reading profile"));
            let output = result.output.expect("failed run's output must be kept");
            assert!(String::from_utf8_lossy(&output.stdout).contains("--- FAIL: TestGarbled"));
        }

        #[test]
        fn test_verbose_run_streams_output() {
            let dir = TempDir::new().unwrap();
            let config = RunConfig::new("unused.out")
                .with_go_binary(fake_tool(dir.path()))
                .with_verbosity(Verbosity::Verbose);
            let result = GoTestExecutor::new().execute("fail", "pass,fail", &config);

            assert!(result.output.is_none());
            assert_eq!(result.status(), PackageStatus::Failed);
            assert!(result.profile().unwrap().contains("a.go:1.1,2.2 1 0"));

            let calls = calls(dir.path());
            assert_eq!(calls.len(), 1);
            assert!(calls[0].split(' ').any(|arg| arg == "-v"));
        }

        #[test]
        fn test_missing_tool_is_execution_error() {
            let config = RunConfig::new("unused.out").with_go_binary("/nonexistent/covmerge-go");
            let result = GoTestExecutor::new().execute("pass", "pass", &config);
            assert_eq!(result.status(), PackageStatus::ExecutionError);
        }

        #[test]
        fn test_arguments_forwarded() {
            let dir = TempDir::new().unwrap();
            let config = RunConfig::new("unused.out")
                .with_go_binary(fake_tool(dir.path()))
                .with_covermode(covmerge::Mode::Count);
            GoTestExecutor::new().execute("pass", "pass,fail", &config);

            let calls = calls(dir.path());
            assert_eq!(calls.len(), 1);
            let args: Vec<&str> = calls[0].split(' ').collect();
            assert_eq!(args[0], "test");
            assert_eq!(args[1], "pass");
            assert_eq!(args[2], "-coverprofile");
            assert_eq!(&args[4..], ["-coverpkg", "pass,fail", "-covermode", "count"]);
        }

        #[test]
        fn test_scratch_profile_removed_after_run() {
            let dir = TempDir::new().unwrap();
            run(&dir, "pass");
            run(&dir, "fail");

            for call in calls(dir.path()) {
                let profile = call.split(' ').nth(3).unwrap();
                let profile = Path::new(profile);
                assert!(!profile.exists(), "{} left behind", profile.display());
                assert!(!profile.parent().unwrap().exists());
            }
        }
    }
}
