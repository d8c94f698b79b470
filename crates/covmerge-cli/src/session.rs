//! Coverage session: resolve, run each package, merge
//!
//! Packages run one after another. Every run instruments the full package set,
//! so each profile describes the same files and can be merged positionally.

use crate::config::RunConfig;
use crate::error::{CliError, CliResult};
use crate::executor::{PackageExecutor, PackageStatus, RunResult};
use crate::output::{ProgressReporter, SummaryCounts};
use crate::resolver::{resolve_all, PackageResolver};
use covmerge::{MergeAccumulator, MergedProfile, Profile};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Final status of one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageReport {
    /// Package identifier
    pub package: String,
    /// Terminal status
    pub status: PackageStatus,
    /// Wall time of the run
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

/// Everything a finished session produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Merged coverage across every accepted profile
    pub merged: MergedProfile,
    /// Per-package results, in run order
    pub packages: Vec<PackageReport>,
    /// Total wall time
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl SessionReport {
    fn count(&self, status: PackageStatus) -> usize {
        self.packages.iter().filter(|p| p.status == status).count()
    }

    /// Packages whose tests passed
    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(PackageStatus::Passed)
    }

    /// Packages whose tests failed
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(PackageStatus::Failed)
    }

    /// Packages without tests
    #[must_use]
    pub fn no_tests(&self) -> usize {
        self.count(PackageStatus::NoTests)
    }

    /// Packages that could not be run
    #[must_use]
    pub fn errored(&self) -> usize {
        self.count(PackageStatus::ExecutionError)
    }

    /// Number of packages run
    #[must_use]
    pub fn total(&self) -> usize {
        self.packages.len()
    }

    /// Whether any package failed or errored
    #[must_use]
    pub fn any_failed(&self) -> bool {
        self.packages.iter().any(|p| p.status.is_failure())
    }

    /// Counts for the closing summary
    #[must_use]
    pub fn counts(&self) -> SummaryCounts {
        SummaryCounts {
            passed: self.passed(),
            failed: self.failed(),
            no_tests: self.no_tests(),
            errored: self.errored(),
        }
    }
}

/// One covmerge invocation
#[derive(Debug)]
pub struct CoverageSession<'a, R, E> {
    config: &'a RunConfig,
    resolver: R,
    executor: E,
    reporter: ProgressReporter,
}

impl<'a, R, E> CoverageSession<'a, R, E>
where
    R: PackageResolver,
    E: PackageExecutor,
{
    /// Create a session
    #[must_use]
    pub fn new(config: &'a RunConfig, resolver: R, executor: E, reporter: ProgressReporter) -> Self {
        Self {
            config,
            resolver,
            executor,
            reporter,
        }
    }

    /// Progress reporter used by the session
    #[must_use]
    pub const fn reporter(&self) -> &ProgressReporter {
        &self.reporter
    }

    /// Resolve packages, run each one, and merge the profiles.
    ///
    /// Test failures are recorded in the report. Resolution and merge
    /// errors abort the session.
    pub fn run(&mut self) -> CliResult<SessionReport> {
        let start = Instant::now();

        let packages = resolve_all(&self.resolver, &self.config.effective_patterns())?;
        info!(count = packages.len(), "resolved packages");
        if packages.is_empty() {
            self.reporter.warning("no packages to test");
        }

        let coverpkg = packages.join(",");
        let mut acc = match self.config.covermode {
            Some(mode) => MergeAccumulator::with_mode(mode),
            None => MergeAccumulator::new(),
        };
        let mut reports = Vec::with_capacity(packages.len());

        self.reporter
            .start_progress(packages.len() as u64, "Running tests...");
        for package in &packages {
            self.reporter.set_message(package);
            let result = self.executor.execute(package, &coverpkg, self.config);
            let status = match self.absorb(&mut acc, &result) {
                Ok(status) => status,
                Err(e) => {
                    self.reporter.abandon();
                    return Err(e);
                }
            };
            self.reporter.increment(1);
            reports.push(PackageReport {
                package: result.package,
                status,
                duration: result.duration,
            });
        }
        self.reporter.finish();

        let report = SessionReport {
            merged: acc.finish(),
            packages: reports,
            duration: start.elapsed(),
        };
        self.reporter.summary(report.counts(), report.duration);
        Ok(report)
    }

    /// Fold one run's profile in and report it; returns the final status.
    ///
    /// Captured output is replayed only when the final status is a failure,
    /// which includes a passing run whose profile could not be parsed.
    fn absorb(&self, acc: &mut MergeAccumulator, result: &RunResult) -> CliResult<PackageStatus> {
        let package = result.package.as_str();
        let mut status = result.status();
        let mut message = result.error().map(String::from);

        let profile = match result.profile().map(Profile::parse) {
            Some(Ok(profile)) => Some(profile),
            Some(Err(e)) => {
                debug!(package, error = %e, "discarding profile");
                let err = CliError::execution(package, format!("unreadable profile: {e}"));
                message = Some(err.to_string());
                status = PackageStatus::ExecutionError;
                None
            }
            None => None,
        };

        if status.is_failure() {
            if let Some(ref output) = result.output {
                self.reporter.replay(output);
            }
        }

        match status {
            PackageStatus::NoTests => self.reporter.skipped(&format!("{package} [no test files]")),
            PackageStatus::Passed => self.reporter.success(package),
            PackageStatus::Failed => self.reporter.failure(package),
            PackageStatus::ExecutionError => {
                let message = message.as_deref().unwrap_or("unknown error");
                debug!(package, error = message, "test run did not complete");
                self.reporter.failure(message);
            }
        }

        if let Some(profile) = profile {
            debug!(package, blocks = profile.block_count(), "accepted profile");
            acc.add(profile).map_err(CliError::Merge)?;
        }
        Ok(status)
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
