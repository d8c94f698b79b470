//! covmerge CLI library
//!
//! Runs each package's tests in its own process with coverage instrumentation
//! over the whole package set, then merges the per-run profiles into one.
//!
//! ```text
//! patterns ─► PackageResolver ─► [pkg₁ … pkgₙ]
//!                                    │ sequential
//!                                    ▼
//!                   PackageExecutor (tempdir per run)
//!                                    │ raw profile
//!                                    ▼
//!                   MergeAccumulator ─► write_profile ─► Outcome
//! ```

#![warn(missing_docs)]

mod commands;
mod config;
mod error;
pub mod executor;
mod logging;
mod output;
mod report;
pub mod resolver;
mod session;

pub use commands::{Cli, ColorArg, ModeArg};
pub use config::{ColorChoice, RunConfig, Verbosity};
pub use error::{CliError, CliResult, FAILURE_EXIT_CODE, USAGE_EXIT_CODE};
pub use executor::{GoTestExecutor, PackageExecutor, PackageStatus, RunOutcome, RunResult};
pub use logging::{init_logging, LOG_ENV};
pub use output::{ProgressReporter, SummaryCounts};
pub use report::{clear_stale, finalize, write_profile, Outcome};
pub use resolver::{GoListResolver, PackageResolver};
pub use session::{CoverageSession, PackageReport, SessionReport};

/// Run one invocation end to end with the real test tool
#[must_use]
pub fn run(cli: &Cli) -> Outcome {
    let config = match RunConfig::from_cli(cli) {
        Ok(config) => config,
        Err(e) => return Outcome::Fatal(e),
    };
    run_with(
        &config,
        GoListResolver::new(&config.go_binary),
        GoTestExecutor::new(),
    )
}

/// Run one invocation with the given collaborators
pub fn run_with<R, E>(config: &RunConfig, resolver: R, executor: E) -> Outcome
where
    R: PackageResolver,
    E: PackageExecutor,
{
    let reporter = ProgressReporter::new(
        config.color.should_color(),
        config.verbosity.is_quiet(),
        config.is_verbose(),
    );
    if let Err(e) = clear_stale(&config.coverprofile) {
        return Outcome::Fatal(e);
    }
    let mut session = CoverageSession::new(config, resolver, executor, reporter);
    match session.run() {
        Ok(report) => finalize(&config.coverprofile, &report),
        Err(e) => Outcome::Fatal(e),
    }
}
