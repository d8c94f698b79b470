//! Writing the merged profile and deciding the process outcome

use crate::error::{CliError, CliResult, FAILURE_EXIT_CODE};
use crate::session::SessionReport;
use covmerge::MergedProfile;
use std::path::Path;
use tracing::{debug, info};

/// How the invocation ended; interpreted once, in `main`
#[derive(Debug)]
pub enum Outcome {
    /// Everything passed and the profile was written
    Success,
    /// The profile was written but some package failed
    Failure {
        /// Process exit code
        code: u8,
        /// Message for the user
        reason: String,
    },
    /// Nothing useful was produced
    Fatal(CliError),
}

impl Outcome {
    /// Process exit code
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure { code, .. } => *code,
            Self::Fatal(err) => err.exit_code(),
        }
    }

    /// Whether the invocation succeeded
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<CliError> for Outcome {
    fn from(err: CliError) -> Self {
        Self::Fatal(err)
    }
}

/// Render the merged profile and write it to `path`.
///
/// The file is only created once rendering has succeeded.
pub fn write_profile(path: &Path, merged: &MergedProfile) -> CliResult<()> {
    let rendered = merged.render();
    std::fs::write(path, rendered)?;
    info!(
        path = %path.display(),
        files = merged.file_count(),
        blocks = merged.block_count(),
        "wrote merged profile"
    );
    Ok(())
}

/// Remove a profile left by an earlier invocation.
///
/// Called before any package runs, so a later merge error cannot leave an
/// out-of-date report at `path`.
pub fn clear_stale(path: &Path) -> CliResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed previous profile");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Persist a finished session and turn it into an outcome
#[must_use]
pub fn finalize(path: &Path, report: &SessionReport) -> Outcome {
    if let Err(e) = write_profile(path, &report.merged) {
        return Outcome::Fatal(e);
    }

    if report.any_failed() {
        let failed = report.failed() + report.errored();
        Outcome::Failure {
            code: FAILURE_EXIT_CODE,
            reason: format!("{failed} of {} packages failed", report.total()),
        }
    } else {
        Outcome::Success
    }
}
