//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Exit code for usage errors
pub const USAGE_EXIT_CODE: u8 = 2;

/// Exit code for test failures and fatal errors
pub const FAILURE_EXIT_CODE: u8 = 1;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Required configuration missing
    #[error("{message}")]
    Usage {
        /// Error message
        message: String,
    },

    /// Conflicting or invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Package listing failed
    #[error("Failed to resolve packages for {pattern:?}: {message}")]
    Resolution {
        /// Pattern that was being resolved
        pattern: String,
        /// Error message
        message: String,
    },

    /// A package's test process could not be run to completion
    #[error("Failed to run tests for {package}: {message}")]
    Execution {
        /// Package identifier
        package: String,
        /// Error message
        message: String,
    },

    /// Profiles could not be reconciled
    #[error("Merge failed: {0}")]
    Merge(#[from] covmerge::CovmergeError),

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Create a usage error
    #[must_use]
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a resolution error
    #[must_use]
    pub fn resolution(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolution {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create an execution error
    #[must_use]
    pub fn execution(package: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            package: package.into(),
            message: message.into(),
        }
    }

    /// Process exit code for this error
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Usage { .. } => USAGE_EXIT_CODE,
            _ => FAILURE_EXIT_CODE,
        }
    }
}
