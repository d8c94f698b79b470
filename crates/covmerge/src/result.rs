//! Result and error types for covmerge.

use crate::profile::Mode;
use thiserror::Error;

/// Result type for covmerge operations
pub type CovmergeResult<T> = Result<T, CovmergeError>;

/// Errors that can occur while parsing or merging profiles
#[derive(Debug, Error)]
pub enum CovmergeError {
    /// Malformed profile text
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// Error message
        message: String,
    },

    /// Mode name outside `set`, `count` and `atomic`
    #[error("unknown mode {mode:?}")]
    UnknownMode {
        /// Name as written
        mode: String,
    },

    /// Two profiles declare different accumulation modes
    #[error("mode mismatch: expected {expected}, found {found}")]
    ModeMismatch {
        /// Mode already established for the merge
        expected: Mode,
        /// Mode declared by the offending profile
        found: Mode,
    },

    /// Two runs produced a different number of blocks for one file
    #[error("block count mismatch for {file}: expected {expected}, found {found}")]
    BlockCountMismatch {
        /// File name
        file: String,
        /// Blocks already merged
        expected: usize,
        /// Blocks in the offending profile
        found: usize,
    },

    /// Two runs disagree on the span or statement count of a block
    #[error("block {index} of {file} differs between runs: {expected} vs {found}")]
    BlockMismatch {
        /// File name
        file: String,
        /// Position of the block within the file
        index: usize,
        /// Block already merged, rendered as a span
        expected: String,
        /// Block in the offending profile, rendered as a span
        found: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CovmergeError {
    /// Create a parse error
    #[must_use]
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Whether this error comes from reconciling profiles rather than reading one
    #[must_use]
    pub const fn is_merge_conflict(&self) -> bool {
        matches!(
            self,
            Self::ModeMismatch { .. } | Self::BlockCountMismatch { .. } | Self::BlockMismatch { .. }
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = CovmergeError::parse(3, "bad block line");
        assert_eq!(err.to_string(), "line 3: bad block line");
        assert!(!err.is_merge_conflict());
    }

    #[test]
    fn test_unknown_mode_display() {
        let err = CovmergeError::UnknownMode {
            mode: "often".to_string(),
        };
        assert_eq!(err.to_string(), "unknown mode \"often\"");
        assert!(!err.is_merge_conflict());
    }

    #[test]
    fn test_mode_mismatch_display() {
        let err = CovmergeError::ModeMismatch {
            expected: Mode::Set,
            found: Mode::Count,
        };
        assert_eq!(err.to_string(), "mode mismatch: expected set, found count");
        assert!(err.is_merge_conflict());
    }

    #[test]
    fn test_block_count_mismatch_display() {
        let err = CovmergeError::BlockCountMismatch {
            file: "pkg/a.go".to_string(),
            expected: 2,
            found: 3,
        };
        assert!(err.to_string().contains("pkg/a.go"));
        assert!(err.is_merge_conflict());
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CovmergeError = io_err.into();
        assert!(err.to_string().contains("I/O"));
        assert!(!err.is_merge_conflict());
    }
}
