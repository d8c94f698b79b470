//! Accumulation modes

use crate::result::CovmergeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Accumulation semantics declared by a profile's `mode:` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Boolean coverage: was the block ever executed
    Set,
    /// Exact execution counts
    Count,
    /// Execution counts under concurrency-safe instrumentation
    Atomic,
}

impl Mode {
    /// All modes, in header spelling order
    pub const ALL: [Self; 3] = [Self::Set, Self::Count, Self::Atomic];

    /// Header spelling of the mode
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Count => "count",
            Self::Atomic => "atomic",
        }
    }

    /// Whether counts are summed rather than OR-ed
    #[must_use]
    pub const fn is_counting(self) -> bool {
        matches!(self, Self::Count | Self::Atomic)
    }

    /// Bring a single observed count into the mode's value domain
    #[must_use]
    pub const fn normalize(self, count: u64) -> u64 {
        match self {
            Self::Set => (count > 0) as u64,
            Self::Count | Self::Atomic => count,
        }
    }

    /// Combine an accumulated count with a newly observed one
    #[must_use]
    pub const fn combine(self, acc: u64, count: u64) -> u64 {
        match self {
            Self::Set => (acc > 0 || count > 0) as u64,
            Self::Count | Self::Atomic => acc.saturating_add(count),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = CovmergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "set" => Ok(Self::Set),
            "count" => Ok(Self::Count),
            "atomic" => Ok(Self::Atomic),
            other => Err(CovmergeError::UnknownMode {
                mode: other.to_string(),
            }),
        }
    }
}
