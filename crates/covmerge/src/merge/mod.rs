//! Profile Merge Engine
//!
//! Folds per-run profiles into one merged profile.
//!
//! ## Rules
//!
//! - Every profile must declare the same mode (and the configured mode, if
//!   the accumulator was created with one).
//! - Blocks for a file seen in several runs are combined positionally: block
//!   *i* of one run and block *i* of another are the same span. Any length,
//!   span or statement-count disagreement is a merge error.
//! - `set` ORs counts into {0,1}; `count` and `atomic` sum them.
//! - A file absent from a run contributes nothing for that run.

mod accumulator;

pub use accumulator::{MergeAccumulator, MergedProfile};

use crate::profile::Profile;
use crate::result::CovmergeResult;

/// Merge a sequence of profiles in one call
pub fn merge_profiles<I>(profiles: I) -> CovmergeResult<MergedProfile>
where
    I: IntoIterator<Item = Profile>,
{
    let mut acc = MergeAccumulator::new();
    for profile in profiles {
        acc.add(profile)?;
    }
    Ok(acc.finish())
}
