//! Merge accumulator and merged profile

use crate::profile::{render_profile, Block, Mode, Profile};
use crate::result::{CovmergeError, CovmergeResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use tracing::debug;

/// Builder that owns the merged block lists across runs.
///
/// Profiles are consumed as they are added; the accumulator never aliases a
/// run's data.
#[derive(Debug, Default)]
pub struct MergeAccumulator {
    /// Mode required by configuration, if any
    configured: Option<Mode>,
    /// Mode established by the first accepted profile
    mode: Option<Mode>,
    files: BTreeMap<String, Vec<Block>>,
    runs: usize,
}

impl MergeAccumulator {
    /// Create an accumulator that accepts whichever mode arrives first
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an accumulator that only accepts profiles declaring `mode`
    #[must_use]
    pub fn with_mode(mode: Mode) -> Self {
        Self {
            configured: Some(mode),
            ..Self::default()
        }
    }

    /// Mode of the merge so far
    #[must_use]
    pub const fn mode(&self) -> Option<Mode> {
        match self.mode {
            Some(mode) => Some(mode),
            None => self.configured,
        }
    }

    /// Number of profiles folded in
    #[must_use]
    pub const fn runs(&self) -> usize {
        self.runs
    }

    /// Whether no profile has been folded in yet
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.runs == 0
    }

    /// Fold one profile into the merge.
    ///
    /// The profile is validated completely before any count is touched, so on
    /// error the accumulator is left exactly as it was.
    pub fn add(&mut self, profile: Profile) -> CovmergeResult<()> {
        let mode = self.check_mode(profile.mode())?;
        self.check_structure(&profile)?;

        debug!(
            mode = %mode,
            files = profile.file_count(),
            blocks = profile.block_count(),
            "merging profile"
        );

        let (_, files) = profile.into_parts();
        for (file, blocks) in files {
            match self.files.get_mut(&file) {
                Some(merged) => {
                    for (acc, block) in merged.iter_mut().zip(blocks) {
                        acc.count = mode.combine(acc.count, block.count);
                    }
                }
                None => {
                    let blocks = blocks
                        .into_iter()
                        .map(|b| b.with_count(mode.normalize(b.count)))
                        .collect();
                    self.files.insert(file, blocks);
                }
            }
        }

        self.mode = Some(mode);
        self.runs += 1;
        Ok(())
    }

    /// Parse profile text and fold it in
    pub fn add_text(&mut self, text: &str) -> CovmergeResult<()> {
        self.add(Profile::parse(text)?)
    }

    /// Finish the merge
    #[must_use]
    pub fn finish(self) -> MergedProfile {
        MergedProfile {
            mode: self.mode.or(self.configured),
            files: self.files,
        }
    }

    fn check_mode(&self, found: Mode) -> CovmergeResult<Mode> {
        match self.mode() {
            Some(expected) if expected != found => {
                Err(CovmergeError::ModeMismatch { expected, found })
            }
            _ => Ok(found),
        }
    }

    fn check_structure(&self, profile: &Profile) -> CovmergeResult<()> {
        for (file, blocks) in profile.files() {
            let Some(merged) = self.files.get(file) else {
                continue;
            };
            if merged.len() != blocks.len() {
                return Err(CovmergeError::BlockCountMismatch {
                    file: file.to_string(),
                    expected: merged.len(),
                    found: blocks.len(),
                });
            }
            if let Some((index, (expected, found))) = merged
                .iter()
                .zip(blocks)
                .enumerate()
                .find(|(_, (a, b))| !a.same_structure(b))
            {
                return Err(CovmergeError::BlockMismatch {
                    file: file.to_string(),
                    index,
                    expected: expected.describe(),
                    found: found.describe(),
                });
            }
        }
        Ok(())
    }
}

/// Result of a merge, ready to be serialized
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedProfile {
    mode: Option<Mode>,
    files: BTreeMap<String, Vec<Block>>,
}

impl MergedProfile {
    /// Mode of the merged runs; `None` when nothing was merged and no mode
    /// was configured
    #[must_use]
    pub const fn mode(&self) -> Option<Mode> {
        self.mode
    }

    /// Files and their merged blocks, sorted by file name
    pub fn files(&self) -> impl Iterator<Item = (&str, &[Block])> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Merged blocks for a file
    #[must_use]
    pub fn blocks(&self, file: &str) -> Option<&[Block]> {
        self.files.get(file).map(Vec::as_slice)
    }

    /// Number of files
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Number of blocks across all files
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    /// Whether no block was merged
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Render in the wire format.
    ///
    /// An empty merge renders the header alone when the mode is known, and
    /// nothing at all otherwise.
    #[must_use]
    pub fn render(&self) -> String {
        render_profile(self.mode, &self.files)
    }

    /// Write the rendered profile
    pub fn write_to<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(self.render().as_bytes())?;
        writer.flush()
    }
}
