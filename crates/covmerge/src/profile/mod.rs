//! Coverage Profiles
//!
//! A profile is the output of one instrumented test run: an accumulation
//! mode plus, per file, the ordered list of blocks that run measured.
//!
//! ## Wire Format
//!
//! ```text
//! mode: <set|count|atomic>
//! <file>:<startLine>.<startCol>,<endLine>.<endCol> <numStatements> <count>
//! ```

mod block;
mod mode;
mod parse;
mod render;

pub use block::Block;
pub use mode::Mode;

pub(crate) use render::render_profile;

use crate::result::CovmergeResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Coverage data for a single run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    mode: Mode,
    files: BTreeMap<String, Vec<Block>>,
}

impl Profile {
    /// Create an empty profile
    #[must_use]
    pub const fn new(mode: Mode) -> Self {
        Self {
            mode,
            files: BTreeMap::new(),
        }
    }

    /// Add (or replace) the block list for a file
    #[must_use]
    pub fn with_file(mut self, name: impl Into<String>, blocks: Vec<Block>) -> Self {
        self.files.insert(name.into(), blocks);
        self
    }

    /// Parse profile text in the wire format.
    ///
    /// Blocks are sorted by start position per file, and repeated spans are
    /// folded together using the mode's combine rule.
    pub fn parse(text: &str) -> CovmergeResult<Self> {
        parse::parse_profile(text)
    }

    /// Read and parse a profile file
    pub fn from_path(path: &Path) -> CovmergeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Declared accumulation mode
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Files and their blocks, sorted by file name
    pub fn files(&self) -> impl Iterator<Item = (&str, &[Block])> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Blocks recorded for a file
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

    /// Whether the profile holds no files
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Render in the wire format
    #[must_use]
    pub fn render(&self) -> String {
        render_profile(Some(self.mode), &self.files)
    }

    pub(crate) fn into_parts(self) -> (Mode, BTreeMap<String, Vec<Block>>) {
        (self.mode, self.files)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builder_and_accessors() {
        let profile = Profile::new(Mode::Count)
            .with_file("b.go", vec![Block::new((1, 1), (1, 9), 1, 2)])
            .with_file(
                "a.go",
                vec![
                    Block::new((1, 1), (1, 9), 1, 0),
                    Block::new((2, 1), (4, 2), 3, 1),
                ],
            );

        assert_eq!(profile.mode(), Mode::Count);
        assert_eq!(profile.file_count(), 2);
        assert_eq!(profile.block_count(), 3);
        let names: Vec<_> = profile.files().map(|(name, _)| name).collect();
        assert_eq!(names, ["a.go", "b.go"]);
        assert_eq!(profile.blocks("a.go").unwrap().len(), 2);
        assert!(profile.blocks("c.go").is_none());
    }

    #[test]
    fn test_render() {
        let profile = Profile::new(Mode::Set)
            .with_file("x/y.go", vec![Block::new((10, 2), (12, 3), 2, 1)]);
        assert_eq!(profile.render(), "mode: set\nx/y.go:10.2,12.3 2 1\n");
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "mode: atomic\nm/p.go:1.2,3.4 5 6\n").unwrap();

        let profile = Profile::from_path(file.path()).unwrap();
        assert_eq!(profile.mode(), Mode::Atomic);
        assert_eq!(
            profile.blocks("m/p.go").unwrap(),
            [Block::new((1, 2), (3, 4), 5, 6)]
        );
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = Profile::from_path(Path::new("/nonexistent/profile.out")).unwrap_err();
        assert!(matches!(err, crate::CovmergeError::Io(_)));
    }
}
