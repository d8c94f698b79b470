//! Source-span blocks

use serde::{Deserialize, Serialize};
use std::fmt;

/// One instrumented source span and its coverage count.
///
/// The file name is not stored here; blocks live in a per-file list keyed by
/// the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    /// 1-based start line
    pub start_line: u32,
    /// 1-based start column
    pub start_col: u32,
    /// 1-based end line
    pub end_line: u32,
    /// 1-based end column
    pub end_col: u32,
    /// Number of statements in the span
    pub num_stmt: u32,
    /// Execution count (0 or 1 in `set` mode)
    pub count: u64,
}

impl Block {
    /// Create a block
    #[must_use]
    pub const fn new(
        start: (u32, u32),
        end: (u32, u32),
        num_stmt: u32,
        count: u64,
    ) -> Self {
        Self {
            start_line: start.0,
            start_col: start.1,
            end_line: end.0,
            end_col: end.1,
            num_stmt,
            count,
        }
    }

    /// Same block with a different count
    #[must_use]
    pub const fn with_count(mut self, count: u64) -> Self {
        self.count = count;
        self
    }

    /// Sort key: blocks within a file are ordered by their start position
    #[must_use]
    pub const fn start(&self) -> (u32, u32) {
        (self.start_line, self.start_col)
    }

    /// Whether both blocks cover the same span
    #[must_use]
    pub const fn same_span(&self, other: &Self) -> bool {
        self.start_line == other.start_line
            && self.start_col == other.start_col
            && self.end_line == other.end_line
            && self.end_col == other.end_col
    }

    /// Whether both blocks describe the same instrumented statement group
    #[must_use]
    pub const fn same_structure(&self, other: &Self) -> bool {
        self.same_span(other) && self.num_stmt == other.num_stmt
    }

    /// Span and statement count without the count, e.g. `3.14,5.2 2`
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} {}", Span(self), self.num_stmt)
    }
}

/// `startLine.startCol,endLine.endCol`
pub(crate) struct Span<'a>(pub(crate) &'a Block);

impl fmt::Display for Span<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        write!(
            f,
            "{}.{},{}.{}",
            b.start_line, b.start_col, b.end_line, b.end_col
        )
    }
}
