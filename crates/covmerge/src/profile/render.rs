//! Wire-format renderer

use super::block::Span;
use super::{Block, Mode};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Render a header and one line per block, files in map (lexicographic) order.
///
/// Without a mode nothing is rendered, not even the header.
pub(crate) fn render_profile(mode: Option<Mode>, files: &BTreeMap<String, Vec<Block>>) -> String {
    let Some(mode) = mode else {
        return String::new();
    };

    let mut output = String::new();
    let _ = writeln!(output, "mode: {mode}");
    for (file, blocks) in files {
        for block in blocks {
            let _ = writeln!(
                output,
                "{file}:{} {} {}",
                Span(block),
                block.num_stmt,
                block.count
            );
        }
    }
    output
}
