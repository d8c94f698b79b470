//! Wire-format parser

use super::{Block, Mode, Profile};
use crate::result::{CovmergeError, CovmergeResult};
use std::collections::BTreeMap;

const MODE_PREFIX: &str = "mode: ";

pub(super) fn parse_profile(text: &str) -> CovmergeResult<Profile> {
    let mut mode: Option<Mode> = None;
    // Line numbers travel with each block so span conflicts can point at them.
    let mut files: BTreeMap<String, Vec<(Block, usize)>> = BTreeMap::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        if let Some(declared) = line.strip_prefix(MODE_PREFIX) {
            let declared = parse_mode(declared, line_no)?;
            match mode {
                None => mode = Some(declared),
                Some(current) if current == declared => {}
                Some(current) => {
                    return Err(CovmergeError::parse(
                        line_no,
                        format!("mode {declared} conflicts with earlier mode {current}"),
                    ))
                }
            }
            continue;
        }

        if mode.is_none() {
            return Err(CovmergeError::parse(
                line_no,
                format!("bad mode line: {line:?}"),
            ));
        }

        let (file, block) = parse_block_line(line, line_no)?;
        files.entry(file.to_string()).or_default().push((block, line_no));
    }

    let Some(mode) = mode else {
        return Err(CovmergeError::parse(1, "missing mode line"));
    };

    let mut profile = Profile::new(mode);
    for (file, blocks) in files {
        let blocks = fold_blocks(&file, blocks, mode)?;
        profile.files.insert(file, blocks);
    }
    Ok(profile)
}

fn parse_mode(declared: &str, line_no: usize) -> CovmergeResult<Mode> {
    declared
        .trim()
        .parse()
        .map_err(|e: CovmergeError| CovmergeError::parse(line_no, format!("bad mode line: {e}")))
}

/// Parse `<file>:<sl>.<sc>,<el>.<ec> <stmts> <count>` right to left, so the
/// file name may itself contain `:` or spaces.
fn parse_block_line(line: &str, line_no: usize) -> CovmergeResult<(&str, Block)> {
    let malformed = || CovmergeError::parse(line_no, format!("malformed block line: {line:?}"));

    let (rest, count) = line.rsplit_once(' ').ok_or_else(malformed)?;
    let (rest, num_stmt) = rest.rsplit_once(' ').ok_or_else(malformed)?;
    let (rest, end_col) = rest.rsplit_once('.').ok_or_else(malformed)?;
    let (rest, end_line) = rest.rsplit_once(',').ok_or_else(malformed)?;
    let (rest, start_col) = rest.rsplit_once('.').ok_or_else(malformed)?;
    let (file, start_line) = rest.rsplit_once(':').ok_or_else(malformed)?;

    if file.is_empty() {
        return Err(CovmergeError::parse(line_no, "empty file name"));
    }

    let block = Block {
        start_line: number(start_line, "start line", line_no)?,
        start_col: number(start_col, "start column", line_no)?,
        end_line: number(end_line, "end line", line_no)?,
        end_col: number(end_col, "end column", line_no)?,
        num_stmt: number(num_stmt, "statement count", line_no)?,
        count: number(count, "count", line_no)?,
    };
    Ok((file, block))
}

/// Decimal digits only; `str::parse` alone would also take a leading `+`.
fn number<T: std::str::FromStr>(field: &str, what: &str, line_no: usize) -> CovmergeResult<T> {
    let invalid = || CovmergeError::parse(line_no, format!("invalid {what}: {field:?}"));
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    field.parse().map_err(|_| invalid())
}

/// Sort blocks by start position and fold repeated spans into one block.
fn fold_blocks(
    file: &str,
    mut blocks: Vec<(Block, usize)>,
    mode: Mode,
) -> CovmergeResult<Vec<Block>> {
    blocks.sort_by_key(|(block, _)| block.start());

    let mut folded: Vec<Block> = Vec::with_capacity(blocks.len());
    for (block, line_no) in blocks {
        match folded.last_mut() {
            Some(last) if last.same_span(&block) => {
                if last.num_stmt != block.num_stmt {
                    return Err(CovmergeError::parse(
                        line_no,
                        format!(
                            "inconsistent statement count for {file} at {}: {} vs {}",
                            super::block::Span(&block),
                            last.num_stmt,
                            block.num_stmt
                        ),
                    ));
                }
                last.count = mode.combine(last.count, block.count);
            }
            _ => folded.push(block),
        }
    }
    Ok(folded)
}
