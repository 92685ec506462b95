//! Block splitting on the boundary tag.
//!
//! Re-reads the tagged file and slices it into [`ContentBlock`]s, one per
//! region between boundary-tag lines.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chunkweave_shared::{ChunkweaveError, Result};

/// A slice of the file between two boundary tags.
///
/// Created fresh each run by [`split_blocks`]; the label generator fills in
/// `labels` and `context` before the second patch pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBlock {
    /// Trimmed raw text of the region.
    pub content: String,
    /// First line of the region (1-based, inclusive).
    pub start_line: i64,
    /// Last line of the region (1-based, inclusive; never before `start_line`).
    pub end_line: i64,
    /// Canonical deduplicated label string, `;`-joined.
    pub labels: String,
    /// Quick-question markers contributed by neighboring blocks.
    pub context: Vec<String>,
}

impl ContentBlock {
    fn new(content: String, start_line: i64, end_line: i64) -> Self {
        Self {
            content,
            start_line,
            end_line,
            labels: String::new(),
            context: Vec::new(),
        }
    }
}

/// Split the tagged file into content blocks.
///
/// A line whose trimmed content exactly equals `boundary_tag` closes the
/// current block; a trailing block is flushed at EOF while a block is still
/// open. When the tag is the first considered line the resulting block's
/// `end_line` clamps to its `start_line`.
pub fn split_blocks(path: &Path, boundary_tag: &str) -> Result<Vec<ContentBlock>> {
    let file = File::open(path).map_err(|e| ChunkweaveError::io(path, e))?;
    let mut reader = BufReader::new(file);

    let mut blocks = Vec::new();
    let mut buffer = String::new();
    let mut start_line: i64 = 1;
    let mut line_num: i64 = 0;

    let mut line = String::new();
    loop {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .map_err(|e| ChunkweaveError::io(path, e))?;
        if read == 0 {
            break;
        }
        line_num += 1;

        if line.trim() == boundary_tag {
            let end_line = if line_num > start_line {
                line_num - 1
            } else {
                start_line
            };
            blocks.push(ContentBlock::new(buffer.trim().to_string(), start_line, end_line));
            start_line = line_num + 1;
            buffer.clear();
        } else {
            buffer.push_str(&line);
        }
    }

    if line_num > 0 && start_line <= line_num {
        blocks.push(ContentBlock::new(buffer.trim().to_string(), start_line, line_num));
    }

    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const TAG: &str = "~test-split~";

    fn split_fixture(content: &str) -> Vec<ContentBlock> {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tagged.md");
        fs::write(&path, content).expect("write fixture");
        split_blocks(&path, TAG).expect("split")
    }

    #[test]
    fn splits_on_exact_tag_lines() {
        let blocks = split_fixture("alpha\nbeta\n~test-split~\ngamma\n~test-split~\n");

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].content, "alpha\nbeta");
        assert_eq!((blocks[0].start_line, blocks[0].end_line), (1, 2));
        assert_eq!(blocks[1].content, "gamma");
        assert_eq!((blocks[1].start_line, blocks[1].end_line), (4, 4));
    }

    #[test]
    fn tag_must_match_whole_trimmed_line() {
        let blocks = split_fixture("prefix ~test-split~ suffix\n~test-split~\n");

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].content, "prefix ~test-split~ suffix");
    }

    #[test]
    fn leading_tag_clamps_end_line() {
        let blocks = split_fixture("~test-split~\nabc\n");

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].content, "");
        assert_eq!((blocks[0].start_line, blocks[0].end_line), (1, 1));
        assert_eq!(blocks[1].content, "abc");
        assert_eq!((blocks[1].start_line, blocks[1].end_line), (2, 2));
    }

    #[test]
    fn trailing_block_flushed_at_eof() {
        let blocks = split_fixture("one\n~test-split~\ntwo\nthree\n");

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].content, "two\nthree");
        assert_eq!((blocks[1].start_line, blocks[1].end_line), (3, 4));
    }

    #[test]
    fn file_ending_on_tag_has_no_trailing_block() {
        let blocks = split_fixture("one\n~test-split~\n");

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].content, "one");
    }
}
