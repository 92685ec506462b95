//! Heading extraction and hierarchy construction.
//!
//! Scans the raw text for ATX headings (`#` through `######`), closes each
//! heading's line range with a level-ordered stack, then rebuilds the
//! nesting as a forest rooted at the top-level headings. Lines inside
//! fenced code blocks that merely look like headings are still matched —
//! a documented limitation, not a bug to fix silently.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use chunkweave_shared::{ChunkweaveError, Result};

/// Matches level 1-6 ATX headings: leading `#`s, a space, then text.
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").expect("valid regex"));

// ---------------------------------------------------------------------------
// HeadingNode
// ---------------------------------------------------------------------------

/// One markdown heading and the line range it governs.
///
/// `end_line` is the line before the next sibling/ancestor heading, or the
/// file's last line. Siblings share a level; a node's range contains every
/// descendant's range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingNode {
    /// Heading text, trimmed, `#` markers stripped.
    pub title: String,
    /// Heading level, 1..=6.
    pub level: u8,
    /// First line of the governed range (1-based, inclusive).
    pub start_line: i64,
    /// Last line of the governed range (1-based, inclusive).
    pub end_line: i64,
    /// Child headings in source order.
    pub children: Vec<HeadingNode>,
    /// True iff at least one child itself has children.
    pub is_deep: bool,
}

/// A heading occurrence before nesting is rebuilt.
#[derive(Debug, Clone)]
struct FlatHeading {
    title: String,
    level: u8,
    start_line: i64,
    end_line: i64,
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Build the heading forest for a file on disk.
pub fn heading_forest(path: &Path) -> Result<Vec<HeadingNode>> {
    let file = File::open(path).map_err(|e| ChunkweaveError::io(path, e))?;
    let forest = heading_forest_from_reader(BufReader::new(file))
        .map_err(|e| ChunkweaveError::io(path, e))?;
    tracing::debug!(path = %path.display(), top_level = forest.len(), "heading forest built");
    Ok(forest)
}

/// Build the heading forest from any line-oriented reader.
pub fn heading_forest_from_reader<R: BufRead>(reader: R) -> std::io::Result<Vec<HeadingNode>> {
    Ok(build_hierarchy(extract_headings(reader)?))
}

/// Scan for headings, resolving each range with a level-ordered stack:
/// a new heading closes every pending heading of level `>=` its own at the
/// previous line; EOF closes the rest at the last line.
fn extract_headings<R: BufRead>(reader: R) -> std::io::Result<Vec<FlatHeading>> {
    let mut headings: Vec<FlatHeading> = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let mut current_line: i64 = 0;

    for line in reader.lines() {
        let line = line?;
        current_line += 1;

        let Some(caps) = HEADING_RE.captures(line.trim()) else {
            continue;
        };

        let level = caps[1].len() as u8;
        let title = caps[2].trim().to_string();

        while open
            .last()
            .is_some_and(|&i| headings[i].level >= level)
        {
            if let Some(i) = open.pop() {
                headings[i].end_line = current_line - 1;
            }
        }

        open.push(headings.len());
        headings.push(FlatHeading {
            title,
            level,
            start_line: current_line,
            end_line: 0,
        });
    }

    for i in open {
        headings[i].end_line = current_line;
    }

    Ok(headings)
}

// ---------------------------------------------------------------------------
// Hierarchy
// ---------------------------------------------------------------------------

/// Rebuild nesting from the flat, source-ordered sequence and set the
/// `is_deep` flag on every node.
fn build_hierarchy(flat: Vec<FlatHeading>) -> Vec<HeadingNode> {
    let mut forest: Vec<HeadingNode> = Vec::new();
    let mut stack: Vec<HeadingNode> = Vec::new();

    for fh in flat {
        let node = HeadingNode {
            title: fh.title,
            level: fh.level,
            start_line: fh.start_line,
            end_line: fh.end_line,
            children: Vec::new(),
            is_deep: false,
        };

        while stack.last().is_some_and(|top| top.level >= node.level) {
            if let Some(done) = stack.pop() {
                attach(&mut stack, &mut forest, done);
            }
        }
        stack.push(node);
    }

    while let Some(done) = stack.pop() {
        attach(&mut stack, &mut forest, done);
    }

    for node in &mut forest {
        mark_deep(node);
    }

    forest
}

fn attach(stack: &mut [HeadingNode], forest: &mut Vec<HeadingNode>, node: HeadingNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => forest.push(node),
    }
}

fn mark_deep(node: &mut HeadingNode) {
    for child in &mut node.children {
        mark_deep(child);
    }
    node.is_deep = node.children.iter().any(|c| !c.children.is_empty());
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn forest(text: &str) -> Vec<HeadingNode> {
        heading_forest_from_reader(Cursor::new(text)).expect("build forest")
    }

    #[test]
    fn flat_document_yields_empty_forest() {
        assert!(forest("just text\nno headings here\n").is_empty());
    }

    #[test]
    fn ranges_cover_until_next_same_level_heading() {
        let f = forest("# A\n## B\ntext b\n## C\ntext c\n");

        assert_eq!(f.len(), 1);
        let a = &f[0];
        assert_eq!((a.title.as_str(), a.start_line, a.end_line), ("A", 1, 5));
        assert_eq!(a.children.len(), 2);
        assert_eq!(
            (a.children[0].title.as_str(), a.children[0].start_line, a.children[0].end_line),
            ("B", 2, 3)
        );
        assert_eq!(
            (a.children[1].title.as_str(), a.children[1].start_line, a.children[1].end_line),
            ("C", 4, 5)
        );
    }

    #[test]
    fn every_range_is_well_formed_and_siblings_never_overlap() {
        let f = forest("# A\n## B\n### C\nbody\n## D\n# E\nbody\n## F\n");

        fn check(nodes: &[HeadingNode]) {
            for pair in nodes.windows(2) {
                assert!(pair[0].end_line < pair[1].start_line, "sibling overlap");
                assert_eq!(pair[0].level, pair[1].level, "siblings share a level");
            }
            for node in nodes {
                assert!(node.end_line >= node.start_line);
                for child in &node.children {
                    assert!(child.start_line >= node.start_line);
                    assert!(child.end_line <= node.end_line);
                }
                check(&node.children);
            }
        }
        check(&f);
    }

    #[test]
    fn hash_without_space_and_deep_levels_are_ignored() {
        let f = forest("#no-space\n####### seven\n# real\n");
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].title, "real");
    }

    #[test]
    fn boundary_tag_line_is_never_a_heading() {
        let tag = chunkweave_shared::boundary_tag().expect("tag");
        let text = format!("# A\n{tag}\n## B\n");
        let f = forest(&text);

        assert_eq!(f.len(), 1);
        assert_eq!(f[0].children.len(), 1);
        assert_eq!(f[0].children[0].title, "B");
    }

    #[test]
    fn deep_flag_requires_a_grandchild() {
        let f = forest("# A\n## B\n### C\n# D\n## E\n");

        let a = &f[0];
        assert!(a.is_deep, "A has grandchild C");
        assert!(!a.children[0].is_deep, "B has no grandchildren");

        let d = &f[1];
        assert!(!d.is_deep, "D has only a leaf child");
    }

    #[test]
    fn level_jump_back_closes_nested_headings() {
        let f = forest("# A\n### B\nbody\n# C\n");

        assert_eq!(f.len(), 2);
        assert_eq!(f[0].children[0].end_line, 3);
        assert_eq!(f[0].end_line, 3);
        assert_eq!(f[1].start_line, 4);
    }
}
