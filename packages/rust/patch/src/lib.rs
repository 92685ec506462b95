//! Line-edit primitives and the streaming atomic patch applier.
//!
//! An [`EditMap`] maps 1-based line numbers to ordered edit operations.
//! [`apply_edits`] rewrites the target file in a single linear pass into a
//! temporary file in the same directory, then renames it over the original,
//! so a partially-written file is never observable and any failure leaves
//! the original untouched.

mod splitter;

pub use splitter::{ContentBlock, split_blocks};

use std::collections::{BTreeMap, VecDeque};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use tracing::debug;

use chunkweave_shared::{ChunkweaveError, EMPTY_PLACEHOLDER, Result};

/// Reserved [`EditMap`] key for a single end-of-file trailer append.
pub const EOF_APPEND_LINE: i64 = -1;

// ---------------------------------------------------------------------------
// Edit operations
// ---------------------------------------------------------------------------

/// How an [`EditOp`] acts on its target line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// Emit the text as a standalone line ahead of the target line
    /// (or after it, when the target is the document's max line).
    InsertBefore,
    /// Concatenate the text onto the trimmed target line.
    AppendToLine,
}

/// One atomic instruction against a line. Created by the planner or the
/// label generator, consumed exactly once by [`apply_edits`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOp {
    pub kind: EditKind,
    pub text: String,
}

impl EditOp {
    /// New insert-before op.
    pub fn insert_before(text: impl Into<String>) -> Self {
        Self {
            kind: EditKind::InsertBefore,
            text: text.into(),
        }
    }

    /// New append-to-line op.
    pub fn append(text: impl Into<String>) -> Self {
        Self {
            kind: EditKind::AppendToLine,
            text: text.into(),
        }
    }
}

/// Ordered edits keyed by 1-based line number ([`EOF_APPEND_LINE`] for the
/// end-of-file trailer). Keys iterate in ascending order.
pub type EditMap = BTreeMap<i64, Vec<EditOp>>;

// ---------------------------------------------------------------------------
// Patch applier
// ---------------------------------------------------------------------------

/// Rewrite `path` according to `edits` in one streaming pass.
///
/// `max_line` is the highest real line number carrying edits; on that line
/// the modified content is emitted before any inserted lines, so a boundary
/// tag attached to the document's final line lands after its content.
///
/// `skip_degenerate_first` enables the first-line heuristic: a first line
/// whose trimmed content is the converter placeholder or shorter than two
/// characters is dropped, and the immediately following physical line is
/// dropped too when the logical line 2 carries edits; dropped lines do not
/// advance the logical line counter.
// TODO: confirm upstream whether converters still emit the degenerate
// placeholder pair this heuristic compensates for.
pub fn apply_edits(
    path: &Path,
    edits: &EditMap,
    max_line: Option<i64>,
    skip_degenerate_first: bool,
) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let src = File::open(path).map_err(|e| ChunkweaveError::io(path, e))?;
    let mut reader = BufReader::new(src);
    let mut tmp =
        tempfile::NamedTempFile::new_in(parent).map_err(|e| ChunkweaveError::io(parent, e))?;

    let mut pending: VecDeque<i64> = edits.keys().copied().filter(|k| *k > 0).collect();
    let mut target = pending.pop_front();
    let mut current: i64 = 1;
    let mut skip_pending = false;

    let mut line = String::new();
    loop {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .map_err(|e| ChunkweaveError::io(path, e))?;
        if read == 0 {
            break;
        }

        if target == Some(current) {
            if skip_pending && current == 2 {
                // Drop the line without consuming the logical counter or
                // the pending edit; the next physical line inherits line 2.
                skip_pending = false;
                continue;
            }
            if let Some(ops) = edits.get(&current) {
                write_edited(&mut tmp, &line, ops, max_line == Some(current))
                    .map_err(|e| ChunkweaveError::io(path, e))?;
            }
            target = pending.pop_front();
        } else {
            if skip_degenerate_first && current == 1 {
                let trimmed = line.trim();
                if trimmed == EMPTY_PLACEHOLDER || trimmed.chars().count() < 2 {
                    skip_pending = true;
                    current += 1;
                    continue;
                }
            }
            tmp.write_all(line.as_bytes())
                .map_err(|e| ChunkweaveError::io(path, e))?;
        }
        current += 1;
    }

    if let Some(op) = edits.get(&EOF_APPEND_LINE).and_then(|ops| ops.first()) {
        write!(tmp, "\n{}\n", op.text).map_err(|e| ChunkweaveError::io(path, e))?;
    }

    tmp.flush().map_err(|e| ChunkweaveError::io(path, e))?;
    tmp.persist(path)
        .map_err(|e| ChunkweaveError::io(path, e.error))?;

    debug!(path = %path.display(), edits = edits.len(), "patch pass applied");
    Ok(())
}

/// Render one edited line: insert-before ops become standalone lines,
/// append ops concatenate onto the trimmed current line.
fn write_edited(
    out: &mut impl Write,
    line: &str,
    ops: &[EditOp],
    is_max_line: bool,
) -> std::io::Result<()> {
    let mut inserts: Vec<&str> = Vec::new();
    let mut updated = line.trim().to_string();

    for op in ops {
        match op.kind {
            EditKind::InsertBefore => inserts.push(&op.text),
            EditKind::AppendToLine => updated.push_str(&op.text),
        }
    }

    if is_max_line {
        writeln!(out, "{updated}")?;
        for text in inserts {
            writeln!(out, "{text}")?;
        }
    } else {
        for text in inserts {
            writeln!(out, "{text}")?;
        }
        writeln!(out, "{updated}")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_lines(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).expect("write fixture");
        path
    }

    #[test]
    fn insert_and_append_on_five_line_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_lines(&dir, "doc.md", "L1\nL2\nL3\nL4\nL5\n");

        let mut edits = EditMap::new();
        edits.insert(3, vec![EditOp::insert_before("X")]);
        edits.insert(5, vec![EditOp::append(" tail")]);

        apply_edits(&path, &edits, Some(5), false).expect("apply");

        let out = fs::read_to_string(&path).expect("read");
        assert_eq!(out, "L1\nL2\nX\nL3\nL4\nL5 tail\n");
        assert_eq!(out.lines().count(), 6);
    }

    #[test]
    fn max_line_emits_content_before_inserted_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_lines(&dir, "doc.md", "one\ntwo\n");

        let mut edits = EditMap::new();
        edits.insert(2, vec![EditOp::append("!"), EditOp::insert_before("TAG")]);

        apply_edits(&path, &edits, Some(2), false).expect("apply");

        let out = fs::read_to_string(&path).expect("read");
        assert_eq!(out, "one\ntwo!\nTAG\n");
    }

    #[test]
    fn non_max_line_emits_inserted_lines_first() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_lines(&dir, "doc.md", "one\ntwo\nthree\n");

        let mut edits = EditMap::new();
        edits.insert(2, vec![EditOp::insert_before("TAG")]);

        apply_edits(&path, &edits, Some(3), false).expect("apply");

        let out = fs::read_to_string(&path).expect("read");
        assert_eq!(out, "one\nTAG\ntwo\nthree\n");
    }

    #[test]
    fn eof_key_appends_trailer_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_lines(&dir, "doc.md", "only line\n");

        let mut edits = EditMap::new();
        edits.insert(EOF_APPEND_LINE, vec![EditOp::insert_before("TAG")]);

        apply_edits(&path, &edits, None, false).expect("apply");

        let out = fs::read_to_string(&path).expect("read");
        assert_eq!(out, "only line\n\nTAG\n");
    }

    #[test]
    fn untouched_lines_are_copied_verbatim() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_lines(&dir, "doc.md", "  indented  \nplain\n");

        let edits = EditMap::new();
        apply_edits(&path, &edits, None, false).expect("apply");

        let out = fs::read_to_string(&path).expect("read");
        assert_eq!(out, "  indented  \nplain\n");
    }

    #[test]
    fn degenerate_first_line_dropped_with_edited_second_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_lines(&dir, "doc.md", "\nX\nY\n");

        let mut edits = EditMap::new();
        edits.insert(2, vec![EditOp::insert_before("TAG")]);

        apply_edits(&path, &edits, None, true).expect("apply");

        // Line 1 (empty) is dropped; line "X" is dropped because logical
        // line 2 carries edits; "Y" inherits line 2 and receives them.
        let out = fs::read_to_string(&path).expect("read");
        assert_eq!(out, "TAG\nY\n");
    }

    #[test]
    fn degenerate_first_line_keeps_unedited_second_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_lines(&dir, "doc.md", "None\nX\nY\n");

        let mut edits = EditMap::new();
        edits.insert(3, vec![EditOp::insert_before("TAG")]);

        apply_edits(&path, &edits, None, true).expect("apply");

        let out = fs::read_to_string(&path).expect("read");
        assert_eq!(out, "X\nTAG\nY\n");
    }

    #[test]
    fn healthy_first_line_is_not_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_lines(&dir, "doc.md", "# Title\nbody\n");

        let edits = EditMap::new();
        apply_edits(&path, &edits, None, true).expect("apply");

        let out = fs::read_to_string(&path).expect("read");
        assert_eq!(out, "# Title\nbody\n");
    }

    #[test]
    fn missing_source_file_errors_without_side_effects() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.md");

        let edits = EditMap::new();
        let err = apply_edits(&path, &edits, None, false).expect_err("must fail");
        assert!(matches!(err, ChunkweaveError::Io { .. }));
        // No temp file or partial output left behind.
        assert_eq!(fs::read_dir(dir.path()).expect("read dir").count(), 0);
    }
}
