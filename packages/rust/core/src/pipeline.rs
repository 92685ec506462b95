//! Per-document sharding pipeline.
//!
//! Stage order mirrors the engine design: segment → first patch pass
//! (boundary tags, with the degenerate-first-line heuristic) → reindex the
//! deferred title map → split blocks → label & propagate context → second
//! patch pass. A completion callback is invoked exactly once per run,
//! success or failure.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{error, info, instrument};

use chunkweave_patch::{ContentBlock, EOF_APPEND_LINE, EditMap, EditOp, apply_edits, split_blocks};
use chunkweave_segment::{
    classify_forest, heading_forest, merge_same_level_siblings, plan_edits, reindex_line_numbers,
};
use chunkweave_shared::{ChunkConfig, CompletionReport, DocumentId, Result, boundary_tag};

use crate::labeling::{Summarizer, label_blocks, merge_label_edits};

// ---------------------------------------------------------------------------
// Callback & outcome
// ---------------------------------------------------------------------------

/// Per-document completion hook, called exactly once at the end of a run
/// with outcome and timing, regardless of success or failure.
pub trait CompletionCallback: Send + Sync {
    fn completed(&self, report: &CompletionReport);
}

/// Result of a successful sharding run.
#[derive(Debug, Clone)]
pub struct ShardOutcome {
    /// The processed document.
    pub document_id: DocumentId,
    /// Path of the rewritten file.
    pub file_path: PathBuf,
    /// Number of boundary tags written by the first pass.
    pub boundary_count: usize,
    /// Number of blocks that received labels.
    pub labeled_blocks: usize,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Shard one markdown document in place.
#[instrument(skip_all, fields(document_id = %document_id, path = %path.display()))]
pub fn shard_document(
    path: &Path,
    cfg: &ChunkConfig,
    summarizer: &dyn Summarizer,
    document_id: DocumentId,
    callback: Option<&dyn CompletionCallback>,
) -> Result<ShardOutcome> {
    let start = Instant::now();
    let result = run_pipeline(path, cfg, summarizer);

    let report = CompletionReport {
        document_id,
        file_path: path.to_path_buf(),
        succeeded: result.is_ok(),
        elapsed_millis: start.elapsed().as_millis() as u64,
        finished_at: Utc::now(),
    };
    if let Some(callback) = callback {
        callback.completed(&report);
    }

    match result {
        Ok((boundary_count, labeled_blocks)) => {
            info!(boundary_count, labeled_blocks, "document sharded");
            Ok(ShardOutcome {
                document_id,
                file_path: path.to_path_buf(),
                boundary_count,
                labeled_blocks,
                elapsed: start.elapsed(),
            })
        }
        Err(e) => {
            error!(error = %e, "document sharding failed");
            Err(e)
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline body
// ---------------------------------------------------------------------------

fn run_pipeline(
    path: &Path,
    cfg: &ChunkConfig,
    summarizer: &dyn Summarizer,
) -> Result<(usize, usize)> {
    // Decoded before any file I/O; a bad tag table is fatal.
    let tag = boundary_tag()?;

    let forest = heading_forest(path)?;

    let mut title_inserts = EditMap::new();
    let mut boundary_count = 0usize;

    if forest.is_empty() {
        info!("no headings extracted, tagging whole document as one chunk");
        let mut edits = EditMap::new();
        edits.insert(EOF_APPEND_LINE, vec![EditOp::insert_before(tag.as_str())]);
        apply_edits(path, &edits, None, false)?;
        boundary_count = 1;
    } else {
        let merge = merge_same_level_siblings(cfg.enable_same_level_segmentation, &forest);
        let classified = classify_forest(&forest, merge);

        let mut min_line: i64 = 0;
        let mut max_line: i64 = 0;
        for node in &forest {
            if min_line == 0 || node.start_line < min_line {
                min_line = node.start_line;
            }
            if max_line == 0 || node.end_line > max_line {
                max_line = node.end_line;
            }
        }

        let mut edits = EditMap::new();
        for node in &classified {
            plan_edits(
                node,
                &mut edits,
                &mut title_inserts,
                cfg.enable_title_compensation,
                "",
                &tag,
            );
        }

        if !edits.is_empty() {
            // Content ahead of the first heading becomes its own chunk.
            if min_line != 1 && !edits.contains_key(&min_line) {
                edits.insert(min_line, vec![EditOp::insert_before(tag.as_str())]);
            }
            boundary_count = edits.len();
            apply_edits(path, &edits, Some(max_line), true)?;
        }
    }

    // The first pass grew the file; move the deferred keys accordingly.
    reindex_line_numbers(&mut title_inserts);

    let mut labeled_blocks = 0usize;
    if cfg.enable_tag_reasoning {
        let blocks = split_blocks(path, &tag)?;
        let blocks: Vec<ContentBlock> = label_blocks(blocks, cfg, summarizer);
        labeled_blocks = blocks.len();
        merge_label_edits(&blocks, &mut title_inserts);
    }

    if cfg.enable_tag_reasoning || cfg.enable_title_compensation {
        apply_edits(path, &title_inserts, None, false)?;
    }

    Ok((boundary_count, labeled_blocks))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
