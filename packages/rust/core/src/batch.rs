//! Bounded batch runner for multi-document sharding.
//!
//! Documents are independent — the engine keeps no cross-document state —
//! so each gets its own worker task, capped by a semaphore to bound
//! concurrent summarizer load. Per-document failures never abort the batch.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{info, instrument};

use chunkweave_shared::{ChunkConfig, ChunkweaveError, DocumentId, Result};

use crate::labeling::Summarizer;
use crate::pipeline::{CompletionCallback, ShardOutcome, shard_document};

/// Shard every document with at most `worker_count` running concurrently.
///
/// Results come back in input order, one per path.
#[instrument(skip_all, fields(documents = paths.len(), worker_count))]
pub async fn shard_documents(
    paths: Vec<PathBuf>,
    cfg: ChunkConfig,
    summarizer: Arc<dyn Summarizer>,
    callback: Option<Arc<dyn CompletionCallback>>,
    worker_count: usize,
) -> Vec<(PathBuf, Result<ShardOutcome>)> {
    let semaphore = Arc::new(Semaphore::new(worker_count.max(1)));

    let mut handles = Vec::with_capacity(paths.len());
    for path in paths {
        let semaphore = semaphore.clone();
        let cfg = cfg.clone();
        let summarizer = summarizer.clone();
        let callback = callback.clone();

        handles.push((
            path.clone(),
            tokio::spawn(async move {
                // The semaphore is never closed, so acquisition only fails
                // on runtime shutdown; run unthrottled in that case.
                let _permit = semaphore.acquire_owned().await.ok();
                shard_document(
                    &path,
                    &cfg,
                    summarizer.as_ref(),
                    DocumentId::new(),
                    callback.as_deref(),
                )
            }),
        ));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (path, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(ChunkweaveError::Worker(format!(
                "sharding task for {} did not complete: {e}",
                path.display()
            ))),
        };
        results.push((path, result));
    }

    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    info!(
        total = results.len(),
        failed,
        "batch sharding complete"
    );

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labeling::HeuristicSummarizer;
    use std::fs;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn batch_processes_all_documents_and_isolates_failures() {
        let dir = tempfile::tempdir().expect("tempdir");
        let good = dir.path().join("good.md");
        fs::write(&good, "# A\ntext\n").expect("write");
        let missing = dir.path().join("missing.md");

        let cfg = ChunkConfig {
            enable_tag_reasoning: false,
            ..ChunkConfig::default()
        };

        let results = shard_documents(
            vec![good.clone(), missing.clone()],
            cfg,
            Arc::new(HeuristicSummarizer::default()),
            None,
            2,
        )
        .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, good);
        assert!(results[0].1.is_ok());
        assert_eq!(results[1].0, missing);
        assert!(results[1].1.is_err());

        // The healthy document was still rewritten.
        let tag = chunkweave_shared::boundary_tag().expect("tag");
        let out = fs::read_to_string(&good).expect("read");
        assert!(out.contains(&tag));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn worker_count_of_zero_is_clamped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let doc = dir.path().join("doc.md");
        fs::write(&doc, "plain text without headings\n").expect("write");

        let results = shard_documents(
            vec![doc],
            ChunkConfig::default(),
            Arc::new(HeuristicSummarizer::default()),
            None,
            0,
        )
        .await;

        assert!(results[0].1.is_ok());
    }
}
