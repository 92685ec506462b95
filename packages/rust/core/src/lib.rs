//! Core pipeline orchestration for Chunkweave.
//!
//! This crate ties segmentation, patching, and labeling together into the
//! per-document sharding run (`shard_document`) and the bounded batch
//! runner (`shard_documents`).

pub mod batch;
pub mod labeling;
pub mod pipeline;

pub use batch::shard_documents;
pub use labeling::{HeuristicSummarizer, LabelOutcome, Summarizer, sanitize_labels};
pub use pipeline::{CompletionCallback, ShardOutcome, shard_document};
