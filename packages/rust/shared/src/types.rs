//! Core domain types for Chunkweave document runs.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder emitted by upstream converters for absent content.
///
/// Lines and blocks consisting solely of this marker are treated as empty.
pub const EMPTY_PLACEHOLDER: &str = "None";

// ---------------------------------------------------------------------------
// DocumentId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for document identifiers (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    /// Generate a new time-sortable document identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// CompletionReport
// ---------------------------------------------------------------------------

/// Outcome report delivered to the completion callback, exactly once per
/// document run, regardless of success or failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionReport {
    /// The processed document.
    pub document_id: DocumentId,
    /// Path of the markdown file that was (or failed to be) rewritten.
    pub file_path: PathBuf,
    /// Whether the run completed without error.
    pub succeeded: bool,
    /// Wall-clock duration of the run in milliseconds.
    pub elapsed_millis: u64,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_id_roundtrip() {
        let id = DocumentId::new();
        let s = id.to_string();
        let parsed: DocumentId = s.parse().expect("parse DocumentId");
        assert_eq!(id, parsed);
    }

    #[test]
    fn completion_report_serialization() {
        let report = CompletionReport {
            document_id: DocumentId::new(),
            file_path: PathBuf::from("/tmp/doc.md"),
            succeeded: true,
            elapsed_millis: 42,
            finished_at: Utc::now(),
        };

        let json = serde_json::to_string(&report).expect("serialize");
        let parsed: CompletionReport = serde_json::from_str(&json).expect("deserialize");
        assert!(parsed.succeeded);
        assert_eq!(parsed.elapsed_millis, 42);
    }
}
