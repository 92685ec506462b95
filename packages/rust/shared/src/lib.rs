//! Shared types, error model, and configuration for Chunkweave.
//!
//! This crate is the foundation depended on by all other Chunkweave crates.
//! It provides:
//! - [`ChunkweaveError`] — the unified error type
//! - Domain types ([`DocumentId`], [`CompletionReport`])
//! - Configuration ([`AppConfig`], [`ChunkConfig`], config loading)
//! - The boundary-tag transcoding step ([`boundary_tag`])

pub mod config;
pub mod error;
pub mod tag;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ChunkConfig, RuntimeConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{ChunkweaveError, Result};
pub use tag::{boundary_tag, decode_tag};
pub use types::{CompletionReport, DocumentId, EMPTY_PLACEHOLDER};
