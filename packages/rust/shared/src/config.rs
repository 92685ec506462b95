//! Application configuration for Chunkweave.
//!
//! User config lives at `~/.chunkweave/chunkweave.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ChunkweaveError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "chunkweave.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".chunkweave";

// ---------------------------------------------------------------------------
// Config structs (matching chunkweave.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Chunking behavior.
    #[serde(default)]
    pub chunking: ChunkConfig,

    /// Runtime/worker settings.
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// `[chunking]` section — read once per document run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Propagate neighbor labels as quick-question context lines.
    #[serde(default = "default_true")]
    pub enable_content_extraction: bool,

    /// Opening delimiter wrapped around each propagated context label.
    #[serde(default = "default_start_separator")]
    pub content_start_separator: String,

    /// Closing delimiter wrapped around each propagated context label.
    #[serde(default = "default_end_separator")]
    pub content_end_separator: String,

    /// Merge same-level sibling headings into one chunk where possible.
    #[serde(default = "default_true")]
    pub enable_same_level_segmentation: bool,

    /// Re-insert ancestor titles into descendant chunks.
    #[serde(default = "default_true")]
    pub enable_title_compensation: bool,

    /// Generate labels for each chunk (direct or via the summarizer).
    #[serde(default = "default_true")]
    pub enable_tag_reasoning: bool,

    /// Prompt override for label summarization; the built-in template is
    /// used when absent or blank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_reasoning_prompt: Option<String>,

    /// Model hint forwarded to the summarizer backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_reasoning_model: Option<String>,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            enable_content_extraction: true,
            content_start_separator: default_start_separator(),
            content_end_separator: default_end_separator(),
            enable_same_level_segmentation: true,
            enable_title_compensation: true,
            enable_tag_reasoning: true,
            tag_reasoning_prompt: None,
            tag_reasoning_model: None,
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_start_separator() -> String {
    "<quick_question>".into()
}
fn default_end_separator() -> String {
    "</quick_question>".into()
}

/// `[runtime]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Maximum documents processed concurrently.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
        }
    }
}

fn default_worker_count() -> usize {
    4
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.chunkweave/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ChunkweaveError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.chunkweave/chunkweave.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ChunkweaveError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ChunkweaveError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ChunkweaveError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ChunkweaveError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ChunkweaveError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("enable_title_compensation"));
        assert!(toml_str.contains("quick_question"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert!(parsed.chunking.enable_same_level_segmentation);
        assert_eq!(parsed.chunking.content_start_separator, "<quick_question>");
        assert_eq!(parsed.runtime.worker_count, 4);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[chunking]
enable_same_level_segmentation = false
content_start_separator = "<q>"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert!(!config.chunking.enable_same_level_segmentation);
        assert_eq!(config.chunking.content_start_separator, "<q>");
        // Untouched fields keep their defaults.
        assert!(config.chunking.enable_title_compensation);
        assert_eq!(config.chunking.content_end_separator, "</quick_question>");
    }

    #[test]
    fn prompt_override_roundtrip() {
        let toml_str = r#"
[chunking]
tag_reasoning_prompt = "List topics for: {content}"
tag_reasoning_model = "small-fast"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(
            config.chunking.tag_reasoning_prompt.as_deref(),
            Some("List topics for: {content}")
        );
        assert_eq!(
            config.chunking.tag_reasoning_model.as_deref(),
            Some("small-fast")
        );
    }
}
