//! Label and context generation for content blocks.
//!
//! Short blocks become their own label; longer blocks go through the
//! external [`Summarizer`] collaborator, whose output is treated as an
//! untrusted multi-delimited string. Labels are sanitized into an ordered,
//! deduplicated set and propagated as quick-question markers between
//! neighboring blocks. A failed summarization degrades that block only.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use chunkweave_patch::{ContentBlock, EditMap, EditOp};
use chunkweave_shared::{ChunkConfig, EMPTY_PLACEHOLDER, Result};

/// Content at or under this length (in chars) becomes its own label
/// without an external call.
const DIRECT_LABEL_MAX_CHARS: usize = 10;

/// Built-in summarization prompt; `{content}` is replaced with the block
/// text. A configured override that lacks the placeholder gets the content
/// appended instead.
const DEFAULT_LABEL_PROMPT: &str = "Summarize the following content into at most five short \
topic labels, separated by semicolons. Reply with the labels only.\n\n{content}";

/// Delimiters a summarization backend may return, tried in order; the
/// first pattern that actually splits the string wins.
static LABEL_DELIMITERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [";", "；", ",", "，", "、", " ", "<br>", r"\r\n", r"\n"]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("valid regex"))
        .collect()
});

// ---------------------------------------------------------------------------
// Summarizer collaborator
// ---------------------------------------------------------------------------

/// External text-summarization service.
///
/// Implementations are expected to enforce their own timeouts; the engine
/// treats every call as fallible and degrades per block on failure.
pub trait Summarizer: Send + Sync {
    /// Summarize `prompt` into a (possibly multi-delimited) label string.
    fn summarize(&self, prompt: &str, model_hint: Option<&str>) -> Result<String>;
}

/// Fallback summarizer used when no reasoning backend is wired up: takes
/// the first meaningful line of the prompt's final paragraph (the block
/// content under the built-in template), truncated.
#[derive(Debug, Clone)]
pub struct HeuristicSummarizer {
    /// Longest label the heuristic will produce.
    pub max_chars: usize,
}

impl Default for HeuristicSummarizer {
    fn default() -> Self {
        Self { max_chars: 40 }
    }
}

impl Summarizer for HeuristicSummarizer {
    fn summarize(&self, prompt: &str, _model_hint: Option<&str>) -> Result<String> {
        let tail = prompt.rsplit("\n\n").next().unwrap_or(prompt);
        let label: String = tail
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.chars().all(|c| c == '#'))
            .unwrap_or("")
            .chars()
            .take(self.max_chars)
            .collect();
        Ok(label)
    }
}

// ---------------------------------------------------------------------------
// Sanitization
// ---------------------------------------------------------------------------

/// Result of label generation for one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelOutcome {
    /// Ordered, deduplicated labels.
    Labels(Vec<String>),
    /// The external call failed; the block keeps an empty label set.
    Degraded(String),
}

/// Split a noisy label string on the first delimiter that divides it, then
/// trim, strip `#`, drop empties, and deduplicate preserving first-seen
/// order.
pub fn sanitize_labels(raw: &str) -> Vec<String> {
    let mut pieces: Vec<&str> = vec![raw];
    for delimiter in LABEL_DELIMITERS.iter() {
        let split: Vec<&str> = delimiter.split(raw).collect();
        if split.len() > 1 {
            pieces = split;
            break;
        }
    }

    let mut labels: Vec<String> = Vec::new();
    for piece in pieces {
        let label = piece.trim().replace('#', "");
        if !label.is_empty() && !labels.iter().any(|seen| *seen == label) {
            labels.push(label);
        }
    }
    labels
}

// ---------------------------------------------------------------------------
// Generation & propagation
// ---------------------------------------------------------------------------

/// Assign labels to every non-empty block and propagate quick-question
/// context between neighbors.
///
/// Label results are fully collected before propagation runs, so the
/// neighbor exchange always sees final labels. Empty and placeholder-only
/// blocks are dropped from the returned sequence.
pub fn label_blocks(
    blocks: Vec<ContentBlock>,
    cfg: &ChunkConfig,
    summarizer: &dyn Summarizer,
) -> Vec<ContentBlock> {
    // Phase 1: resolve a label outcome per block.
    let mut labeled: Vec<(ContentBlock, Vec<String>)> = Vec::new();
    for mut block in blocks {
        let trimmed = block.content.trim().to_string();
        if trimmed.is_empty() || trimmed == EMPTY_PLACEHOLDER {
            continue;
        }

        let outcome = if trimmed.chars().count() <= DIRECT_LABEL_MAX_CHARS {
            LabelOutcome::Labels(sanitize_labels(&trimmed.replace('#', "")))
        } else {
            let prompt = render_prompt(cfg.tag_reasoning_prompt.as_deref(), &block.content);
            match summarizer.summarize(&prompt, cfg.tag_reasoning_model.as_deref()) {
                Ok(raw) => LabelOutcome::Labels(sanitize_labels(&raw)),
                Err(e) => {
                    warn!(
                        start_line = block.start_line,
                        error = %e,
                        "label summarization failed, degrading block"
                    );
                    LabelOutcome::Degraded(e.to_string())
                }
            }
        };

        let labels = match outcome {
            LabelOutcome::Labels(labels) => labels,
            LabelOutcome::Degraded(_) => Vec::new(),
        };
        block.labels = labels.join(";");
        labeled.push((block, labels));
    }

    // Phase 2: each adjacent pair exchanges labels as context markers.
    if cfg.enable_content_extraction {
        for i in 1..labeled.len() {
            let previous = labeled[i - 1].1.clone();
            let current = labeled[i].1.clone();

            for label in &previous {
                let marker = wrap_marker(cfg, label);
                labeled[i].0.context.push(marker);
            }
            for label in &current {
                let marker = wrap_marker(cfg, label);
                labeled[i - 1].0.context.push(marker);
            }
        }
    }

    labeled.into_iter().map(|(block, _)| block).collect()
}

/// Merge each block's label and context ops into the deferred edit map:
/// labels go in front of the block's start line, context markers follow the
/// block's end line.
pub fn merge_label_edits(blocks: &[ContentBlock], map: &mut EditMap) {
    for block in blocks {
        let label_op = EditOp::insert_before(block.labels.clone());
        match map.get_mut(&block.start_line) {
            Some(ops) => ops.insert(0, label_op),
            None => {
                map.insert(block.start_line, vec![label_op]);
            }
        }

        let context_ops: Vec<EditOp> = block
            .context
            .iter()
            .map(|text| EditOp::insert_before(text.clone()))
            .collect();
        map.insert(block.end_line + 1, context_ops);
    }
}

fn render_prompt(override_template: Option<&str>, content: &str) -> String {
    let template = override_template
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(DEFAULT_LABEL_PROMPT);

    if template.contains("{content}") {
        template.replace("{content}", content)
    } else {
        format!("{template}\n\n{content}")
    }
}

fn wrap_marker(cfg: &ChunkConfig, label: &str) -> String {
    format!(
        "{}{}{}",
        cfg.content_start_separator, label, cfg.content_end_separator
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
