//! Heading hierarchy construction and chunk-boundary planning.
//!
//! This crate owns the read side of the segmentation engine: it extracts
//! ATX headings from a markdown file, rebuilds their nesting, classifies
//! each node as a chunk boundary, and plans the line-level edits that the
//! patch applier executes. The heading tree lives for one document run and
//! is discarded once the edit maps are planned.

pub mod heading;
pub mod marker;
pub mod planner;
pub mod reindex;

pub use heading::{HeadingNode, heading_forest, heading_forest_from_reader};
pub use marker::{ClassifiedNode, NodeClass, classify_forest, merge_same_level_siblings};
pub use planner::plan_edits;
pub use reindex::reindex_line_numbers;
