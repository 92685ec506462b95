//! Chunk-boundary classification for the heading forest.
//!
//! A pure transform annotates every heading with one of four states
//! instead of mutating boundary flags on shared tree nodes. The net
//! policy: deep subtrees split at the finest granularity with ancestor
//! titles compensated into descendants; shallow subtrees merge into a
//! single chunk when same-level segmentation applies.

use crate::heading::HeadingNode;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// How a heading participates in chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    /// Subsumed into an ancestor's chunk; contributes no edits of its own.
    Interior,
    /// Boundary around a childless heading's range.
    Leaf,
    /// Boundary around the whole subtree, kept as a single chunk.
    Merged,
    /// Boundary whose title is re-inserted into each descendant's chunk.
    Compensated,
}

/// A heading annotated with its chunking class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedNode {
    pub title: String,
    pub level: u8,
    pub start_line: i64,
    pub end_line: i64,
    pub class: NodeClass,
    pub children: Vec<ClassifiedNode>,
}

/// Document-level merge flag: same-level segmentation is configured on AND
/// at least one top-level heading is deep.
pub fn merge_same_level_siblings(segmentation_enabled: bool, forest: &[HeadingNode]) -> bool {
    segmentation_enabled && forest.iter().any(|node| node.is_deep)
}

/// Classify the whole forest. Returns a new annotated tree; the heading
/// forest itself is left untouched.
pub fn classify_forest(forest: &[HeadingNode], merge_siblings: bool) -> Vec<ClassifiedNode> {
    forest
        .iter()
        .map(|node| classify_node(node, merge_siblings, false))
        .collect()
}

/// Single deterministic classification of (has-children, is-deep,
/// ancestor-subsumption). Children of a `Merged` node are `Interior`;
/// only `Compensated` nodes keep classifying downward.
fn classify_node(node: &HeadingNode, merge_siblings: bool, subsumed: bool) -> ClassifiedNode {
    let class = if subsumed {
        NodeClass::Interior
    } else if node.children.is_empty() {
        NodeClass::Leaf
    } else if merge_siblings && !node.is_deep {
        NodeClass::Merged
    } else {
        NodeClass::Compensated
    };

    let child_subsumed = subsumed || class == NodeClass::Merged;
    let children = node
        .children
        .iter()
        .map(|child| classify_node(child, merge_siblings, child_subsumed))
        .collect();

    ClassifiedNode {
        title: node.title.clone(),
        level: node.level,
        start_line: node.start_line,
        end_line: node.end_line,
        class,
        children,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
