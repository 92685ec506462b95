//! Edit planning: walk the classified forest and emit line-edit maps.
//!
//! Produces two coordinate maps per document. The boundary map carries the
//! chunk tags (and is applied first); the title-insert map carries deferred
//! title-compensation appends whose keys are corrected by the reindexer
//! once the first pass has grown the file.

use chunkweave_patch::{EditMap, EditOp};

use crate::marker::{ClassifiedNode, NodeClass};

/// Plan the edits for one top-level node.
///
/// `inherited_title` is the concatenation of ancestor titles accumulated on
/// the way down; it is appended to a boundary node's start line when title
/// compensation is enabled. For a compensated node the single boundary tag
/// anchors at `end_line - 1`, where `end_line` is the minimum child start
/// line (naming kept literal: the line just before the first child's
/// content).
pub fn plan_edits(
    node: &ClassifiedNode,
    edits: &mut EditMap,
    title_inserts: &mut EditMap,
    compensation_enabled: bool,
    inherited_title: &str,
    boundary_tag: &str,
) {
    match node.class {
        NodeClass::Leaf | NodeClass::Merged => {
            if compensation_enabled && !inherited_title.is_empty() {
                title_inserts.insert(node.start_line, vec![EditOp::append(inherited_title)]);
            }
            edits.insert(node.end_line, vec![EditOp::insert_before(boundary_tag)]);
        }
        NodeClass::Compensated => {
            let mut compensate_context = String::new();
            let mut end_line: i64 = 0;
            let prefix = format!("{}{}", node.title, inherited_title);

            for child in &node.children {
                compensate_context.push_str(&child.title);
                if end_line == 0 || end_line > child.start_line {
                    end_line = child.start_line;
                }
                plan_edits(
                    child,
                    edits,
                    title_inserts,
                    compensation_enabled,
                    &prefix,
                    boundary_tag,
                );
            }

            if !compensate_context.is_empty() && compensation_enabled {
                title_inserts.insert(node.start_line, vec![EditOp::append(compensate_context)]);
            }
            edits.insert(end_line - 1, vec![EditOp::insert_before(boundary_tag)]);
        }
        NodeClass::Interior => {}
    }
}
