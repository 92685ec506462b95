//! Positional correction for the deferred title-insert map.
//!
//! The first patch pass inserts boundary tags in ascending line order, so
//! every tag adds one physical line ahead of all later targets. Keys of the
//! deferred map were computed against pre-insertion line numbers and must
//! shift before the second pass: with N distinct keys, the largest shifts
//! by N-1, the next by N-2, and so on. Line 1 never shifts. Only the anchor
//! lines move; the edits themselves are untouched.

use chunkweave_patch::EditMap;

/// Shift the deferred map's keys to post-first-pass coordinates.
pub fn reindex_line_numbers(map: &mut EditMap) {
    if map.is_empty() {
        return;
    }

    let mut index = map.len() as i64;
    let keys: Vec<i64> = map.keys().rev().copied().collect();

    for key in keys {
        if key != 1 {
            if let Some(ops) = map.remove(&key) {
                map.insert(key + (index - 1), ops);
            }
            index -= 1;
        }
    }
}
