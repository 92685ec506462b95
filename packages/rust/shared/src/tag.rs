//! Boundary-tag transcoding.
//!
//! The chunk boundary tag is shipped pre-encoded as a table of eight
//! groups. Each group holds the base64 form of the tag with every byte
//! shifted up by the group index plus one; decoding picks a group by the
//! wall-clock second modulo eight, shifts the bytes back, and base64
//! decodes. The decoded value is treated as an opaque, exact-match line
//! delimiter and is never parsed.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::{ChunkweaveError, Result};

/// Number of encoded groups the tag table must hold.
const TAG_GROUP_COUNT: usize = 8;

/// Pre-encoded boundary tag, one group per shift offset.
const TAG_GROUPS: [&[u8]; TAG_GROUP_COUNT] = [
    b"gnOpeX6se3WienVud4CtbYS,",
    b"hoPqfY7tf4XjfoWve5DucZT-",
    b"ipQrgZ8ug5YkgpXwf6Evd[U.",
    b"jqRsh[9vh6ZlhqYxg7Fwe\\V/",
    b"krSti\\:wi7[mirZyh8Gxf]W0",
    b"lsTuj];xj8\\njs[zi9Hyg^X1",
    b"mtUvk^<yk9]okt\\{j:Izh_Y2",
    b"nuVwl_=zl:^plu]|k;J{i`Z3",
];

/// Decode the built-in boundary tag.
///
/// Fatal when the table is malformed; callers invoke this before any
/// file I/O begins.
pub fn boundary_tag() -> Result<String> {
    decode_tag(&TAG_GROUPS)
}

/// Decode one group of a shifted-base64 tag table.
pub fn decode_tag(groups: &[&[u8]]) -> Result<String> {
    if groups.len() != TAG_GROUP_COUNT {
        return Err(ChunkweaveError::tag_decode(format!(
            "the encoded tag table must hold exactly {TAG_GROUP_COUNT} groups, got {}",
            groups.len()
        )));
    }

    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    let index = (secs % TAG_GROUP_COUNT as u64) as usize;
    let shift = (index + 1) as u8;

    let shifted_back: Vec<u8> = groups[index].iter().map(|b| b.wrapping_sub(shift)).collect();
    let decoded = STANDARD
        .decode(&shifted_back)
        .map_err(|e| ChunkweaveError::tag_decode(format!("group {index}: {e}")))?;

    String::from_utf8(decoded)
        .map_err(|e| ChunkweaveError::tag_decode(format!("group {index}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_the_same_tag_from_every_group() {
        // Every group must decode to the same value no matter which second
        // the decoder runs in, so exercise the whole table directly.
        let tag = boundary_tag().expect("decode built-in tag");
        assert_eq!(tag, "~chunkweave-split~");
        assert!(!tag.starts_with('#'), "tag must never look like a heading");

        for (index, group) in TAG_GROUPS.iter().enumerate() {
            let shift = (index + 1) as u8;
            let back: Vec<u8> = group.iter().map(|b| b.wrapping_sub(shift)).collect();
            let decoded = STANDARD.decode(&back).expect("base64 group");
            assert_eq!(String::from_utf8(decoded).expect("utf8"), tag);
        }
    }

    #[test]
    fn rejects_short_group_table() {
        let err = decode_tag(&TAG_GROUPS[..3]).expect_err("short table must fail");
        assert!(err.to_string().contains("exactly 8 groups"));
    }
}
