use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::editing::Document;

/// Number of hex digits of the digest kept in an anchor
const ANCHOR_HASH_LEN: usize = 10;

/// One addressable heading or paragraph in a document snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub anchor: String,
    pub text: String,
    /// `0` for body paragraphs, `1..=6` for headings
    pub level: u8,
}

/// Collapse whitespace runs to a single space and trim both ends
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Derive the anchor for a block from its text, outline level and position.
///
/// Headings get an `h<level>-` prefix, body paragraphs `p-`. The anchor is a
/// pure function of its inputs, so it only identifies a block within the
/// snapshot it was computed from.
pub fn anchor_for(text: &str, level: u8, position: usize) -> String {
    let payload = format!("{}|{}|{}", normalize_text(text), level, position);
    let digest = Sha256::digest(payload.as_bytes());

    let mut hash = String::with_capacity(ANCHOR_HASH_LEN + 1);
    for byte in digest.iter().take(ANCHOR_HASH_LEN.div_ceil(2)) {
        hash.push_str(&format!("{byte:02x}"));
    }
    hash.truncate(ANCHOR_HASH_LEN);

    if level > 0 {
        format!("h{level}-{hash}")
    } else {
        format!("p-{hash}")
    }
}

/// Build the ordered outline of a document.
///
/// Positions count every block, tables included, but tables themselves are
/// not anchored and produce no entry.
pub fn build_outline(doc: &Document) -> Vec<OutlineEntry> {
    anchored_blocks(doc)
        .map(|(_, anchor, text, level)| OutlineEntry {
            anchor,
            text,
            level,
        })
        .collect()
}

/// Position of the first block whose current anchor equals `anchor`
pub(crate) fn resolve_anchor(doc: &Document, anchor: &str) -> Option<usize> {
    anchored_blocks(doc)
        .find(|(_, candidate, _, _)| candidate == anchor)
        .map(|(position, _, _, _)| position)
}

/// Positions of every block whose current anchor equals `anchor`
pub(crate) fn positions_with_anchor(doc: &Document, anchor: &str) -> Vec<usize> {
    anchored_blocks(doc)
        .filter(|(_, candidate, _, _)| candidate == anchor)
        .map(|(position, _, _, _)| position)
        .collect()
}

fn anchored_blocks(doc: &Document) -> impl Iterator<Item = (usize, String, String, u8)> + '_ {
    doc.blocks()
        .iter()
        .enumerate()
        .filter_map(|(position, block)| {
            let level = block.level()?;
            let text = block.text()?;
            let anchor = anchor_for(&text, level, position);
            Some((position, anchor, text, level))
        })
}
