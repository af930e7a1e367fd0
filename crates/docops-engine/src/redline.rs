//! Redline comparison between two document revisions.
//!
//! Paragraph texts of both revisions are aligned line by line; changed lines
//! are then aligned word by word and rendered as runs, deleted text in red
//! strikethrough and inserted text in green underline. Tables take no part
//! in the comparison.

use std::hash::Hash;
use std::ops::Range;

use similar::{Algorithm, DiffTag, capture_diff_slices};

use crate::editing::Document;
use crate::models::{Block, Formatting, HeadingLevel, RichText, Rgb, Run};

/// Heading placed at the top of every redline document
pub const DEFAULT_TITLE: &str = "Redline (visual) compare";

pub const DELETED_COLOR: Rgb = Rgb(220, 0, 0);
pub const INSERTED_COLOR: Rgb = Rgb(0, 140, 0);

/// One aligned span between a base and a revised sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opcode {
    Equal { base: Range<usize>, revised: Range<usize> },
    Delete { base: Range<usize>, at: usize },
    Insert { at: usize, revised: Range<usize> },
    Replace { base: Range<usize>, revised: Range<usize> },
}

impl Opcode {
    /// The same alignment seen from the other side: deletes become inserts
    /// and the ranges trade places.
    pub fn swapped(&self) -> Self {
        match self.clone() {
            Opcode::Equal { base, revised } => Opcode::Equal {
                base: revised,
                revised: base,
            },
            Opcode::Delete { base, at } => Opcode::Insert { at, revised: base },
            Opcode::Insert { at, revised } => Opcode::Delete { base: revised, at },
            Opcode::Replace { base, revised } => Opcode::Replace {
                base: revised,
                revised: base,
            },
        }
    }
}

/// Align two sequences into ordered opcodes covering both completely
pub fn opcodes<T: Eq + Hash + Ord>(base: &[T], revised: &[T]) -> Vec<Opcode> {
    capture_diff_slices(Algorithm::Myers, base, revised)
        .iter()
        .map(|op| {
            let (tag, base, revised) = op.as_tag_tuple();
            match tag {
                DiffTag::Equal => Opcode::Equal { base, revised },
                DiffTag::Delete => Opcode::Delete {
                    base,
                    at: revised.start,
                },
                DiffTag::Insert => Opcode::Insert {
                    at: base.start,
                    revised,
                },
                DiffTag::Replace => Opcode::Replace { base, revised },
            }
        })
        .collect()
}

pub fn deleted_format() -> Formatting {
    Formatting {
        strike: true,
        ..Formatting::default()
    }
    .with_color(DELETED_COLOR)
}

pub fn inserted_format() -> Formatting {
    Formatting {
        underline: true,
        ..Formatting::default()
    }
    .with_color(INSERTED_COLOR)
}

/// Compare two revisions under the default title
pub fn compare(base: &Document, revised: &Document) -> Document {
    compare_with_title(base, revised, DEFAULT_TITLE)
}

/// Build an annotated document showing how `revised` differs from `base`.
/// Neither input is modified.
pub fn compare_with_title(base: &Document, revised: &Document, title: &str) -> Document {
    let base_texts = base.paragraph_texts();
    let revised_texts = revised.paragraph_texts();

    let mut out = Document::new();
    out.push(Block::heading(HeadingLevel::default(), title));

    for opcode in opcodes(&base_texts, &revised_texts) {
        match opcode {
            Opcode::Equal { base, .. } => {
                for text in &base_texts[base] {
                    out.push(Block::paragraph(text.as_str()));
                }
            }
            Opcode::Delete { base, .. } => {
                for text in &base_texts[base] {
                    out.push(Block::paragraph_with(RichText::styled(
                        text.as_str(),
                        deleted_format(),
                    )));
                }
            }
            Opcode::Insert { revised, .. } => {
                for text in &revised_texts[revised] {
                    out.push(Block::paragraph_with(RichText::styled(
                        text.as_str(),
                        inserted_format(),
                    )));
                }
            }
            Opcode::Replace { base, revised } => {
                let old_lines = &base_texts[base];
                let new_lines = &revised_texts[revised];
                let pairs = old_lines.len().max(new_lines.len());
                for i in 0..pairs {
                    let old = old_lines.get(i).map(String::as_str).unwrap_or("");
                    let new = new_lines.get(i).map(String::as_str).unwrap_or("");
                    out.push(Block::paragraph_with(word_diff(old, new)));
                }
            }
        }
    }

    log::debug!(
        "redline: {} base and {} revised paragraphs -> {} blocks",
        base_texts.len(),
        revised_texts.len(),
        out.len()
    );
    out
}

/// Word-level redline of one changed line. Each run starts with a single
/// space followed by its words joined by spaces.
pub fn word_diff(old: &str, new: &str) -> RichText {
    let old_words: Vec<&str> = old.split_whitespace().collect();
    let new_words: Vec<&str> = new.split_whitespace().collect();
    let mut body = RichText::new();

    for opcode in opcodes(&old_words, &new_words) {
        match opcode {
            Opcode::Equal { base, .. } => body.push(Run::plain(spaced(&old_words[base]))),
            Opcode::Delete { base, .. } => {
                body.push(Run::styled(spaced(&old_words[base]), deleted_format()));
            }
            Opcode::Insert { revised, .. } => {
                body.push(Run::styled(spaced(&new_words[revised]), inserted_format()));
            }
            Opcode::Replace { base, revised } => {
                body.push(Run::styled(spaced(&old_words[base]), deleted_format()));
                body.push(Run::styled(spaced(&new_words[revised]), inserted_format()));
            }
        }
    }
    body
}

fn spaced(words: &[&str]) -> String {
    format!(" {}", words.join(" "))
}
