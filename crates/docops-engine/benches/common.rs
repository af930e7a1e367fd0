// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use docops_engine::{Block, Document, HeadingLevel, Table};

/// Document of `sections` sections, each a heading, a few paragraphs and
/// every third one a small table
#[allow(dead_code)]
pub fn generate_document(sections: usize) -> Document {
    let mut doc = Document::new();
    for section in 0..sections {
        doc.push(Block::heading(
            HeadingLevel::clamped((section % 3 + 1) as i64),
            format!("Section {section}"),
        ));
        for para in 0..4 {
            doc.push(Block::paragraph(format!(
                "Paragraph {para} of section {section} with some realistic sentence content."
            )));
        }
        if section % 3 == 0 {
            doc.push(Block::Table(Table::new(3, 4)));
        }
    }
    doc
}

/// Copy of `doc` with every fifth paragraph reworded and every seventh dropped
#[allow(dead_code)]
pub fn generate_revision(doc: &Document) -> Document {
    let blocks = doc
        .blocks()
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 7 != 6)
        .map(|(i, block)| match block {
            Block::Paragraph { .. } if i % 5 == 0 => {
                Block::paragraph(format!("Reworded paragraph {i} with different wording."))
            }
            other => other.clone(),
        })
        .collect();
    Document::from_blocks(blocks)
}
