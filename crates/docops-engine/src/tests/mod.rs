use std::path::PathBuf;

use tempfile::TempDir;

use crate::editing::{Document, OutlineEntry};
use crate::models::{Block, Cell, HeadingLevel, RichText, Table};

/// Heading, paragraphs and a bold-headed table interleaved in one document
pub fn interleaved_document() -> Document {
    let header = |text: &str| {
        let mut body = RichText::plain(text);
        body.set_bold();
        Cell { body }
    };
    let cell = |text: &str| Cell {
        body: RichText::plain(text),
    };

    Document::from_blocks(vec![
        Block::heading(HeadingLevel::clamped(1), "Quarterly report"),
        Block::paragraph("Revenue grew this quarter."),
        Block::Table(Table {
            rows: vec![
                vec![header("Quarter"), header("Revenue")],
                vec![cell("Q1"), cell("100")],
            ],
        }),
        Block::heading(HeadingLevel::clamped(2), "Outlook"),
        Block::paragraph("We expect further growth."),
    ])
}

pub fn texts_of(outline: &[OutlineEntry]) -> Vec<&str> {
    outline.iter().map(|entry| entry.text.as_str()).collect()
}

/// Create a temporary storage directory
pub fn create_test_storage_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Write a file into the storage directory
pub fn create_test_file(dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let file_path = dir.path().join(filename);
    std::fs::write(&file_path, content).unwrap();
    file_path
}
