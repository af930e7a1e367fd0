//! Markdown document backend.
//!
//! Reads CommonMark with GFM tables and strikethrough into blocks and writes
//! the same dialect back. List items and code blocks load as plain
//! paragraphs; a table's header row loads bold. Empty paragraphs have no
//! Markdown form and are dropped on save.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::editing::Document;
use crate::io::{BackendError, DocumentBackend};
use crate::models::{Block, Cell, Formatting, HeadingLevel, RichText, Run, Table};

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownBackend;

impl DocumentBackend for MarkdownBackend {
    fn extension(&self) -> &'static str {
        "md"
    }

    fn load(&self, bytes: &[u8]) -> Result<Document, BackendError> {
        let text = std::str::from_utf8(bytes)?;
        Ok(parse_markdown(text))
    }

    fn save(&self, doc: &Document) -> Result<Vec<u8>, BackendError> {
        Ok(to_markdown(doc).into_bytes())
    }
}

/// Parse Markdown text into a document
pub fn parse_markdown(text: &str) -> Document {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let mut loader = MarkdownLoader::default();
    for event in Parser::new_ext(text, options) {
        loader.process_event(event);
    }
    loader.finalize()
}

/// Text block being accumulated
struct Pending {
    heading: Option<u8>,
    body: RichText,
}

#[derive(Default)]
struct TableBuilder {
    rows: Vec<Vec<Cell>>,
    row: Vec<Cell>,
    cell: Option<RichText>,
    in_head: bool,
}

/// Event-driven state for turning pulldown-cmark events into blocks
#[derive(Default)]
struct MarkdownLoader {
    blocks: Vec<Block>,
    current: Option<Pending>,
    table: Option<TableBuilder>,
    bold: usize,
    italic: usize,
    strike: usize,
}

impl MarkdownLoader {
    fn process_event(&mut self, event: Event) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => self.begin(Some(level as u8)),
            Event::End(TagEnd::Heading(_)) => self.finish(),
            Event::Start(Tag::Paragraph) | Event::Start(Tag::CodeBlock(_)) => self.begin(None),
            Event::End(TagEnd::Paragraph) | Event::End(TagEnd::CodeBlock) => self.finish(),
            // A list item's text starts a new paragraph; a nested list inside
            // the item ends the parent's text.
            Event::Start(Tag::Item) => {
                self.finish();
                self.begin(None);
            }
            Event::End(TagEnd::Item) => self.finish(),
            Event::Start(Tag::Table(_)) => {
                self.finish();
                self.table = Some(TableBuilder::default());
            }
            Event::End(TagEnd::Table) => {
                if let Some(table) = self.table.take() {
                    self.blocks.push(Block::Table(Table { rows: table.rows }));
                }
            }
            Event::Start(Tag::TableHead) => {
                if let Some(table) = self.table.as_mut() {
                    table.in_head = true;
                    table.row.clear();
                }
            }
            Event::End(TagEnd::TableHead) => {
                if let Some(table) = self.table.as_mut() {
                    table.in_head = false;
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                }
            }
            Event::Start(Tag::TableRow) => {
                if let Some(table) = self.table.as_mut() {
                    table.row.clear();
                }
            }
            Event::End(TagEnd::TableRow) => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                }
            }
            Event::Start(Tag::TableCell) => {
                if let Some(table) = self.table.as_mut() {
                    table.cell = Some(RichText::new());
                }
            }
            Event::End(TagEnd::TableCell) => {
                if let Some(table) = self.table.as_mut() {
                    let mut body = table.cell.take().unwrap_or_default();
                    if table.in_head {
                        body.set_bold();
                    }
                    table.row.push(Cell { body });
                }
            }
            Event::Start(Tag::Strong) => self.bold += 1,
            Event::End(TagEnd::Strong) => self.bold = self.bold.saturating_sub(1),
            Event::Start(Tag::Emphasis) => self.italic += 1,
            Event::End(TagEnd::Emphasis) => self.italic = self.italic.saturating_sub(1),
            Event::Start(Tag::Strikethrough) => self.strike += 1,
            Event::End(TagEnd::Strikethrough) => self.strike = self.strike.saturating_sub(1),
            Event::Text(text) | Event::Code(text) => self.push_text(&text),
            Event::SoftBreak => self.push_text(" "),
            Event::HardBreak => self.push_text("\n"),
            _ => {}
        }
    }

    fn begin(&mut self, heading: Option<u8>) {
        if self.current.as_ref().is_some_and(|p| !p.body.is_empty()) {
            self.finish();
        }
        match self.current.as_mut() {
            Some(pending) => pending.heading = heading.or(pending.heading),
            None => {
                self.current = Some(Pending {
                    heading,
                    body: RichText::new(),
                })
            }
        }
    }

    fn finish(&mut self) {
        let Some(Pending { heading, mut body }) = self.current.take() else {
            return;
        };
        if let Some(last) = body.runs.last_mut() {
            let trimmed = last.text.trim_end_matches('\n').len();
            last.text.truncate(trimmed);
        }
        match heading {
            Some(level) => self.blocks.push(Block::Heading {
                level: HeadingLevel::from(level),
                body,
            }),
            None if !body.is_empty() => self.blocks.push(Block::Paragraph { body }),
            None => {}
        }
    }

    fn format(&self) -> Formatting {
        Formatting {
            bold: self.bold > 0,
            italic: self.italic > 0,
            strike: self.strike > 0,
            ..Formatting::default()
        }
    }

    fn push_text(&mut self, text: &str) {
        let format = self.format();
        if let Some(cell) = self.table.as_mut().and_then(|t| t.cell.as_mut()) {
            cell.push_text(text, &format);
            return;
        }
        if self.current.is_none() {
            self.begin(None);
        }
        if let Some(pending) = self.current.as_mut() {
            pending.body.push_text(text, &format);
        }
    }

    fn finalize(mut self) -> Document {
        self.finish();
        Document::from_blocks(self.blocks)
    }
}

/// Render a document as Markdown
pub fn to_markdown(doc: &Document) -> String {
    let mut sections = Vec::new();
    for block in doc.blocks() {
        match block {
            Block::Heading { level, body } => {
                sections.push(format!("{} {}", "#".repeat(level.get() as usize), inline(body)));
            }
            Block::Paragraph { body } => {
                let text = inline(body);
                if !text.trim().is_empty() {
                    sections.push(escape_block_start(&text));
                }
            }
            Block::Table(table) => {
                if let Some(rendered) = render_table(table) {
                    sections.push(rendered);
                }
            }
        }
    }
    let mut out = sections.join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn render_table(table: &Table) -> Option<String> {
    let cols = table.col_count();
    if table.row_count() == 0 || cols == 0 {
        return None;
    }
    let row_line = |cells: &[Cell]| {
        let texts: Vec<String> = (0..cols)
            .map(|col| {
                cells
                    .get(col)
                    .map(|cell| cell_text(&cell.body))
                    .unwrap_or_default()
            })
            .collect();
        format!("| {} |", texts.join(" | "))
    };

    let mut lines = Vec::with_capacity(table.row_count() + 1);
    lines.push(row_line(&table.rows[0]));
    lines.push(format!("|{}", " --- |".repeat(cols)));
    for row in &table.rows[1..] {
        lines.push(row_line(row));
    }
    Some(lines.join("\n"))
}

/// Header cells are bold by construction, so bold is not re-emitted there
fn cell_text(body: &RichText) -> String {
    let runs: Vec<Run> = body
        .runs
        .iter()
        .map(|run| {
            let mut run = run.clone();
            if body.is_bold() {
                run.format.bold = false;
            }
            run
        })
        .collect();
    inline(&RichText { runs }).replace('|', "\\|")
}

fn inline(body: &RichText) -> String {
    body.runs.iter().map(inline_run).collect()
}

fn inline_run(run: &Run) -> String {
    let escaped = escape_inline(&run.text);
    let core = escaped.trim();
    if core.is_empty() {
        return escaped;
    }
    let mut marker = String::new();
    if run.format.strike {
        marker.push_str("~~");
    }
    if run.format.bold {
        marker.push_str("**");
    }
    if run.format.italic {
        marker.push('*');
    }
    if marker.is_empty() {
        return escaped;
    }
    // Delimiters must hug the text, so surrounding spaces stay outside
    let leading = &escaped[..escaped.len() - escaped.trim_start().len()];
    let trailing = &escaped[escaped.trim_end().len()..];
    let closing: String = marker.chars().rev().collect();
    format!("{leading}{marker}{core}{closing}{trailing}")
}

fn escape_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '*' | '_' | '~' | '`' | '[' | ']') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Keep a paragraph from being read back as a heading, list or table
fn escape_block_start(text: &str) -> String {
    let starts_block = text.starts_with('#')
        || text.starts_with("- ")
        || text.starts_with("+ ")
        || text.starts_with('>')
        || text.starts_with('|');
    if starts_block {
        return format!("\\{text}");
    }
    // "1. item" and "1) item" would read back as an ordered list
    let digits = text.len() - text.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    let rest = &text[digits..];
    if digits > 0 && (rest.starts_with(". ") || rest.starts_with(") ") || rest == "." || rest == ")") {
        return format!("{}\\{}", &text[..digits], rest);
    }
    text.to_string()
}
