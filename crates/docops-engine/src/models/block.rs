use serde::{Deserialize, Serialize};

/// 24-bit run colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Hex form without the leading `#`, e.g. `dc0000`
    pub fn to_hex(self) -> String {
        format!("{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Character formatting carried by a run.
///
/// `font_family` and `font_size` are `None` when the run inherits them from
/// its paragraph style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Formatting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Size in points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strike: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Formatting {
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    /// True when nothing about the run differs from the inherited style
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

/// A contiguous span of text sharing one [`Formatting`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    #[serde(default, skip_serializing_if = "Formatting::is_plain")]
    pub format: Formatting,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: Formatting::default(),
        }
    }

    pub fn styled(text: impl Into<String>, format: Formatting) -> Self {
        Self {
            text: text.into(),
            format,
        }
    }
}

/// Ordered runs making up the text of a heading, paragraph or table cell
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichText {
    pub runs: Vec<Run>,
}

impl RichText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::styled(text, Formatting::default())
    }

    pub fn styled(text: impl Into<String>, format: Formatting) -> Self {
        Self {
            runs: vec![Run::styled(text, format)],
        }
    }

    /// Concatenated text of all runs
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|run| run.text.is_empty())
    }

    /// Formatting of the first run, if there is one
    pub fn first_format(&self) -> Option<&Formatting> {
        self.runs.first().map(|run| &run.format)
    }

    pub fn push(&mut self, run: Run) {
        self.runs.push(run);
    }

    /// Append text, extending the last run when the formatting matches.
    pub fn push_text(&mut self, text: &str, format: &Formatting) {
        if text.is_empty() {
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.format == *format => last.text.push_str(text),
            _ => self.runs.push(Run::styled(text, format.clone())),
        }
    }

    /// Replace the whole text with a single run keeping the first run's
    /// formatting. Run boundaries inside the old text are discarded.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let format = self.first_format().cloned().unwrap_or_default();
        self.runs = vec![Run::styled(text, format)];
    }

    /// Mark every run bold. Empty text gets a zero-length bold run so the
    /// formatting survives a later [`RichText::set_text`].
    pub fn set_bold(&mut self) {
        if self.runs.is_empty() {
            self.runs.push(Run::styled(String::new(), Formatting::bold()));
            return;
        }
        for run in &mut self.runs {
            run.format.bold = true;
        }
    }

    pub fn is_bold(&self) -> bool {
        !self.runs.is_empty() && self.runs.iter().all(|run| run.format.bold)
    }
}

/// Heading level, always within `1..=6`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    /// Clamp any integer into the valid heading range
    pub fn clamped(level: i64) -> Self {
        Self(level.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for HeadingLevel {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl From<u8> for HeadingLevel {
    fn from(level: u8) -> Self {
        Self::clamped(level as i64)
    }
}

impl From<HeadingLevel> for u8 {
    fn from(level: HeadingLevel) -> Self {
        level.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub body: RichText,
}

impl Cell {
    pub fn text(&self) -> String {
        self.body.text()
    }
}

/// Row-major grid of cells
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Empty table with the given dimensions
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: (0..rows).map(|_| vec![Cell::default(); cols]).collect(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|cells| cells.get(col))
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.rows.get_mut(row).and_then(|cells| cells.get_mut(col))
    }

    /// Cell texts, row-major
    pub fn texts(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|cells| cells.iter().map(Cell::text).collect())
            .collect()
    }
}

/// One structural unit of a document.
///
/// Blocks carry no identity of their own; they are addressed by their
/// position in the owning [`crate::Document`] or by the anchor derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Heading { level: HeadingLevel, body: RichText },
    Paragraph { body: RichText },
    Table(Table),
}

impl Block {
    pub fn heading(level: HeadingLevel, text: impl Into<String>) -> Self {
        Block::Heading {
            level,
            body: RichText::plain(text),
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph {
            body: RichText::plain(text),
        }
    }

    pub fn paragraph_with(body: RichText) -> Self {
        Block::Paragraph { body }
    }

    /// Outline level: `0` for body paragraphs, `1..=6` for headings.
    /// Tables have no level.
    pub fn level(&self) -> Option<u8> {
        match self {
            Block::Heading { level, .. } => Some(level.get()),
            Block::Paragraph { .. } => Some(0),
            Block::Table(_) => None,
        }
    }

    /// Text body of a heading or paragraph
    pub fn body(&self) -> Option<&RichText> {
        match self {
            Block::Heading { body, .. } | Block::Paragraph { body } => Some(body),
            Block::Table(_) => None,
        }
    }

    pub fn body_mut(&mut self) -> Option<&mut RichText> {
        match self {
            Block::Heading { body, .. } | Block::Paragraph { body } => Some(body),
            Block::Table(_) => None,
        }
    }

    pub fn text(&self) -> Option<String> {
        self.body().map(RichText::text)
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Block::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match self {
            Block::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table(_))
    }
}
