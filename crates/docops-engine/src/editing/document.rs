use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::editing::anchors::{self, OutlineEntry};
use crate::editing::{
    ApplyReport, MalformedOperation, Operation, Outcome, ParagraphTarget, TableEdit,
};
use crate::models::{Block, Formatting, HeadingLevel, RichText, Table};

/// Point size given to cells filled by `insert_table`
const TABLE_FONT_SIZE: f32 = 11.0;

/// Where an inserted block ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Right after the block the anchor resolved to
    AfterAnchor(usize),
    /// At the end because no anchor was given
    AtEnd(usize),
    /// At the end because the anchor did not resolve
    AnchorMissing(usize),
}

impl Placement {
    pub fn position(&self) -> usize {
        match self {
            Placement::AfterAnchor(position)
            | Placement::AtEnd(position)
            | Placement::AnchorMissing(position) => *position,
        }
    }
}

/// One revision of a document: a single ordered sequence of blocks.
///
/// Headings, paragraphs and tables interleave in one list, so splicing by
/// position never drops a block of another kind.
///
/// ```rust
/// # use docops_engine::{Document, Operation};
/// let mut doc = Document::titled("Plan", Some("Intro\nDetails"));
/// let intro = doc.outline()[1].anchor.clone();
///
/// let report = doc.apply_batch(&[Operation::AddParagraph {
///     text: "Inserted".to_string(),
///     after_paragraph_id: Some(intro),
/// }]);
///
/// assert!(report.fully_applied());
/// assert_eq!(doc.paragraph_texts(), vec!["Plan", "Intro", "Inserted", "Details"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// New document with an optional level-1 title followed by one paragraph
    /// per line of `body`
    pub fn titled(title: &str, body: Option<&str>) -> Self {
        let mut doc = Self::new();
        if !title.is_empty() {
            doc.push(Block::heading(HeadingLevel::default(), title));
        }
        if let Some(body) = body {
            for line in body.split('\n') {
                doc.push(Block::paragraph(line));
            }
        }
        doc
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Block> {
        self.blocks.get(position)
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Insert at `position`, clamped to the end of the document.
    /// Returns the position the block landed at.
    pub fn insert(&mut self, position: usize, block: Block) -> usize {
        let position = position.min(self.blocks.len());
        self.blocks.insert(position, block);
        position
    }

    pub fn remove(&mut self, position: usize) -> Option<Block> {
        (position < self.blocks.len()).then(|| self.blocks.remove(position))
    }

    /// Swap the block at `position`, returning the old one
    pub fn replace(&mut self, position: usize, block: Block) -> Option<Block> {
        self.blocks
            .get_mut(position)
            .map(|slot| std::mem::replace(slot, block))
    }

    /// Freshly computed outline of the current state
    pub fn outline(&self) -> Vec<OutlineEntry> {
        anchors::build_outline(self)
    }

    /// Position of the block the anchor resolves to in the current state
    pub fn position_of_anchor(&self, anchor: &str) -> Option<usize> {
        anchors::resolve_anchor(self, anchor)
    }

    /// Insert right after the block `anchor` resolves to, or at the end when
    /// there is no anchor or it does not resolve.
    pub fn insert_after_anchor(&mut self, anchor: Option<&str>, block: Block) -> Placement {
        match anchor {
            None => {
                self.push(block);
                Placement::AtEnd(self.blocks.len() - 1)
            }
            Some(anchor) => match self.position_of_anchor(anchor) {
                Some(position) => Placement::AfterAnchor(self.insert(position + 1, block)),
                None => {
                    self.push(block);
                    Placement::AnchorMissing(self.blocks.len() - 1)
                }
            },
        }
    }

    /// Tables in document order
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(Block::as_table)
    }

    pub fn table_count(&self) -> usize {
        self.tables().count()
    }

    /// Block position of the `index`-th table
    fn table_position(&self, index: usize) -> Option<usize> {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, block)| block.is_table())
            .nth(index)
            .map(|(position, _)| position)
    }

    pub fn table_mut(&mut self, index: usize) -> Option<&mut Table> {
        self.blocks
            .iter_mut()
            .filter_map(Block::as_table_mut)
            .nth(index)
    }

    /// Texts of headings and paragraphs in order; tables are skipped
    pub fn paragraph_texts(&self) -> Vec<String> {
        self.blocks.iter().filter_map(Block::text).collect()
    }

    /// Font and emphasis of the first run of the first body paragraph that
    /// has runs. Underline, strike and colour are not carried over.
    pub fn reference_format(&self) -> Option<Formatting> {
        self.blocks.iter().find_map(|block| match block {
            Block::Paragraph { body } => body.first_format().map(|format| Formatting {
                font_family: format.font_family.clone(),
                font_size: format.font_size,
                bold: format.bold,
                italic: format.italic,
                ..Default::default()
            }),
            _ => None,
        })
    }

    /// Most common explicit font family across heading and paragraph runs.
    /// Table cells are not counted. Ties go to the family seen first.
    pub fn default_font(&self) -> Option<String> {
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        let bodies = self.blocks.iter().filter_map(Block::body);
        for (seen, run) in bodies.flat_map(|body| body.runs.iter()).enumerate() {
            if let Some(family) = run.format.font_family.as_deref() {
                counts.entry(family).or_insert((0, seen)).0 += 1;
            }
        }
        counts
            .into_iter()
            .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
                count_a.cmp(count_b).then(first_b.cmp(first_a))
            })
            .map(|(family, _)| family.to_string())
    }

    /// Apply one operation against the current state.
    ///
    /// Never fails: operations whose anchor, index or text cannot be
    /// resolved are skipped and reported as such.
    pub fn apply(&mut self, op: &Operation) -> Outcome {
        let outcome = match op {
            Operation::AddHeading {
                text,
                level,
                after_paragraph_id,
            } => {
                let block = Block::heading(*level, text.as_str());
                let placement = self.insert_after_anchor(after_paragraph_id.as_deref(), block);
                placed(placement, after_paragraph_id)
            }
            Operation::AddParagraph {
                text,
                after_paragraph_id,
            } => {
                let format = self.reference_format().unwrap_or_default();
                let block = Block::paragraph_with(RichText::styled(text.as_str(), format));
                let placement = self.insert_after_anchor(after_paragraph_id.as_deref(), block);
                placed(placement, after_paragraph_id)
            }
            Operation::ReplaceText { find, replace } => self.replace_text(find, replace),
            Operation::InsertTable {
                rows,
                cols,
                data,
                add_header_row,
                after_paragraph_id,
            } => {
                let table = self.build_table(*rows, *cols, data, *add_header_row);
                let placement =
                    self.insert_after_anchor(after_paragraph_id.as_deref(), Block::Table(table));
                placed(placement, after_paragraph_id)
            }
            Operation::EditTable { table_index, edit } => self.edit_table(*table_index, edit),
            Operation::RemoveTable { table_index } => match self.table_position(*table_index) {
                Some(position) => {
                    self.blocks.remove(position);
                    Outcome::Applied { affected: 1 }
                }
                None => Outcome::not_found(format!("no table at index {table_index}")),
            },
            Operation::RemoveParagraph { target } => self.remove_paragraphs(target),
        };

        match &outcome {
            Outcome::Applied { affected } => {
                log::debug!("{} applied to {affected} item(s)", op.kind());
            }
            Outcome::AppendedAtEnd { missing_anchor } => {
                log::warn!(
                    "{}: anchor {missing_anchor} not found, appended at end",
                    op.kind()
                );
            }
            Outcome::SkippedNotFound { reason } | Outcome::SkippedMalformed { reason } => {
                log::warn!("{} skipped: {reason}", op.kind());
            }
        }
        outcome
    }

    /// Apply operations strictly in order, each against the state left by the
    /// previous one.
    pub fn apply_batch(&mut self, ops: &[Operation]) -> ApplyReport {
        let mut report = ApplyReport::default();
        for op in ops {
            let outcome = self.apply(op);
            report.record(op.kind(), outcome);
        }
        report
    }

    /// Apply a batch that may contain operations rejected at the boundary.
    /// Rejected entries are reported as malformed and the rest still apply.
    pub fn apply_validated(
        &mut self,
        ops: Vec<Result<Operation, MalformedOperation>>,
    ) -> ApplyReport {
        let mut report = ApplyReport::default();
        for op in ops {
            match op {
                Ok(op) => {
                    let outcome = self.apply(&op);
                    report.record(op.kind(), outcome);
                }
                Err(malformed) => {
                    log::warn!("{malformed}");
                    report.record(
                        malformed.kind,
                        Outcome::SkippedMalformed {
                            reason: malformed.reason,
                        },
                    );
                }
            }
        }
        report
    }

    fn replace_text(&mut self, find: &str, replace: &str) -> Outcome {
        let mut affected = 0;
        for body in self.blocks.iter_mut().filter_map(Block::body_mut) {
            let text = body.text();
            if text.contains(find) {
                body.set_text(text.replace(find, replace));
                affected += 1;
            }
        }
        if affected == 0 {
            Outcome::not_found(format!("no paragraph contains {find:?}"))
        } else {
            Outcome::Applied { affected }
        }
    }

    fn build_table(
        &self,
        rows: usize,
        cols: usize,
        data: &[Vec<String>],
        add_header_row: bool,
    ) -> Table {
        let mut table = Table::new(rows, cols);
        let cell_format = self
            .default_font()
            .map(|family| Formatting {
                font_family: Some(family),
                font_size: Some(TABLE_FONT_SIZE),
                ..Formatting::default()
            })
            .unwrap_or_default();

        for (row, values) in data.iter().take(rows).enumerate() {
            for (col, value) in values.iter().take(cols).enumerate() {
                if let Some(cell) = table.cell_mut(row, col) {
                    cell.body = RichText::styled(value.as_str(), cell_format.clone());
                }
            }
        }
        if add_header_row && let Some(header) = table.rows.first_mut() {
            for cell in header {
                cell.body.set_bold();
            }
        }
        table
    }

    fn edit_table(&mut self, table_index: usize, edit: &TableEdit) -> Outcome {
        let Some(table) = self.table_mut(table_index) else {
            return Outcome::not_found(format!("no table at index {table_index}"));
        };
        match edit {
            TableEdit::Cell { row, col, text } => match table.cell_mut(*row, *col) {
                Some(cell) => {
                    cell.body.set_text(text.as_str());
                    Outcome::Applied { affected: 1 }
                }
                None => Outcome::not_found(format!(
                    "cell ({row}, {col}) outside table {table_index}"
                )),
            },
            TableEdit::Fill { data } => {
                let mut affected = 0;
                for (row, values) in data.iter().enumerate() {
                    for (col, value) in values.iter().enumerate() {
                        if let Some(cell) = table.cell_mut(row, col) {
                            cell.body.set_text(value.as_str());
                            affected += 1;
                        }
                    }
                }
                if affected == 0 {
                    Outcome::not_found(format!("data does not overlap table {table_index}"))
                } else {
                    Outcome::Applied { affected }
                }
            }
        }
    }

    fn remove_paragraphs(&mut self, target: &ParagraphTarget) -> Outcome {
        let positions: Vec<usize> = match target {
            ParagraphTarget::Anchor(anchor) => anchors::positions_with_anchor(self, anchor),
            ParagraphTarget::Containing(needle) => self
                .blocks
                .iter()
                .enumerate()
                .filter(|(_, block)| block.text().is_some_and(|text| text.contains(needle)))
                .map(|(position, _)| position)
                .collect(),
        };
        if positions.is_empty() {
            return Outcome::not_found(match target {
                ParagraphTarget::Anchor(anchor) => format!("anchor {anchor} not found"),
                ParagraphTarget::Containing(needle) => {
                    format!("no paragraph contains {needle:?}")
                }
            });
        }
        for position in positions.iter().rev() {
            self.blocks.remove(*position);
        }
        Outcome::Applied {
            affected: positions.len(),
        }
    }
}

fn placed(placement: Placement, anchor: &Option<String>) -> Outcome {
    match (placement, anchor) {
        (Placement::AnchorMissing(_), Some(anchor)) => Outcome::AppendedAtEnd {
            missing_anchor: anchor.clone(),
        },
        _ => Outcome::Applied { affected: 1 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::anchors::anchor_for;
    use crate::models::{Cell, Run};
    use crate::tests::{interleaved_document, texts_of};
    use pretty_assertions::assert_eq;

    fn op_paragraph(text: &str, after: Option<String>) -> Operation {
        Operation::AddParagraph {
            text: text.to_string(),
            after_paragraph_id: after,
        }
    }

    #[test]
    fn test_titled_document() {
        let doc = Document::titled("Report", Some("line one\nline two"));

        assert_eq!(doc.len(), 3);
        assert_eq!(doc.blocks()[0].level(), Some(1));
        assert_eq!(doc.paragraph_texts(), vec!["Report", "line one", "line two"]);
    }

    #[test]
    fn test_titled_document_without_title_or_body() {
        assert!(Document::titled("", None).is_empty());
    }

    #[test]
    fn test_insert_clamps_position() {
        let mut doc = Document::from_blocks(vec![Block::paragraph("a")]);
        assert_eq!(doc.insert(10, Block::paragraph("b")), 1);
        assert_eq!(doc.paragraph_texts(), vec!["a", "b"]);
    }

    #[test]
    fn test_remove_and_replace_out_of_range() {
        let mut doc = Document::from_blocks(vec![Block::paragraph("a")]);
        assert!(doc.remove(3).is_none());
        assert!(doc.replace(3, Block::paragraph("x")).is_none());
        assert_eq!(doc.replace(0, Block::paragraph("x")), Some(Block::paragraph("a")));
        assert_eq!(doc.paragraph_texts(), vec!["x"]);
    }

    #[test]
    fn test_insert_after_anchor_placements() {
        let mut doc = Document::from_blocks(vec![Block::paragraph("a"), Block::paragraph("b")]);
        let a = anchor_for("a", 0, 0);

        assert_eq!(
            doc.insert_after_anchor(Some(&a), Block::paragraph("x")),
            Placement::AfterAnchor(1)
        );
        assert_eq!(
            doc.insert_after_anchor(None, Block::paragraph("y")),
            Placement::AtEnd(3)
        );
        assert_eq!(
            doc.insert_after_anchor(Some("p-missing"), Block::paragraph("z")),
            Placement::AnchorMissing(4)
        );
        assert_eq!(doc.paragraph_texts(), vec!["a", "x", "b", "y", "z"]);
    }

    #[test]
    fn test_add_paragraph_after_anchor_lands_immediately_after() {
        let mut doc = interleaved_document();
        let target = doc.outline()[1].clone();

        let outcome = doc.apply(&op_paragraph("X", Some(target.anchor.clone())));

        assert_eq!(outcome, Outcome::Applied { affected: 1 });
        let outline = doc.outline();
        let index = outline.iter().position(|e| e.text == target.text).unwrap();
        assert_eq!(outline[index + 1].text, "X");
    }

    #[test]
    fn test_add_paragraph_with_unknown_anchor_appends_explicitly() {
        let mut doc = interleaved_document();

        let outcome = doc.apply(&op_paragraph("tail", Some("p-0123456789".to_string())));

        assert_eq!(
            outcome,
            Outcome::AppendedAtEnd {
                missing_anchor: "p-0123456789".to_string()
            }
        );
        assert_eq!(doc.blocks().last(), Some(&Block::paragraph("tail")));
    }

    #[test]
    fn test_add_paragraph_copies_reference_formatting() {
        let serif = Formatting {
            font_family: Some("Garamond".to_string()),
            font_size: Some(12.0),
            italic: true,
            ..Formatting::default()
        };
        let mut doc = Document::from_blocks(vec![
            Block::heading(HeadingLevel::default(), "Title"),
            Block::paragraph_with(RichText::styled("Body", serif.clone())),
        ]);

        doc.apply(&op_paragraph("New", None));

        assert_eq!(
            doc.blocks()[2],
            Block::paragraph_with(RichText::styled("New", serif))
        );
    }

    #[test]
    fn test_add_paragraph_drops_decorations_of_reference() {
        let marked = Formatting {
            font_family: Some("Garamond".to_string()),
            bold: true,
            underline: true,
            strike: true,
            color: Some(crate::models::Rgb(220, 0, 0)),
            ..Formatting::default()
        };
        let mut doc = Document::from_blocks(vec![Block::paragraph_with(RichText::styled(
            "Body", marked,
        ))]);

        doc.apply(&op_paragraph("New", None));

        let format = doc.blocks()[1].body().unwrap().first_format().unwrap();
        assert_eq!(
            format,
            &Formatting {
                font_family: Some("Garamond".to_string()),
                bold: true,
                ..Formatting::default()
            }
        );
    }

    #[test]
    fn test_note_added_to_redline_is_not_marked_deleted() {
        let base = Document::from_blocks(vec![Block::paragraph("gone")]);
        let mut redline = crate::redline::compare(&base, &Document::new());

        redline.apply(&op_paragraph("reviewer note", None));

        let note = redline.blocks().last().unwrap().body().unwrap();
        assert_eq!(note.text(), "reviewer note");
        let format = note.first_format().unwrap();
        assert!(!format.strike);
        assert!(!format.underline);
        assert_eq!(format.color, None);
    }

    #[test]
    fn test_add_heading_after_heading_anchor() {
        let mut doc = interleaved_document();
        let title = doc.outline()[0].anchor.clone();

        doc.apply(&Operation::AddHeading {
            text: "Summary".to_string(),
            level: HeadingLevel::clamped(2),
            after_paragraph_id: Some(title),
        });

        assert_eq!(doc.blocks()[1], Block::heading(HeadingLevel::clamped(2), "Summary"));
    }

    #[test]
    fn test_anchor_insertion_keeps_tables() {
        let mut doc = interleaved_document();
        let before = doc.tables().cloned().collect::<Vec<_>>();
        let last = doc.outline().last().unwrap().anchor.clone();

        doc.apply(&op_paragraph("end", Some(last)));

        assert_eq!(doc.tables().cloned().collect::<Vec<_>>(), before);
    }

    #[test]
    fn test_replace_text_collapses_runs_to_first_format() {
        let mut doc = Document::from_blocks(vec![Block::paragraph_with(RichText {
            runs: vec![
                Run::styled("Hello ", Formatting::bold()),
                Run::plain("old world"),
            ],
        })]);

        let outcome = doc.apply(&Operation::ReplaceText {
            find: "old".to_string(),
            replace: "new".to_string(),
        });

        assert_eq!(outcome, Outcome::Applied { affected: 1 });
        assert_eq!(
            doc.blocks()[0].body().unwrap().runs,
            vec![Run::styled("Hello new world", Formatting::bold())]
        );
    }

    #[test]
    fn test_replace_text_replaces_every_occurrence_in_every_paragraph() {
        let mut doc = Document::from_blocks(vec![
            Block::heading(HeadingLevel::default(), "foo title"),
            Block::paragraph("foo and foo"),
            Block::paragraph("bar"),
        ]);

        let outcome = doc.apply(&Operation::ReplaceText {
            find: "foo".to_string(),
            replace: "baz".to_string(),
        });

        assert_eq!(outcome, Outcome::Applied { affected: 2 });
        assert_eq!(doc.paragraph_texts(), vec!["baz title", "baz and baz", "bar"]);
    }

    #[test]
    fn test_replace_text_leaves_table_cells_alone() {
        let mut doc = interleaved_document();
        let before = doc.tables().cloned().collect::<Vec<_>>();

        doc.apply(&Operation::ReplaceText {
            find: "Q1".to_string(),
            replace: "Q2".to_string(),
        });

        assert_eq!(doc.tables().cloned().collect::<Vec<_>>(), before);
    }

    #[test]
    fn test_replace_text_without_match_is_not_found() {
        let mut doc = interleaved_document();
        let before = doc.clone();

        let outcome = doc.apply(&Operation::ReplaceText {
            find: "zzz".to_string(),
            replace: "y".to_string(),
        });

        assert!(matches!(outcome, Outcome::SkippedNotFound { .. }));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_insert_table_from_data_with_header() {
        let mut doc = Document::new();

        doc.apply(&Operation::InsertTable {
            rows: 3,
            cols: 2,
            data: vec![
                vec!["Name".to_string(), "Value".to_string()],
                vec!["a".to_string(), "1".to_string(), "overflow".to_string()],
            ],
            add_header_row: true,
            after_paragraph_id: None,
        });

        let table = doc.tables().next().unwrap();
        assert_eq!(
            table.texts(),
            vec![
                vec!["Name", "Value"],
                vec!["a", "1"],
                vec!["", ""],
            ]
        );
        assert!(table.rows[0].iter().all(|cell| cell.body.is_bold()));
        assert!(!table.rows[1][0].body.is_bold());
    }

    #[test]
    fn test_insert_table_uses_document_font() {
        let courier = Formatting {
            font_family: Some("Courier".to_string()),
            ..Formatting::default()
        };
        let mut doc = Document::from_blocks(vec![
            Block::paragraph_with(RichText::styled("a", courier.clone())),
            Block::paragraph_with(RichText::styled("b", courier)),
        ]);

        doc.apply(&Operation::InsertTable {
            rows: 1,
            cols: 1,
            data: vec![vec!["x".to_string()]],
            add_header_row: false,
            after_paragraph_id: None,
        });

        let cell_format = doc.tables().next().unwrap().rows[0][0]
            .body
            .first_format()
            .cloned()
            .unwrap();
        assert_eq!(cell_format.font_family.as_deref(), Some("Courier"));
        assert_eq!(cell_format.font_size, Some(TABLE_FONT_SIZE));
    }

    #[test]
    fn test_insert_table_after_anchor() {
        let mut doc = Document::from_blocks(vec![Block::paragraph("a"), Block::paragraph("b")]);

        doc.apply(&Operation::InsertTable {
            rows: 1,
            cols: 1,
            data: Vec::new(),
            add_header_row: false,
            after_paragraph_id: Some(anchor_for("a", 0, 0)),
        });

        assert!(doc.blocks()[1].is_table());
    }

    #[test]
    fn test_edit_table_cell_preserves_format() {
        let mut doc = interleaved_document();

        let outcome = doc.apply(&Operation::EditTable {
            table_index: 0,
            edit: TableEdit::Cell {
                row: 0,
                col: 1,
                text: "Total".to_string(),
            },
        });

        assert_eq!(outcome, Outcome::Applied { affected: 1 });
        let cell = &doc.tables().next().unwrap().rows[0][1];
        assert_eq!(cell.text(), "Total");
        assert!(cell.body.is_bold());
    }

    #[test]
    fn test_edit_table_out_of_bounds_is_noop() {
        let mut doc = interleaved_document();
        let before = doc.clone();

        let cell = doc.apply(&Operation::EditTable {
            table_index: 0,
            edit: TableEdit::Cell {
                row: 9,
                col: 0,
                text: "x".to_string(),
            },
        });
        let table = doc.apply(&Operation::EditTable {
            table_index: 4,
            edit: TableEdit::Fill {
                data: vec![vec!["x".to_string()]],
            },
        });

        assert!(matches!(cell, Outcome::SkippedNotFound { .. }));
        assert!(matches!(table, Outcome::SkippedNotFound { .. }));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_edit_table_fill_clips_to_table() {
        let mut doc = Document::from_blocks(vec![Block::Table(Table::new(2, 2))]);

        let outcome = doc.apply(&Operation::EditTable {
            table_index: 0,
            edit: TableEdit::Fill {
                data: vec![
                    vec!["a".to_string(), "b".to_string(), "c".to_string()],
                    vec!["d".to_string()],
                    vec!["e".to_string()],
                ],
            },
        });

        assert_eq!(outcome, Outcome::Applied { affected: 3 });
        assert_eq!(
            doc.tables().next().unwrap().texts(),
            vec![vec!["a", "b"], vec!["d", ""]]
        );
    }

    #[test]
    fn test_remove_table_by_index_among_tables() {
        let mut doc = Document::from_blocks(vec![
            Block::Table(Table::new(1, 1)),
            Block::paragraph("between"),
            Block::Table(Table {
                rows: vec![vec![Cell {
                    body: RichText::plain("second"),
                }]],
            }),
        ]);

        let outcome = doc.apply(&Operation::RemoveTable { table_index: 1 });

        assert_eq!(outcome, Outcome::Applied { affected: 1 });
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.table_count(), 1);
        assert_eq!(doc.tables().next().unwrap().texts(), vec![vec![""]]);
    }

    #[test]
    fn test_remove_paragraph_by_anchor_renumbers() {
        let mut doc = Document::from_blocks(vec![Block::paragraph("A"), Block::paragraph("B")]);
        let a = doc.outline()[0].anchor.clone();

        doc.apply(&Operation::RemoveParagraph {
            target: ParagraphTarget::Anchor(a),
        });

        let outline = doc.outline();
        assert_eq!(texts_of(&outline), vec!["B"]);
        assert_eq!(outline[0].anchor, anchor_for("B", 0, 0));
    }

    #[test]
    fn test_remove_paragraph_by_text_removes_all_matches() {
        let mut doc = Document::from_blocks(vec![
            Block::paragraph("draft one"),
            Block::paragraph("final"),
            Block::heading(HeadingLevel::default(), "draft heading"),
        ]);

        let outcome = doc.apply(&Operation::RemoveParagraph {
            target: ParagraphTarget::Containing("draft".to_string()),
        });

        assert_eq!(outcome, Outcome::Applied { affected: 2 });
        assert_eq!(doc.paragraph_texts(), vec!["final"]);
    }

    #[test]
    fn test_batch_resolves_against_current_state() {
        let mut doc = Document::from_blocks(vec![Block::paragraph("A"), Block::paragraph("B")]);
        let b = doc.outline()[1].anchor.clone();

        let report = doc.apply_batch(&[
            Operation::RemoveParagraph {
                target: ParagraphTarget::Containing("A".to_string()),
            },
            // B moved to position 0, so its old anchor no longer resolves
            op_paragraph("C", Some(b)),
        ]);

        assert!(report.operations[0].outcome.is_applied());
        assert!(matches!(
            report.operations[1].outcome,
            Outcome::AppendedAtEnd { .. }
        ));
        assert_eq!(doc.paragraph_texts(), vec!["B", "C"]);
    }

    #[test]
    fn test_apply_validated_reports_malformed_and_continues() {
        let mut doc = Document::new();
        let report = doc.apply_validated(vec![
            Err(MalformedOperation {
                kind: "add_heading".to_string(),
                reason: "missing `text`".to_string(),
            }),
            Ok(op_paragraph("kept", None)),
        ]);

        assert!(matches!(
            report.operations[0].outcome,
            Outcome::SkippedMalformed { .. }
        ));
        assert_eq!(report.operations[0].kind, "add_heading");
        assert!(report.operations[1].outcome.is_applied());
        assert_eq!(doc.paragraph_texts(), vec!["kept"]);
    }

    #[test]
    fn test_default_font_prefers_most_common() {
        let font = |family: &str| Formatting {
            font_family: Some(family.to_string()),
            ..Formatting::default()
        };
        let doc = Document::from_blocks(vec![
            Block::paragraph_with(RichText::styled("a", font("Arial"))),
            Block::paragraph_with(RichText::styled("b", font("Calibri"))),
            Block::paragraph_with(RichText::styled("c", font("Calibri"))),
        ]);

        assert_eq!(doc.default_font().as_deref(), Some("Calibri"));
        assert_eq!(Document::new().default_font(), None);
    }

    #[test]
    fn test_default_font_ignores_table_cells() {
        let font = |family: &str| Formatting {
            font_family: Some(family.to_string()),
            ..Formatting::default()
        };
        let mut table = Table::new(1, 3);
        for cell in table.rows[0].iter_mut() {
            cell.body = RichText::styled("x", font("Courier"));
        }
        let doc = Document::from_blocks(vec![
            Block::paragraph_with(RichText::styled("a", font("Arial"))),
            Block::Table(table),
        ]);

        assert_eq!(doc.default_font().as_deref(), Some("Arial"));
    }

    #[test]
    fn test_document_json_roundtrip() {
        let doc = interleaved_document();
        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}
