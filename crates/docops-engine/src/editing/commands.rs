use serde::{Deserialize, Serialize};

use crate::models::HeadingLevel;

/// Flat wire record for one operation, as produced by a planner.
///
/// Every field except `type` is optional on the wire; which ones are
/// required depends on the kind and is checked by
/// `Operation::try_from(RawOperation)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOperation {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_paragraph_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub find: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cols: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_row: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_col: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_header_row: Option<bool>,
}

/// An operation that could not be turned into a well-typed [`Operation`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed {kind} operation: {reason}")]
pub struct MalformedOperation {
    pub kind: String,
    pub reason: String,
}

impl MalformedOperation {
    fn new(kind: &str, reason: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            reason: reason.into(),
        }
    }
}

/// How `edit_table` changes the target table
#[derive(Debug, Clone, PartialEq)]
pub enum TableEdit {
    /// Overwrite one cell
    Cell { row: usize, col: usize, text: String },
    /// Overwrite cells row-major, clipped to the table's dimensions
    Fill { data: Vec<Vec<String>> },
}

/// Which paragraphs `remove_paragraph` deletes
#[derive(Debug, Clone, PartialEq)]
pub enum ParagraphTarget {
    Anchor(String),
    Containing(String),
}

/// One declarative edit, addressed by anchor or by literal text, never by
/// raw position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOperation", into = "RawOperation")]
pub enum Operation {
    AddHeading {
        text: String,
        level: HeadingLevel,
        after_paragraph_id: Option<String>,
    },
    AddParagraph {
        text: String,
        after_paragraph_id: Option<String>,
    },
    ReplaceText {
        find: String,
        replace: String,
    },
    InsertTable {
        rows: usize,
        cols: usize,
        data: Vec<Vec<String>>,
        add_header_row: bool,
        after_paragraph_id: Option<String>,
    },
    EditTable {
        table_index: usize,
        edit: TableEdit,
    },
    RemoveTable {
        table_index: usize,
    },
    RemoveParagraph {
        target: ParagraphTarget,
    },
}

impl Operation {
    /// Wire name of this operation's kind
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::AddHeading { .. } => "add_heading",
            Operation::AddParagraph { .. } => "add_paragraph",
            Operation::ReplaceText { .. } => "replace_text",
            Operation::InsertTable { .. } => "insert_table",
            Operation::EditTable { .. } => "edit_table",
            Operation::RemoveTable { .. } => "remove_table",
            Operation::RemoveParagraph { .. } => "remove_paragraph",
        }
    }
}

impl TryFrom<RawOperation> for Operation {
    type Error = MalformedOperation;

    fn try_from(raw: RawOperation) -> Result<Self, Self::Error> {
        let kind = raw.kind.as_str();
        let anchor = raw.after_paragraph_id.filter(|id| !id.trim().is_empty());

        match kind {
            "add_heading" => Ok(Operation::AddHeading {
                text: required(kind, "text", raw.text)?,
                level: HeadingLevel::clamped(raw.level.unwrap_or(1)),
                after_paragraph_id: anchor,
            }),
            "add_paragraph" => Ok(Operation::AddParagraph {
                text: required(kind, "text", raw.text)?,
                after_paragraph_id: anchor,
            }),
            "replace_text" => {
                let find = required(kind, "find", raw.find)?;
                if find.is_empty() {
                    return Err(MalformedOperation::new(kind, "`find` must not be empty"));
                }
                Ok(Operation::ReplaceText {
                    find,
                    replace: required(kind, "replace", raw.replace)?,
                })
            }
            "insert_table" => {
                let data = raw.data.unwrap_or_default();
                let rows = match raw.rows {
                    Some(rows) => positive(kind, "rows", rows)?,
                    None if !data.is_empty() => data.len(),
                    None => return Err(MalformedOperation::new(kind, "missing `rows` and `data`")),
                };
                let cols = match raw.cols {
                    Some(cols) => positive(kind, "cols", cols)?,
                    None => data.iter().map(Vec::len).max().unwrap_or(0),
                };
                if cols == 0 {
                    return Err(MalformedOperation::new(kind, "missing `cols` and `data`"));
                }
                Ok(Operation::InsertTable {
                    rows,
                    cols,
                    data,
                    add_header_row: raw.add_header_row.unwrap_or(false),
                    after_paragraph_id: anchor,
                })
            }
            "edit_table" => {
                let table_index = index(kind, "table_index", raw.table_index)?;
                let edit = match (raw.cell_row, raw.cell_col, raw.cell_text, raw.data) {
                    (Some(row), Some(col), Some(text), _) => TableEdit::Cell {
                        row: index(kind, "cell_row", Some(row))?,
                        col: index(kind, "cell_col", Some(col))?,
                        text,
                    },
                    (_, _, _, Some(data)) if !data.is_empty() => TableEdit::Fill { data },
                    _ => {
                        return Err(MalformedOperation::new(
                            kind,
                            "needs `cell_row`, `cell_col` and `cell_text`, or `data`",
                        ));
                    }
                };
                Ok(Operation::EditTable { table_index, edit })
            }
            "remove_table" => Ok(Operation::RemoveTable {
                table_index: index(kind, "table_index", raw.table_index)?,
            }),
            "remove_paragraph" => {
                let target = match (anchor, raw.find.filter(|find| !find.is_empty())) {
                    (Some(anchor), _) => ParagraphTarget::Anchor(anchor),
                    (None, Some(find)) => ParagraphTarget::Containing(find),
                    (None, None) => {
                        return Err(MalformedOperation::new(
                            kind,
                            "needs `after_paragraph_id` or `find`",
                        ));
                    }
                };
                Ok(Operation::RemoveParagraph { target })
            }
            other => Err(MalformedOperation::new(other, "unknown operation type")),
        }
    }
}

impl From<Operation> for RawOperation {
    fn from(op: Operation) -> Self {
        let kind = op.kind().to_string();
        match op {
            Operation::AddHeading {
                text,
                level,
                after_paragraph_id,
            } => RawOperation {
                kind,
                text: Some(text),
                level: Some(level.get() as i64),
                after_paragraph_id,
                ..RawOperation::default()
            },
            Operation::AddParagraph {
                text,
                after_paragraph_id,
            } => RawOperation {
                kind,
                text: Some(text),
                after_paragraph_id,
                ..RawOperation::default()
            },
            Operation::ReplaceText { find, replace } => RawOperation {
                kind,
                find: Some(find),
                replace: Some(replace),
                ..RawOperation::default()
            },
            Operation::InsertTable {
                rows,
                cols,
                data,
                add_header_row,
                after_paragraph_id,
            } => RawOperation {
                kind,
                rows: Some(rows as i64),
                cols: Some(cols as i64),
                data: (!data.is_empty()).then_some(data),
                add_header_row: add_header_row.then_some(true),
                after_paragraph_id,
                ..RawOperation::default()
            },
            Operation::EditTable { table_index, edit } => {
                let mut raw = RawOperation {
                    kind,
                    table_index: Some(table_index as i64),
                    ..RawOperation::default()
                };
                match edit {
                    TableEdit::Cell { row, col, text } => {
                        raw.cell_row = Some(row as i64);
                        raw.cell_col = Some(col as i64);
                        raw.cell_text = Some(text);
                    }
                    TableEdit::Fill { data } => raw.data = Some(data),
                }
                raw
            }
            Operation::RemoveTable { table_index } => RawOperation {
                kind,
                table_index: Some(table_index as i64),
                ..RawOperation::default()
            },
            Operation::RemoveParagraph { target } => match target {
                ParagraphTarget::Anchor(anchor) => RawOperation {
                    kind,
                    after_paragraph_id: Some(anchor),
                    ..RawOperation::default()
                },
                ParagraphTarget::Containing(find) => RawOperation {
                    kind,
                    find: Some(find),
                    ..RawOperation::default()
                },
            },
        }
    }
}

fn required<T>(kind: &str, field: &str, value: Option<T>) -> Result<T, MalformedOperation> {
    value.ok_or_else(|| MalformedOperation::new(kind, format!("missing `{field}`")))
}

fn index(kind: &str, field: &str, value: Option<i64>) -> Result<usize, MalformedOperation> {
    let value = required(kind, field, value)?;
    usize::try_from(value)
        .map_err(|_| MalformedOperation::new(kind, format!("`{field}` must not be negative")))
}

fn positive(kind: &str, field: &str, value: i64) -> Result<usize, MalformedOperation> {
    match usize::try_from(value) {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(MalformedOperation::new(
            kind,
            format!("`{field}` must be at least 1"),
        )),
    }
}

/// Parse a JSON array of operations, validating each element on its own.
///
/// Only a document that is not a JSON array fails as a whole; a bad element
/// becomes an `Err` in its slot so the rest of the batch still applies.
pub fn parse_operations(
    json: &str,
) -> Result<Vec<Result<Operation, MalformedOperation>>, serde_json::Error> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
    Ok(values.into_iter().map(operation_from_value).collect())
}

/// Validate a batch of wire records
pub fn validate_operations(raw: Vec<RawOperation>) -> Vec<Result<Operation, MalformedOperation>> {
    raw.into_iter().map(Operation::try_from).collect()
}

fn operation_from_value(value: serde_json::Value) -> Result<Operation, MalformedOperation> {
    let kind = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    let raw: RawOperation = serde_json::from_value(value)
        .map_err(|err| MalformedOperation::new(&kind, err.to_string()))?;
    Operation::try_from(raw)
}
