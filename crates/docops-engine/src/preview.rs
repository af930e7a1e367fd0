//! HTML preview of a document.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::editing::Document;
use crate::models::{Block, RichText, Run, Table};

/// Render the blocks of a document as an HTML fragment, one element per line
pub fn to_html(doc: &Document) -> String {
    let mut out = String::new();
    for block in doc.blocks() {
        match block {
            Block::Heading { level, body } => {
                let n = level.get();
                out.push_str(&format!("<h{n}>{}</h{n}>\n", rich_text(body)));
            }
            Block::Paragraph { body } => {
                out.push_str(&format!("<p>{}</p>\n", rich_text(body)));
            }
            Block::Table(table) => out.push_str(&table_html(table)),
        }
    }
    out
}

fn table_html(table: &Table) -> String {
    let mut out = String::from("<table>\n");
    let mut rows = table.rows.iter();
    let has_header = table
        .rows
        .first()
        .is_some_and(|row| !row.is_empty() && row.iter().all(|cell| cell.body.is_bold()));

    if has_header && let Some(header) = rows.next() {
        out.push_str("<thead><tr>");
        for cell in header {
            out.push_str(&format!("<th>{}</th>", rich_text(&cell.body)));
        }
        out.push_str("</tr></thead>\n");
    }

    out.push_str("<tbody>\n");
    for row in rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str(&format!("<td>{}</td>", rich_text(&cell.body)));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

fn rich_text(body: &RichText) -> String {
    body.runs.iter().map(run_html).collect()
}

fn run_html(run: &Run) -> String {
    let mut html = encode_text(&run.text).into_owned();
    let format = &run.format;
    if format.underline {
        html = format!("<u>{html}</u>");
    }
    if format.strike {
        html = format!("<s>{html}</s>");
    }
    if format.italic {
        html = format!("<em>{html}</em>");
    }
    if format.bold {
        html = format!("<strong>{html}</strong>");
    }
    if let Some(color) = format.color {
        let style = format!("color:#{}", color.to_hex());
        html = format!(
            "<span style=\"{}\">{html}</span>",
            encode_double_quoted_attribute(&style)
        );
    }
    html
}
