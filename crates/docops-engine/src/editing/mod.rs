/*!
 * # Editing Core Module
 *
 * Block-level editing of a [`Document`] through declarative operations.
 *
 * ## Architecture Overview
 *
 * ### 1. Single Ordered Block Sequence
 * - A document is one `Vec<Block>`; headings, paragraphs and tables interleave
 * - Insertion and removal are position splices on that sequence, so a block of
 *   one kind is never dropped while editing another
 *
 * ### 2. Content-Derived Anchors
 * - Every heading and paragraph gets an anchor hashed from its normalized
 *   text, outline level and position
 * - Anchors are recomputed from the current state on every lookup; they hold
 *   within one snapshot and shift when earlier blocks move
 *
 * ### 3. Operation-Based Editing
 * - Edits arrive as a batch of [`Operation`]s, usually from an external planner
 * - Wire records are validated one at a time at the boundary; a bad record
 *   becomes a `SkippedMalformed` outcome instead of failing the batch
 * - Operations apply strictly in order, each against the state the previous
 *   one left behind
 *
 * ### 4. Observable Partial Application
 * - Every operation yields an [`Outcome`]: applied, appended at the end because
 *   its anchor was missing, skipped as not found, or skipped as malformed
 *
 * ## Module Structure
 *
 * - **`document`**: `Document` with splice primitives and the apply loop
 * - **`commands`**: `Operation` sum type, its wire record and validation
 * - **`anchors`**: anchor derivation and outline building
 * - **`outcome`**: per-operation outcomes and the batch report
 *
 * ## Usage Pattern
 *
 * ```rust
 * use docops_engine::editing::*;
 *
 * let mut doc = Document::titled("Notes", Some("first\nsecond"));
 * let ops = parse_operations(r#"[
 *     {"type": "replace_text", "find": "first", "replace": "1st"},
 *     {"type": "add_heading"}
 * ]"#).unwrap();
 *
 * let report = doc.apply_validated(ops);
 *
 * assert_eq!(report.applied_count(), 1);
 * assert_eq!(doc.paragraph_texts(), vec!["Notes", "1st", "second"]);
 * ```
 */

pub mod anchors;
pub mod commands;
pub mod document;
pub mod outcome;

// Public API re-exports
pub use anchors::{OutlineEntry, anchor_for, build_outline, normalize_text};
pub use commands::{
    MalformedOperation, Operation, ParagraphTarget, RawOperation, TableEdit, parse_operations,
    validate_operations,
};
pub use document::{Document, Placement};
pub use outcome::{ApplyReport, OperationReport, Outcome};

/// Apply a batch to an owned document and hand back the new revision with
/// its per-operation report.
pub fn apply_operations(mut doc: Document, ops: &[Operation]) -> (Document, ApplyReport) {
    let report = doc.apply_batch(ops);
    (doc, report)
}
