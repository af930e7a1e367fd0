//! Offline instruction planner.
//!
//! Turns a free-form instruction into wire operations without any language
//! model: `replace 'A' with 'B'` becomes a `replace_text`, anything else is
//! kept as a note paragraph appended to the document. The output goes through
//! the same validation as operations from any other producer.

use std::sync::OnceLock;

use regex::Regex;

use crate::editing::RawOperation;

pub const NOTE_PREFIX: &str = "(Note)";

/// Plan wire operations for one instruction
pub fn plan(instruction: &str) -> Vec<RawOperation> {
    static REPLACE_REGEX: OnceLock<Regex> = OnceLock::new();
    let replace_regex = REPLACE_REGEX.get_or_init(|| {
        Regex::new(r"(?i)replace\s+'(.+?)'\s+with\s+'(.+?)'").expect("Invalid replace regex")
    });

    let instruction = instruction.trim();
    let op = match replace_regex.captures(instruction) {
        Some(caps) => RawOperation {
            kind: "replace_text".to_string(),
            find: Some(caps[1].to_string()),
            replace: Some(caps[2].to_string()),
            ..RawOperation::default()
        },
        None => RawOperation {
            kind: "add_paragraph".to_string(),
            text: Some(format!("{NOTE_PREFIX} {instruction}")),
            ..RawOperation::default()
        },
    };
    log::debug!("planned {} for instruction {instruction:?}", op.kind);
    vec![op]
}
