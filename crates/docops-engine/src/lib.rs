pub mod editing;
pub mod io;
pub mod models;
pub mod planner;
pub mod preview;
pub mod redline;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use editing::{
    ApplyReport, Document, MalformedOperation, Operation, OperationReport, OutlineEntry, Outcome,
    ParagraphTarget, Placement, RawOperation, TableEdit, apply_operations, build_outline,
    parse_operations, validate_operations,
};
pub use io::*;
pub use models::*;
pub use redline::{compare, compare_with_title};
