use serde::Serialize;

/// Result of applying one operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The operation landed where it asked to; `affected` counts blocks or
    /// cells changed
    Applied { affected: usize },
    /// The anchor did not resolve, so the new block went to the end of the
    /// document instead
    AppendedAtEnd { missing_anchor: String },
    /// Nothing matched the operation's anchor, index or text
    SkippedNotFound { reason: String },
    /// The operation lacked fields its kind requires
    SkippedMalformed { reason: String },
}

impl Outcome {
    pub(crate) fn not_found(reason: impl Into<String>) -> Self {
        Outcome::SkippedNotFound {
            reason: reason.into(),
        }
    }

    /// True when the document changed
    pub fn changed_document(&self) -> bool {
        match self {
            Outcome::Applied { affected } => *affected > 0,
            Outcome::AppendedAtEnd { .. } => true,
            Outcome::SkippedNotFound { .. } | Outcome::SkippedMalformed { .. } => false,
        }
    }

    /// True when the operation did exactly what it asked for
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied { .. })
    }
}

/// Outcome of one operation within a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationReport {
    /// Position of the operation in the submitted batch
    pub index: usize,
    pub kind: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Per-operation results of a batch, in submission order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApplyReport {
    pub operations: Vec<OperationReport>,
}

impl ApplyReport {
    pub(crate) fn record(&mut self, kind: impl Into<String>, outcome: Outcome) {
        let index = self.operations.len();
        self.operations.push(OperationReport {
            index,
            kind: kind.into(),
            outcome,
        });
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &Outcome> {
        self.operations.iter().map(|report| &report.outcome)
    }

    /// True when every operation applied as requested
    pub fn fully_applied(&self) -> bool {
        self.outcomes().all(Outcome::is_applied)
    }

    pub fn applied_count(&self) -> usize {
        self.outcomes().filter(|outcome| outcome.is_applied()).count()
    }

    /// Operations that did not apply as requested
    pub fn partial(&self) -> impl Iterator<Item = &OperationReport> {
        self.operations
            .iter()
            .filter(|report| !report.outcome.is_applied())
    }
}
