//! Structured diagnostics collected while processing a page.
//!
//! Recoverable problems (a row that looks like a row but can't be parsed, a
//! block without a label, an OCR quadrant that failed) are recorded here and
//! returned with the result. Callers decide whether to surface them.

use serde::{Deserialize, Serialize};

use crate::types::Quadrant;

/// Which stitching rule joined two blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeRule {
    /// Same label on consecutive printed pages
    PageContinuity,
    /// Row-only block without a column header continuing the previous one
    HeaderlessContinuation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    RowParseFailure {
        line: String,
        reason: String,
    },
    SplitAmbiguity {
        set_id: String,
        raw_coords: String,
    },
    UnlabeledBlock {
        first_line: Option<String>,
        line_count: usize,
    },
    CollaboratorFailure {
        quadrant: Quadrant,
        message: String,
    },
    BlocksMerged {
        rule: MergeRule,
        label: Option<String>,
        merged_lines: usize,
    },
}

impl Diagnostic {
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::RowParseFailure { .. } => "row_parse_failure",
            Diagnostic::SplitAmbiguity { .. } => "split_ambiguity",
            Diagnostic::UnlabeledBlock { .. } => "unlabeled_block",
            Diagnostic::CollaboratorFailure { .. } => "collaborator_failure",
            Diagnostic::BlocksMerged { .. } => "blocks_merged",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn count(&self, kind: &str) -> usize {
        self.entries.iter().filter(|d| d.kind() == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
