use snafu::Snafu;

use crate::items::EnumerationError;
use crate::selection::ExpandedFile;

#[derive(Debug)]
pub enum ExpansionEvent {
    File(ExpandedFile),
    Issue(ExpansionIssue),
}

/// Non-fatal problems met while expanding a gesture.
#[derive(Debug, Snafu)]
pub enum ExpansionIssue {
    #[snafu(display("Skipped unrecognized item '{}': {}", path, reason))]
    ClassificationSkipped { path: String, reason: String },
    #[snafu(display("Failed to enumerate '{}'", path))]
    SubtreeEnumerationFailed {
        path: String,
        source: EnumerationError,
    },
    #[snafu(display("Expansion was aborted before it finished"))]
    GestureAborted,
}

impl ExpansionIssue {
    /// Whether the issue means some dropped files may be missing.
    pub fn is_partial(&self) -> bool {
        !matches!(self, ExpansionIssue::ClassificationSkipped { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionStatus {
    Complete,
    Partial,
}

/// Everything a drained expansion produced, in emission order.
#[derive(Debug, Default)]
pub struct ExpansionOutcome {
    pub files: Vec<ExpandedFile>,
    pub issues: Vec<ExpansionIssue>,
}

impl ExpansionOutcome {
    pub fn record(&mut self, event: ExpansionEvent) {
        match event {
            ExpansionEvent::File(file) => self.files.push(file),
            ExpansionEvent::Issue(issue) => self.issues.push(issue),
        }
    }

    pub fn status(&self) -> ExpansionStatus {
        if self.issues.iter().any(ExpansionIssue::is_partial) {
            ExpansionStatus::Partial
        } else {
            ExpansionStatus::Complete
        }
    }
}
