use std::collections::HashMap;
use std::fmt::Write as _;

use colored::Colorize;
use supports_color::Stream;

use crate::expander::{ExpansionIssue, ExpansionStatus};
use crate::selection::{ContentDigest, IdentityKey, MergeSummary, SelectionSet};

/// Turns colors off when stdout cannot show them.
pub fn configure_colors() {
    if supports_color::on(Stream::Stdout).is_none() {
        colored::control::set_override(false);
    }
}

/// What one gesture did to the selection, ready to print.
pub struct Report<'a> {
    pub selection: &'a SelectionSet,
    pub digests: Option<&'a HashMap<IdentityKey, ContentDigest>>,
    pub summary: MergeSummary,
    pub removed: usize,
    pub issues: &'a [ExpansionIssue],
    pub status: ExpansionStatus,
}

impl Report<'_> {
    pub fn render(&self) -> String {
        let mut out = String::new();

        for file in self.selection {
            let _ = write!(out, "{}  {} B", file.relative_path.bold(), file.size);
            let digest = self
                .digests
                .and_then(|digests| digests.get(&file.identity()));
            if let Some(digest) = digest {
                let _ = write!(out, "  {}", digest.to_string().dimmed());
            }
            out.push('\n');
        }

        let _ = writeln!(
            out,
            "{} files selected ({} bytes): {} added, {} duplicates, {} removed",
            self.selection.len(),
            self.selection.total_size(),
            self.summary.added,
            self.summary.duplicates,
            self.removed
        );

        for issue in self.issues {
            let line = match std::error::Error::source(issue) {
                Some(cause) => format!("{issue}: {cause}"),
                None => issue.to_string(),
            };
            let line = if issue.is_partial() {
                line.red()
            } else {
                line.yellow()
            };
            let _ = writeln!(out, "{line}");
        }

        if self.status == ExpansionStatus::Partial {
            let _ = writeln!(
                out,
                "{}",
                "Some dropped items were not expanded; drop them again to retry".red()
            );
        }
        out
    }
}
