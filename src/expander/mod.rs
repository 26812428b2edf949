//! Flattens dropped items into expanded files.
//!
//! Containers are drained depth-first with an explicit stack of open readers.
//! Files found under an open container are held back until that container
//! reports exhaustion, so a subtree whose enumeration fails contributes
//! nothing while its siblings are kept.

mod expander;
mod outcome;

pub use expander::{Expander, expand};
pub use outcome::{ExpansionEvent, ExpansionIssue, ExpansionOutcome, ExpansionStatus};
