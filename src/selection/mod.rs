//! The upload selection: expanded files keyed by their identity triple.

mod digest;
mod expanded_file;
mod identity;
mod selection_set;

pub use digest::ContentDigest;
pub use expanded_file::ExpandedFile;
pub use identity::IdentityKey;
pub use selection_set::{MergeSummary, SelectionSet};
