//! Local filesystem drop adapter.
//!
//! Turns paths handed over by the user into traversable items. Directories
//! are enumerated lazily, a bounded batch of entries per poll.

mod local;

pub use local::{DirBatchReader, LocalDrop, LocalDropOptions};
