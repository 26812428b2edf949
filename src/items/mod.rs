//! Items produced by a drop gesture.
//!
//! A dropped item is either a plain file or a container whose children are
//! read through a [`BatchReader`] cursor, one bounded batch per poll. Adapters
//! that cannot classify an item hand it over as [`UnrecognizedItem`] so the
//! expander can skip it without aborting the gesture.

mod batch_reader;
mod channel;
mod content;
mod traversable;

pub use batch_reader::{BatchReader, BatchResult, EnumerationError, PagedBatchReader};
pub(crate) use batch_reader::{OpenDirectorySnafu, ReadEntrySnafu};
pub use channel::{BatchSender, ChannelBatchReader, channel_container};
pub use content::{ContentError, ContentHandle};
pub use traversable::{Container, PlainFile, TraversableItem, UnrecognizedItem};
