use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use snafu::Snafu;

use super::TraversableItem;

pub type BatchResult = Result<Vec<TraversableItem>, EnumerationError>;

/// Cursor over the children of a container.
///
/// Every poll yields the next batch of children. An empty batch means the
/// container is exhausted; a single poll is not guaranteed to return all
/// children, so callers keep polling until they see one.
pub trait BatchReader {
    fn next_batch(&mut self) -> LocalBoxFuture<'_, BatchResult>;
}

/// Serves in-memory children in pages of a fixed size.
#[derive(Debug)]
pub struct PagedBatchReader {
    remaining: VecDeque<TraversableItem>,
    page_size: NonZeroUsize,
}

impl PagedBatchReader {
    pub fn new(items: Vec<TraversableItem>, page_size: NonZeroUsize) -> Self {
        Self {
            remaining: items.into(),
            page_size,
        }
    }
}

impl BatchReader for PagedBatchReader {
    fn next_batch(&mut self) -> LocalBoxFuture<'_, BatchResult> {
        let take = self.page_size.get().min(self.remaining.len());
        let batch = self.remaining.drain(..take).collect::<Vec<_>>();
        futures::future::ready(Ok(batch)).boxed_local()
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EnumerationError {
    #[snafu(display("Failed to open directory {}", path.display()))]
    OpenDirectoryError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to read an entry of directory {}", path.display()))]
    ReadEntryError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Enumeration source failed: {}", message))]
    SourceError { message: String },
}
