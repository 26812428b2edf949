use std::fmt;
use std::num::NonZeroUsize;

use super::{BatchReader, ContentHandle, PagedBatchReader};

/// A single item yielded by a drop gesture.
#[derive(Debug)]
pub enum TraversableItem {
    File(PlainFile),
    Container(Container),
    /// Something the adapter could not classify; the expander skips it.
    Unrecognized(UnrecognizedItem),
}

impl TraversableItem {
    pub fn name(&self) -> Option<&str> {
        match self {
            TraversableItem::File(file) => Some(&file.name),
            TraversableItem::Container(container) => Some(&container.name),
            TraversableItem::Unrecognized(item) => item.name.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainFile {
    pub name: String,
    pub size: u64,
    /// Milliseconds since the Unix epoch.
    pub last_modified: u64,
    pub content: ContentHandle,
}

impl PlainFile {
    pub fn new(
        name: impl Into<String>,
        size: u64,
        last_modified: u64,
        content: ContentHandle,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            last_modified,
            content,
        }
    }
}

type Enumerator = Box<dyn FnOnce() -> Box<dyn BatchReader>>;

/// A directory-like item. Its reader is only created once the expander
/// reaches it.
pub struct Container {
    name: String,
    enumerator: Enumerator,
}

impl Container {
    pub fn new<F, R>(name: impl Into<String>, enumerator: F) -> Self
    where
        F: FnOnce() -> R + 'static,
        R: BatchReader + 'static,
    {
        Self {
            name: name.into(),
            enumerator: Box::new(move || Box::new(enumerator()) as Box<dyn BatchReader>),
        }
    }

    /// Container over in-memory children served `page_size` at a time.
    pub fn from_items(
        name: impl Into<String>,
        items: Vec<TraversableItem>,
        page_size: NonZeroUsize,
    ) -> Self {
        Self::new(name, move || PagedBatchReader::new(items, page_size))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_reader(self) -> Box<dyn BatchReader> {
        (self.enumerator)()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedItem {
    pub name: Option<String>,
    pub reason: String,
}

impl UnrecognizedItem {
    pub fn new(name: Option<String>, reason: impl Into<String>) -> Self {
        Self {
            name,
            reason: reason.into(),
        }
    }
}

impl From<PlainFile> for TraversableItem {
    fn from(file: PlainFile) -> Self {
        TraversableItem::File(file)
    }
}

impl From<Container> for TraversableItem {
    fn from(container: Container) -> Self {
        TraversableItem::Container(container)
    }
}

impl From<UnrecognizedItem> for TraversableItem {
    fn from(item: UnrecognizedItem) -> Self {
        TraversableItem::Unrecognized(item)
    }
}
