use crate::items::{ContentHandle, PlainFile};

use super::IdentityKey;

/// A plain file annotated with its path relative to the gesture root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedFile {
    pub name: String,
    pub size: u64,
    pub last_modified: u64,
    pub content: ContentHandle,
    /// Ancestor container names and the file name, joined with `/`.
    pub relative_path: String,
}

impl ExpandedFile {
    /// `prefix` is either empty or ends with `/`.
    pub fn from_plain(file: PlainFile, prefix: &str) -> Self {
        let relative_path = format!("{prefix}{}", file.name);
        Self {
            name: file.name,
            size: file.size,
            last_modified: file.last_modified,
            content: file.content,
            relative_path,
        }
    }

    pub fn identity(&self) -> IdentityKey {
        IdentityKey::new(self.name.clone(), self.size, self.last_modified)
    }
}
