use std::hash::BuildHasherDefault;

use hashlink::LinkedHashMap;
use metrohash::MetroHash64;
use tracing::debug;

use super::{ExpandedFile, IdentityKey};

type IdentityHasher = BuildHasherDefault<MetroHash64>;

/// Counts produced by a single [`SelectionSet::merge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub added: usize,
    pub duplicates: usize,
}

/// Ordered, deduplicated collection of files queued for upload.
///
/// Entries keep the position they were first merged at. A later file with the
/// same [`IdentityKey`] never replaces the stored entry.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    entries: LinkedHashMap<IdentityKey, ExpandedFile, IdentityHasher>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends every incoming file whose identity is not selected yet, in
    /// incoming order. Merging the same files again changes nothing.
    pub fn merge(&mut self, incoming: impl IntoIterator<Item = ExpandedFile>) -> MergeSummary {
        let mut summary = MergeSummary::default();

        for file in incoming {
            let key = file.identity();
            if self.entries.contains_key(&key) {
                debug!("Dropping duplicate selection entry {}", key);
                summary.duplicates += 1;
            } else {
                self.entries.insert(key, file);
                summary.added += 1;
            }
        }

        debug!(
            "Merged {} new entries, {} duplicates, selection now holds {}",
            summary.added,
            summary.duplicates,
            self.entries.len()
        );
        summary
    }

    /// Removes the entry with exactly this identity. Absent keys are ignored.
    pub fn remove(&mut self, key: &IdentityKey) -> Option<ExpandedFile> {
        let removed = self.entries.remove(key);
        if removed.is_none() {
            debug!("No selection entry for {}, nothing removed", key);
        }
        removed
    }

    /// Removes every entry at `relative_path`. Several identities can share a
    /// path when same-named trees were dropped.
    pub fn remove_by_relative_path(&mut self, relative_path: &str) -> Vec<ExpandedFile> {
        let keys = self
            .entries
            .iter()
            .filter(|(_, file)| file.relative_path == relative_path)
            .map(|(key, _)| key.clone())
            .collect::<Vec<_>>();
        keys.iter()
            .filter_map(|key| self.entries.remove(key))
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn find_by_relative_path(&self, relative_path: &str) -> Option<&ExpandedFile> {
        self.entries
            .values()
            .find(|file| file.relative_path == relative_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExpandedFile> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_size(&self) -> u64 {
        self.entries.values().map(|file| file.size).sum()
    }
}

impl PartialEq for SelectionSet {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self.entries.iter().eq(other.entries.iter())
    }
}

impl Eq for SelectionSet {}

impl<'a> IntoIterator for &'a SelectionSet {
    type Item = &'a ExpandedFile;
    type IntoIter = hashlink::linked_hash_map::Values<'a, IdentityKey, ExpandedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}
