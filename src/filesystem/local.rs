use std::fs::{self, ReadDir};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use compio::fs::Metadata;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use snafu::ResultExt;
use tracing::{debug, warn};

use crate::ext::SystemTimeExt;
use crate::items::{
    BatchReader, BatchResult, Container, ContentHandle, EnumerationError, OpenDirectorySnafu,
    PlainFile, ReadEntrySnafu, TraversableItem, UnrecognizedItem,
};

pub const DEFAULT_BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(100).unwrap();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalDropOptions {
    /// Maximum number of entries returned by one directory poll.
    pub batch_size: NonZeroUsize,
    /// Skip entries whose name starts with a dot.
    pub skip_hidden: bool,
}

impl Default for LocalDropOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            skip_hidden: false,
        }
    }
}

/// Adapts local paths into the items of one drop gesture.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDrop {
    options: LocalDropOptions,
}

impl LocalDrop {
    pub fn new(options: LocalDropOptions) -> Self {
        Self { options }
    }

    /// One root item per path, in the given order. Paths that cannot be
    /// classified become [`UnrecognizedItem`]s.
    pub async fn gesture(&self, paths: &[PathBuf]) -> Vec<TraversableItem> {
        let mut items = Vec::with_capacity(paths.len());
        for path in paths {
            items.push(self.root_item(path).await);
        }
        items
    }

    async fn root_item(&self, path: &Path) -> TraversableItem {
        let name = display_name(path);
        match compio::fs::metadata(path).await {
            Ok(metadata) => classify(path, name, &metadata, self.options),
            Err(err) => {
                warn!("Cannot read metadata of {}: {}", path.display(), err);
                UnrecognizedItem::new(Some(name), format!("unreadable path: {err}")).into()
            }
        }
    }
}

/// Reads a directory `batch_size` entries at a time. The directory is opened
/// on the first poll.
///
/// Listing runs on the runtime's blocking pool; the open `ReadDir` moves there
/// for each batch and comes back with the listed entries.
pub struct DirBatchReader {
    dir: PathBuf,
    entries: Option<ReadDir>,
    exhausted: bool,
    options: LocalDropOptions,
}

/// Entries listed by one blocking pass, plus the cursor to resume from.
struct Listing {
    listed: Vec<(String, PathBuf)>,
    rest: Option<ReadDir>,
}

impl DirBatchReader {
    pub fn new(dir: PathBuf, options: LocalDropOptions) -> Self {
        Self {
            dir,
            entries: None,
            exhausted: false,
            options,
        }
    }

    async fn read_batch(&mut self) -> BatchResult {
        if self.exhausted {
            return Ok(Vec::new());
        }

        let dir = self.dir.clone();
        let entries = self.entries.take();
        let options = self.options;
        let listing =
            match compio::runtime::spawn_blocking(move || list_entries(&dir, entries, options))
                .await
            {
                Ok(listing) => listing,
                Err(payload) => std::panic::resume_unwind(payload),
            };
        let listing = listing.inspect_err(|_| self.exhausted = true)?;

        self.exhausted = listing.rest.is_none();
        self.entries = listing.rest;

        let mut batch = Vec::with_capacity(listing.listed.len());
        for (name, path) in listing.listed {
            batch.push(entry_item(name, path, self.options).await);
        }

        debug!(
            "Read {} entries from {}",
            batch.len(),
            self.dir.display()
        );
        Ok(batch)
    }
}

impl BatchReader for DirBatchReader {
    fn next_batch(&mut self) -> LocalBoxFuture<'_, BatchResult> {
        self.read_batch().boxed_local()
    }
}

/// Pulls up to `batch_size` visible entries. `rest` is `None` once the
/// directory is exhausted.
fn list_entries(
    dir: &Path,
    entries: Option<ReadDir>,
    options: LocalDropOptions,
) -> Result<Listing, EnumerationError> {
    let mut entries = match entries {
        Some(entries) => entries,
        None => {
            debug!("Opening directory {}", dir.display());
            fs::read_dir(dir).context(OpenDirectorySnafu {
                path: dir.to_path_buf(),
            })?
        }
    };

    let mut listed = Vec::new();
    while listed.len() < options.batch_size.get() {
        let Some(entry) = entries.next() else {
            return Ok(Listing { listed, rest: None });
        };
        let entry = entry.context(ReadEntrySnafu {
            path: dir.to_path_buf(),
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if options.skip_hidden && name.starts_with('.') {
            debug!("Skipping hidden entry {}", entry.path().display());
            continue;
        }
        listed.push((name, entry.path()));
    }
    Ok(Listing {
        listed,
        rest: Some(entries),
    })
}

async fn entry_item(name: String, path: PathBuf, options: LocalDropOptions) -> TraversableItem {
    match compio::fs::symlink_metadata(&path).await {
        Ok(metadata) if metadata.file_type().is_symlink() => {
            UnrecognizedItem::new(Some(name), "symbolic link").into()
        }
        Ok(metadata) => classify(&path, name, &metadata, options),
        Err(err) => UnrecognizedItem::new(Some(name), format!("unreadable entry: {err}")).into(),
    }
}

fn classify(
    path: &Path,
    name: String,
    metadata: &Metadata,
    options: LocalDropOptions,
) -> TraversableItem {
    if metadata.is_dir() {
        let dir = path.to_path_buf();
        return Container::new(name, move || DirBatchReader::new(dir, options)).into();
    }
    if metadata.is_file() {
        let last_modified = metadata
            .modified()
            .map(|time| time.to_epoch_millis())
            .unwrap_or(0);
        return PlainFile::new(
            name,
            metadata.len(),
            last_modified,
            ContentHandle::Path(path.to_path_buf()),
        )
        .into();
    }
    UnrecognizedItem::new(Some(name), "special file").into()
}

/// Last path component; `.` and `..` resolve to the directory's real name.
fn display_name(path: &Path) -> String {
    let name = path.file_name().map(|name| name.to_os_string()).or_else(|| {
        path.canonicalize()
            .ok()
            .and_then(|canonical| canonical.file_name().map(|name| name.to_os_string()))
    });
    match name {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::fs;
    use std::rc::Rc;

    use rstest::*;
    use tempfile::TempDir;

    use super::*;
    use crate::expander::{ExpansionIssue, ExpansionStatus, Expander};

    /// `root/app.log`, `root/logs/{a.log,b.log,.hidden.log}`,
    /// `root/logs/old/c.log`, `root/.cache/d.log`
    #[fixture]
    fn tree() -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir_all(root.join("logs/old")).unwrap();
        fs::create_dir_all(root.join(".cache")).unwrap();
        fs::write(root.join("app.log"), "INFO started").unwrap();
        fs::write(root.join("logs/a.log"), "a").unwrap();
        fs::write(root.join("logs/b.log"), "bb").unwrap();
        fs::write(root.join("logs/.hidden.log"), "h").unwrap();
        fs::write(root.join("logs/old/c.log"), "ccc").unwrap();
        fs::write(root.join(".cache/d.log"), "dddd").unwrap();
        temp_dir
    }

    fn options(batch_size: usize, skip_hidden: bool) -> LocalDropOptions {
        LocalDropOptions {
            batch_size: NonZeroUsize::new(batch_size).unwrap(),
            skip_hidden,
        }
    }

    async fn sorted_paths(local: LocalDrop, paths: &[PathBuf]) -> Vec<String> {
        let outcome = Expander::new(local.gesture(paths).await).run().await;
        assert_eq!(outcome.status(), ExpansionStatus::Complete);
        let mut paths = outcome
            .files
            .into_iter()
            .map(|file| file.relative_path)
            .collect::<Vec<_>>();
        paths.sort();
        paths
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(100)]
    #[compio::test]
    async fn expands_directories_with_relative_paths(tree: TempDir, #[case] batch_size: usize) {
        let local = LocalDrop::new(options(batch_size, true));
        let paths = sorted_paths(local, &[tree.path().join("logs")]).await;

        assert_eq!(paths, vec!["logs/a.log", "logs/b.log", "logs/old/c.log"]);
    }

    #[rstest]
    #[compio::test]
    async fn hidden_entries_are_kept_unless_skipped(tree: TempDir) {
        let local = LocalDrop::new(options(10, false));
        let paths = sorted_paths(local, &[tree.path().to_path_buf()]).await;
        let root = display_name(tree.path());

        let expected = [
            ".cache/d.log",
            "app.log",
            "logs/.hidden.log",
            "logs/a.log",
            "logs/b.log",
            "logs/old/c.log",
        ]
        .iter()
        .map(|path| format!("{root}/{path}"))
        .collect::<Vec<_>>();
        assert_eq!(paths, expected);
    }

    #[rstest]
    #[compio::test]
    async fn root_files_use_their_name(tree: TempDir) {
        let local = LocalDrop::new(options(10, true));
        let outcome = Expander::new(local.gesture(&[tree.path().join("app.log")]).await)
            .run()
            .await;

        let file = &outcome.files[0];
        assert_eq!(file.relative_path, "app.log");
        assert_eq!(file.size, 12);
        assert!(file.last_modified > 0);
        assert_eq!(file.content, ContentHandle::Path(tree.path().join("app.log")));
    }

    #[rstest]
    #[compio::test]
    async fn missing_root_is_skipped(tree: TempDir) {
        let local = LocalDrop::new(options(10, true));
        let roots = local
            .gesture(&[tree.path().join("nope.log"), tree.path().join("app.log")])
            .await;
        let outcome = Expander::new(roots)
        .run()
        .await;

        assert_eq!(outcome.files.len(), 1);
        assert!(matches!(
            outcome.issues.as_slice(),
            [ExpansionIssue::ClassificationSkipped { path, .. }] if path == "nope.log"
        ));
    }

    #[compio::test]
    async fn vanished_directory_fails_its_subtree() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let gone = temp_dir.path().join("gone");
        let reader = DirBatchReader::new(gone, LocalDropOptions::default());
        let container = Container::new("gone", move || reader);

        let outcome = Expander::new(vec![container.into()]).run().await;

        assert_eq!(outcome.status(), ExpansionStatus::Partial);
        assert!(matches!(
            outcome.issues.as_slice(),
            [ExpansionIssue::SubtreeEnumerationFailed { path, .. }] if path == "gone"
        ));
    }

    #[rstest]
    #[compio::test]
    async fn batches_never_end_early_when_entries_are_skipped(tree: TempDir) {
        fs::write(tree.path().join(".cache/.a"), "").unwrap();
        fs::write(tree.path().join(".cache/.b"), "").unwrap();
        let mut reader = DirBatchReader::new(tree.path().join(".cache"), options(1, true));

        let first = reader.next_batch().await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].name(), Some("d.log"));
        assert!(reader.next_batch().await.unwrap().is_empty());
    }

    #[rstest]
    #[compio::test]
    async fn reading_a_directory_lets_other_tasks_run(tree: TempDir) {
        let ran = Rc::new(Cell::new(false));
        let marker = compio::runtime::spawn({
            let ran = ran.clone();
            async move { ran.set(true) }
        });
        let mut reader = DirBatchReader::new(tree.path().join("logs"), options(10, true));

        let batch = reader.next_batch().await.unwrap();

        assert_eq!(batch.len(), 3);
        assert!(ran.get());
        drop(marker);
    }

    #[cfg(unix)]
    #[rstest]
    #[compio::test]
    async fn symlinks_are_not_followed(tree: TempDir) {
        std::os::unix::fs::symlink(tree.path().join("logs"), tree.path().join("logs/old/loop"))
            .unwrap();
        let local = LocalDrop::new(options(10, true));
        let outcome = Expander::new(local.gesture(&[tree.path().join("logs")]).await)
            .run()
            .await;

        assert_eq!(outcome.files.len(), 3);
        assert!(matches!(
            outcome.issues.as_slice(),
            [ExpansionIssue::ClassificationSkipped { path, reason }]
                if path == "logs/old/loop" && reason == "symbolic link"
        ));
    }

    #[test]
    fn display_name_resolves_current_dir() {
        let name = display_name(Path::new("."));
        assert_ne!(name, ".");
        assert!(!name.is_empty());
    }
}
