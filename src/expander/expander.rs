use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;
use futures::stream::{self, LocalBoxStream};
use tracing::{debug, info, warn};

use crate::items::{BatchReader, Container, EnumerationError, TraversableItem, UnrecognizedItem};
use crate::selection::ExpandedFile;

use super::{ExpansionEvent, ExpansionIssue, ExpansionOutcome, ExpansionStatus};

/// Expands `items` into a lazy stream of files and issues, prefixing every
/// relative path with `path_prefix`.
pub fn expand(
    items: Vec<TraversableItem>,
    path_prefix: impl Into<String>,
) -> LocalBoxStream<'static, ExpansionEvent> {
    Expander::new(items).with_prefix(path_prefix).into_stream()
}

/// One drop gesture waiting to be expanded.
pub struct Expander {
    roots: Vec<TraversableItem>,
    prefix: String,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl Expander {
    pub fn new(roots: Vec<TraversableItem>) -> Self {
        Self {
            roots,
            prefix: String::new(),
            cancel_flag: None,
        }
    }

    /// Prefix applied to root-level names. A trailing `/` is added when missing.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.is_empty() && !prefix.ends_with('/') {
            prefix.push('/');
        }
        self.prefix = prefix;
        self
    }

    /// Checked before every step; once set, the stream reports
    /// [`ExpansionIssue::GestureAborted`] and ends.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    /// The stream can be consumed once; each item is visited exactly once.
    /// Polling after the end keeps yielding `None`.
    pub fn into_stream(self) -> LocalBoxStream<'static, ExpansionEvent> {
        let walk = Walk {
            roots: self.roots.into(),
            root_prefix: self.prefix,
            stack: Vec::new(),
            ready: VecDeque::new(),
            cancel_flag: self.cancel_flag,
            finished: false,
        };

        stream::unfold(walk, |mut walk| async move {
            let event = walk.advance().await?;
            Some((event, walk))
        })
        .fuse()
        .boxed_local()
    }

    /// Drains the whole gesture.
    pub async fn run(self) -> ExpansionOutcome {
        let outcome = self
            .into_stream()
            .fold(ExpansionOutcome::default(), |mut outcome, event| async move {
                outcome.record(event);
                outcome
            })
            .await;

        match outcome.status() {
            ExpansionStatus::Complete => info!(
                "Expanded gesture into {} files ({} items skipped)",
                outcome.files.len(),
                outcome.issues.len()
            ),
            ExpansionStatus::Partial => warn!(
                "Expanded gesture only partially: {} files, {} issues",
                outcome.files.len(),
                outcome.issues.len()
            ),
        }
        outcome
    }
}

/// An open container being drained.
struct Frame {
    reader: Box<dyn BatchReader>,
    /// Prefix for this container's children, ends with `/`.
    prefix: String,
    pending: VecDeque<TraversableItem>,
    held: Vec<ExpandedFile>,
}

impl Frame {
    fn path(&self) -> &str {
        self.prefix.trim_end_matches('/')
    }
}

enum Step {
    Visit(TraversableItem, String),
    Poll,
    Done,
}

struct Walk {
    roots: VecDeque<TraversableItem>,
    root_prefix: String,
    stack: Vec<Frame>,
    ready: VecDeque<ExpansionEvent>,
    cancel_flag: Option<Arc<AtomicBool>>,
    finished: bool,
}

impl Walk {
    async fn advance(&mut self) -> Option<ExpansionEvent> {
        loop {
            if let Some(event) = self.ready.pop_front() {
                return Some(event);
            }
            if self.finished {
                return None;
            }
            if self.is_cancelled() {
                self.abort();
                continue;
            }

            match self.next_step() {
                Step::Visit(item, prefix) => self.visit(item, &prefix),
                Step::Poll => self.poll_top().await,
                Step::Done => {
                    debug!("All dropped items visited");
                    self.finished = true;
                }
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn abort(&mut self) {
        let dropped_frames = self.stack.len();
        self.stack.clear();
        self.roots.clear();
        self.finished = true;
        warn!(
            "Expansion aborted with {} containers still open",
            dropped_frames
        );
        self.ready
            .push_back(ExpansionEvent::Issue(ExpansionIssue::GestureAborted));
    }

    fn next_step(&mut self) -> Step {
        match self.stack.last_mut() {
            Some(frame) => match frame.pending.pop_front() {
                Some(item) => Step::Visit(item, frame.prefix.clone()),
                None => Step::Poll,
            },
            None => match self.roots.pop_front() {
                Some(item) => Step::Visit(item, self.root_prefix.clone()),
                None => Step::Done,
            },
        }
    }

    fn visit(&mut self, item: TraversableItem, prefix: &str) {
        match item {
            TraversableItem::File(file) => {
                let expanded = ExpandedFile::from_plain(file, prefix);
                debug!("Found file '{}'", expanded.relative_path);
                match self.stack.last_mut() {
                    Some(frame) => frame.held.push(expanded),
                    None => self.ready.push_back(ExpansionEvent::File(expanded)),
                }
            }
            TraversableItem::Container(container) => self.open(container, prefix),
            TraversableItem::Unrecognized(item) => self.skip(item, prefix),
        }
    }

    fn open(&mut self, container: Container, prefix: &str) {
        let child_prefix = format!("{prefix}{}/", container.name());
        debug!("Opening container '{}'", child_prefix);
        self.stack.push(Frame {
            reader: container.into_reader(),
            prefix: child_prefix,
            pending: VecDeque::new(),
            held: Vec::new(),
        });
    }

    fn skip(&mut self, item: UnrecognizedItem, prefix: &str) {
        let path = format!("{prefix}{}", item.name.as_deref().unwrap_or("<unnamed>"));
        warn!("Skipping unrecognized item '{}': {}", path, item.reason);
        self.ready
            .push_back(ExpansionEvent::Issue(ExpansionIssue::ClassificationSkipped {
                path,
                reason: item.reason,
            }));
    }

    async fn poll_top(&mut self) {
        let Some(frame) = self.stack.last_mut() else {
            return;
        };

        let polled = frame.reader.next_batch().await;
        match polled {
            Ok(batch) if !batch.is_empty() => {
                debug!(
                    "Read batch of {} items from '{}'",
                    batch.len(),
                    frame.path()
                );
                frame.pending.extend(batch);
            }
            Ok(_) => self.close_top(),
            Err(source) => self.fail_top(source),
        }
    }

    /// Releases the drained container's files to its parent, or emits them
    /// when it was a root.
    fn close_top(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        debug!(
            "Container '{}' exhausted with {} files",
            frame.path(),
            frame.held.len()
        );

        match self.stack.last_mut() {
            Some(parent) => parent.held.extend(frame.held),
            None => self
                .ready
                .extend(frame.held.into_iter().map(ExpansionEvent::File)),
        }
    }

    fn fail_top(&mut self, source: EnumerationError) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let path = frame.path().to_string();
        warn!(
            "Enumeration of '{}' failed, dropping {} files found under it: {}",
            path,
            frame.held.len(),
            source
        );
        self.ready.push_back(ExpansionEvent::Issue(
            ExpansionIssue::SubtreeEnumerationFailed { path, source },
        ));
    }
}
