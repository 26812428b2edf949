use futures::future::LocalBoxFuture;
use futures::{FutureExt, StreamExt};
use futures_channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use super::{BatchReader, BatchResult, Container, EnumerationError, TraversableItem};

/// Reader fed by a callback-style enumeration source through a channel.
///
/// The source sends batches as they arrive; the reader reports exhaustion once
/// every sender is dropped.
pub struct ChannelBatchReader {
    receiver: UnboundedReceiver<BatchResult>,
}

impl ChannelBatchReader {
    pub fn new(receiver: UnboundedReceiver<BatchResult>) -> Self {
        Self { receiver }
    }
}

impl BatchReader for ChannelBatchReader {
    fn next_batch(&mut self) -> LocalBoxFuture<'_, BatchResult> {
        async move {
            match self.receiver.next().await {
                Some(result) => result,
                None => Ok(Vec::new()),
            }
        }
        .boxed_local()
    }
}

/// Producer half of a channel-fed container.
#[derive(Debug, Clone)]
pub struct BatchSender {
    container: String,
    sender: UnboundedSender<BatchResult>,
}

impl BatchSender {
    /// Queues a batch of children. Empty batches are dropped, since the reader
    /// would mistake them for exhaustion.
    pub fn send_batch(&self, batch: Vec<TraversableItem>) {
        if batch.is_empty() {
            debug!("Ignoring empty batch for container '{}'", self.container);
            return;
        }
        if let Err(send_err) = self.sender.unbounded_send(Ok(batch)) {
            debug!(
                "Failed to send batch for container '{}': {}",
                self.container, send_err
            );
        }
    }

    /// Reports a failed enumeration; the expander gives up on the container
    /// when it reads this.
    pub fn fail(&self, error: EnumerationError) {
        if let Err(send_err) = self.sender.unbounded_send(Err(error)) {
            debug!(
                "Failed to send failure for container '{}': {}",
                self.container, send_err
            );
        }
    }
}

/// Creates a container whose children are supplied through the returned
/// [`BatchSender`].
pub fn channel_container(name: impl Into<String>) -> (Container, BatchSender) {
    let name = name.into();
    let (sender, receiver) = mpsc::unbounded::<BatchResult>();
    let container = Container::new(name.clone(), move || ChannelBatchReader::new(receiver));
    (
        container,
        BatchSender {
            container: name,
            sender,
        },
    )
}
