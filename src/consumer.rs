// Queue consumer
// Feeds received batches to the indexing handler and deletes a batch only when
// every message in it was indexed; failed batches are redelivered by the queue

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::{
    config::ConsumerConfig,
    error::QueueError,
    handlers::IndexingHandler,
    queue::{BatchSource, QueueRecord},
};

/// Pause after a failed receive before polling again
const RECEIVE_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Pause after an empty batch when the receive does not long-poll
const EMPTY_POLL_PAUSE: Duration = Duration::from_secs(1);

/// Outcome of one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollOutcome {
    Empty,
    Indexed(usize),
    Failed(usize),
}

pub struct QueueConsumer {
    source: Arc<dyn BatchSource>,
    handler: IndexingHandler,
    config: ConsumerConfig,
}

impl QueueConsumer {
    pub fn new(source: Arc<dyn BatchSource>, handler: IndexingHandler, config: ConsumerConfig) -> Self {
        QueueConsumer { source, handler, config }
    }

    /// Poll until `shutdown` flips to `true`. Only a pending receive is
    /// interrupted; a batch already handed to the handler runs to completion.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Queue consumer started (batch size {}, wait {}s)",
            self.config.batch_size,
            self.config.wait_time.as_secs()
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let received = tokio::select! {
                _ = shutdown.changed() => break,
                received = self.source.receive(self.config.batch_size, self.config.wait_time) => received,
            };

            let pause = match received {
                Ok(records) => match self.process(records).await {
                    Ok(PollOutcome::Empty) if self.config.wait_time.is_zero() => Some(EMPTY_POLL_PAUSE),
                    Ok(PollOutcome::Indexed(count)) => {
                        debug!("Indexed and deleted {} messages", count);
                        None
                    }
                    Ok(PollOutcome::Failed(count)) => {
                        debug!("Left {} messages for redelivery", count);
                        None
                    }
                    Ok(PollOutcome::Empty) => None,
                    Err(e) => {
                        error!("Failed to acknowledge indexed batch: {}", e);
                        None
                    }
                },
                Err(e) => {
                    error!("Failed to receive messages: {}", e);
                    Some(RECEIVE_ERROR_BACKOFF)
                }
            };

            if let Some(pause) = pause {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = tokio::time::sleep(pause) => {}
                }
            }
        }

        info!("Queue consumer stopped");
    }

    /// Receive and process a single batch
    #[cfg(test)]
    async fn poll_once(&self) -> Result<PollOutcome, QueueError> {
        let records = self
            .source
            .receive(self.config.batch_size, self.config.wait_time)
            .await?;
        self.process(records).await
    }

    async fn process(&self, records: Vec<QueueRecord>) -> Result<PollOutcome, QueueError> {
        if records.is_empty() {
            return Ok(PollOutcome::Empty);
        }

        let response = self.handler.handle_batch(&records).await;
        if !response.is_success() {
            warn!(
                "Indexing batch of {} messages failed; leaving them for redelivery: {}",
                records.len(),
                response.body
            );
            return Ok(PollOutcome::Failed(records.len()));
        }

        self.source.acknowledge(&records).await?;
        Ok(PollOutcome::Indexed(records.len()))
    }
}
