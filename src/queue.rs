use async_trait::async_trait;
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::Client as SqsClient;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::QueueError;

/// One message received from the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueRecord {
    pub message_id: String,
    /// Handle used to delete the message once processed
    pub receipt_handle: String,
    pub body: String,
}

/// Producer side of the queue
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Publish one message and return the queue-assigned message id
    async fn enqueue(&self, body: String) -> Result<String, QueueError>;
}

/// Consumer side of the queue
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BatchSource: Send + Sync {
    /// Long-poll for up to `max_messages`, waiting at most `wait`
    async fn receive(&self, max_messages: i32, wait: Duration) -> Result<Vec<QueueRecord>, QueueError>;

    /// Remove processed messages so they are not redelivered
    async fn acknowledge(&self, records: &[QueueRecord]) -> Result<(), QueueError>;
}

/// SQS-backed queue bound to a single queue URL
#[derive(Clone)]
pub struct SqsQueue {
    client: SqsClient,
    queue_url: String,
}

impl SqsQueue {
    pub fn new(client: SqsClient, queue_url: impl Into<String>) -> Self {
        let queue_url = queue_url.into();
        info!("Using SQS queue: {}", queue_url);
        SqsQueue { client, queue_url }
    }
}

#[async_trait]
impl MessageQueue for SqsQueue {
    async fn enqueue(&self, body: String) -> Result<String, QueueError> {
        let output = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| QueueError::Send(DisplayErrorContext(&e).to_string()))?;

        output
            .message_id()
            .map(str::to_string)
            .ok_or(QueueError::MissingMessageId)
    }
}

#[async_trait]
impl BatchSource for SqsQueue {
    async fn receive(&self, max_messages: i32, wait: Duration) -> Result<Vec<QueueRecord>, QueueError> {
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max_messages)
            .wait_time_seconds(wait.as_secs() as i32)
            .send()
            .await
            .map_err(|e| QueueError::Receive(DisplayErrorContext(&e).to_string()))?;

        let records = output
            .messages()
            .iter()
            .filter_map(|message| {
                // Without a receipt handle the message could never be deleted
                let receipt_handle = message.receipt_handle()?.to_string();
                Some(QueueRecord {
                    message_id: message.message_id().unwrap_or_default().to_string(),
                    receipt_handle,
                    body: message.body().unwrap_or_default().to_string(),
                })
            })
            .collect::<Vec<_>>();

        debug!("Received {} messages from {}", records.len(), self.queue_url);
        Ok(records)
    }

    async fn acknowledge(&self, records: &[QueueRecord]) -> Result<(), QueueError> {
        for record in records {
            self.client
                .delete_message()
                .queue_url(&self.queue_url)
                .receipt_handle(&record.receipt_handle)
                .send()
                .await
                .map_err(|e| QueueError::Delete(DisplayErrorContext(&e).to_string()))?;
        }

        debug!("Deleted {} messages from {}", records.len(), self.queue_url);
        Ok(())
    }
}
