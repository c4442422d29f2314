// Submission handler
// Validates a blog submission and publishes it to the queue

use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    error::{ApiError, ApiResult},
    handlers::HandlerResponse,
    models::BlogSubmission,
    queue::MessageQueue,
};

#[derive(Clone)]
pub struct SubmissionHandler {
    queue: Arc<dyn MessageQueue>,
}

impl SubmissionHandler {
    pub fn new(queue: Arc<dyn MessageQueue>) -> Self {
        SubmissionHandler { queue }
    }

    /// Handle a raw request body.
    ///
    /// Every failure, including a malformed body or a missing field, is reported
    /// as a 500 with `{"error": ...}`; the queue is never retried here.
    pub async fn handle(&self, body: &[u8]) -> HandlerResponse {
        match self.submit(body).await {
            Ok(message_id) => HandlerResponse::ok(json!({
                "message": "Blog submission received!",
                "messageId": message_id,
            })),
            Err(err) => {
                match &err {
                    ApiError::Validation(message) => warn!("Rejected blog submission: {}", message),
                    other => error!("Failed to enqueue blog submission: {}", other),
                }
                HandlerResponse::error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        }
    }

    async fn submit(&self, body: &[u8]) -> ApiResult<String> {
        // An absent body is treated as an empty object
        let submission: BlogSubmission = if body.is_empty() {
            BlogSubmission::default()
        } else {
            serde_json::from_slice(body).map_err(|e| ApiError::validation(e.to_string()))?
        };

        let message = submission.validate().map_err(ApiError::validation)?;
        let payload = serde_json::to_string(&message).map_err(anyhow::Error::from)?;

        let message_id = self.queue.enqueue(payload).await?;

        info!("Queued blog submission from user_id: {} as message {}", message.user_id, message_id);
        Ok(message_id)
    }
}
