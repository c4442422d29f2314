use axum::http::StatusCode;
use serde_json::json;
use thiserror::Error;

use crate::handlers::HandlerResponse;

/// Failures talking to the message queue
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("{0}")]
    Send(String),

    #[error("{0}")]
    Receive(String),

    #[error("{0}")]
    Delete(String),

    #[error("Queue did not return a message id")]
    MissingMessageId,
}

/// Failures talking to the search index
#[derive(Error, Debug)]
pub enum SearchIndexError {
    /// Non-success HTTP status; `body` is the raw response text
    #[error("{body}")]
    Upstream { status: u16, body: String },

    #[error("Search index request failed: {0}")]
    Transport(String),

    #[error("Failed to sign search index request: {0}")]
    Signing(String),

    #[error("Failed to load credentials: {0}")]
    Credentials(String),

    #[error("Invalid search index response: {0}")]
    Decode(String),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    SearchIndex(#[from] SearchIndexError),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Status code reported to the caller
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::SearchIndex(SearchIndexError::Upstream { status, .. }) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ApiError> for HandlerResponse {
    fn from(err: ApiError) -> Self {
        let status = err.status_code();
        let message = err.to_string();
        match err {
            ApiError::Validation(_) => {
                tracing::debug!("Rejected request: {}", message);
                HandlerResponse::new(status, json!({ "message": message }))
            }
            ApiError::Internal(inner) => {
                tracing::error!("Internal server error: {:#}", inner);
                HandlerResponse::error(status, message)
            }
            other => {
                tracing::error!("Dependency call failed: {}", other);
                HandlerResponse::error(status, message)
            }
        }
    }
}

// Result type alias for convenience
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request_message() {
        let response = HandlerResponse::from(ApiError::validation("nope"));

        assert_eq!(response.status_code, 400);
        assert_eq!(response.body, json!({ "message": "nope" }));
    }

    #[test]
    fn test_upstream_status_and_text_pass_through() {
        let err = ApiError::from(SearchIndexError::Upstream {
            status: 403,
            body: r#"{"message":"forbidden"}"#.to_string(),
        });
        let response = HandlerResponse::from(err);

        assert_eq!(response.status_code, 403);
        assert_eq!(response.body, json!({ "error": r#"{"message":"forbidden"}"# }));
    }

    #[test]
    fn test_queue_failure_is_server_error_with_text() {
        let response = HandlerResponse::from(ApiError::from(QueueError::Send("throttled".to_string())));

        assert_eq!(response.status_code, 500);
        assert_eq!(response.body, json!({ "error": "throttled" }));
    }

    #[test]
    fn test_transport_failure_is_server_error() {
        let err = ApiError::from(SearchIndexError::Transport("connection refused".to_string()));

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Search index request failed: connection refused");
    }
}
