// Handlers module
// The three pipeline handlers plus the HTTP glue that exposes them

pub mod indexing;
pub mod search;
pub mod submission;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::app::AppState;

pub use indexing::IndexingHandler;
pub use search::SearchHandler;
pub use submission::SubmissionHandler;

/// Structured result of a handler invocation: a status code and a JSON body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: Value,
}

impl HandlerResponse {
    pub fn new(status: StatusCode, body: Value) -> Self {
        HandlerResponse {
            status_code: status.as_u16(),
            body,
        }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// `{"error": message}` with the given status
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, json!({ "error": message.into() }))
    }

    pub fn is_success(&self) -> bool {
        self.status_code == StatusCode::OK.as_u16()
    }
}

impl IntoResponse for HandlerResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body)).into_response()
    }
}

/// Value of the `query` parameter; the last one wins when it is repeated
pub fn search_term(params: &[(String, String)]) -> Option<&str> {
    params
        .iter()
        .rev()
        .find(|(name, _)| name == "query")
        .map(|(_, value)| value.as_str())
}

/// Health check handler
/// Returns "OK" with 200 status for monitoring purposes
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Submit a blog post for indexing
/// POST /blogs
pub async fn submit_blog(State(state): State<AppState>, body: Bytes) -> HandlerResponse {
    state.submission.handle(&body).await
}

/// Search indexed blog posts
/// GET /blogs/search?query=<text>
pub async fn search_blogs(
    State(state): State<AppState>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> HandlerResponse {
    // An unreadable query string counts as a missing query
    let params = params.map(|Query(params)| params).unwrap_or_default();
    state.search.handle(search_term(&params)).await
}
