use axum::{
    routing::{get, post},
    Router,
};
use std::{sync::Arc, time::Duration};

use crate::{
    handlers::{health_check, search_blogs, submit_blog, SearchHandler, SubmissionHandler},
    middleware::create_middleware_stack,
    queue::MessageQueue,
    search_index::SearchIndex,
};

/// Handlers shared by every request; built once at startup and never mutated
#[derive(Clone)]
pub struct AppState {
    pub submission: SubmissionHandler,
    pub search: SearchHandler,
}

impl AppState {
    pub fn new(queue: Arc<dyn MessageQueue>, index: Arc<dyn SearchIndex>) -> Self {
        AppState {
            submission: SubmissionHandler::new(queue),
            search: SearchHandler::new(index),
        }
    }
}

/// Create the Axum router with all endpoints and middleware
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Blog endpoints
        .route("/blogs", post(submit_blog))
        .route("/blogs/search", get(search_blogs))
        .with_state(state)
        // Apply middleware stack
        .layer(create_middleware_stack(request_timeout))
}
