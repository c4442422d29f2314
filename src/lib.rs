// Library root for the blog publish/search pipeline

pub mod app;
pub mod config;
pub mod consumer;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod queue;
pub mod search_index;

// Re-export commonly used types
pub use app::{create_router, AppState};
pub use error::{ApiError, QueueError, SearchIndexError};
pub use handlers::{HandlerResponse, IndexingHandler, SearchHandler, SubmissionHandler};
pub use models::{BlogDocument, BlogSubmission, QueuedMessage, SearchQuery};
