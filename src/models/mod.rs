// Models module

pub mod document;
pub mod submission;

// Re-export commonly used types
pub use document::{BlogDocument, SearchQuery, SearchResponse};
pub use submission::{BlogSubmission, QueuedMessage};
