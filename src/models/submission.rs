use serde::{Deserialize, Serialize};

/// Message returned when a submission lacks one of its fields
pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields: title, text, or userId";

/// Blog submission as posted by a client
///
/// Every field is optional at the parsing layer so a missing field surfaces as a
/// validation failure instead of a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogSubmission {
    pub title: Option<String>,
    pub text: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Queue wire form of a validated submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedMessage {
    pub blog_title: String,
    pub blog_text: String,
    pub user_id: String,
}

impl BlogSubmission {
    /// Check that title, text and userId are all present and non-empty,
    /// producing the message that goes onto the queue.
    pub fn validate(self) -> Result<QueuedMessage, String> {
        match (non_empty(self.title), non_empty(self.text), non_empty(self.user_id)) {
            (Some(blog_title), Some(blog_text), Some(user_id)) => Ok(QueuedMessage {
                blog_title,
                blog_text,
                user_id,
            }),
            _ => Err(MISSING_FIELDS_MESSAGE.to_string()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
