use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::submission::QueuedMessage;

/// Document written to the search index for one queued message.
///
/// Fields stay optional: a message missing a field is indexed with `null` for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogDocument {
    pub blog_title: Option<String>,
    pub blog_text: Option<String>,
    pub user_id: Option<String>,
}

impl From<QueuedMessage> for BlogDocument {
    fn from(message: QueuedMessage) -> Self {
        BlogDocument {
            blog_title: Some(message.blog_title),
            blog_text: Some(message.blog_text),
            user_id: Some(message.user_id),
        }
    }
}

/// Free-text query matched against title and body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    term: String,
}

impl SearchQuery {
    /// Returns `None` for an absent or empty term
    pub fn parse(term: Option<&str>) -> Option<Self> {
        term.filter(|t| !t.is_empty()).map(|t| SearchQuery { term: t.to_string() })
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Request body for `_search`: a bool/should match on both fields
    pub fn to_request_body(&self) -> Value {
        json!({
            "query": {
                "bool": {
                    "should": [
                        { "match": { "blog_title": self.term } },
                        { "match": { "blog_text": self.term } }
                    ]
                }
            }
        })
    }
}

/// Subset of the `_search` response we read
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: SearchHits,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchHits {
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_source", default)]
    pub source: Value,
}

impl SearchResponse {
    /// Stored payloads in ranking order, index metadata dropped
    pub fn into_documents(self) -> Vec<Value> {
        self.hits.hits.into_iter().map(|hit| hit.source).collect()
    }
}
