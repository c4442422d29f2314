// Search handler
// Runs a free-text query against the search index

use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    handlers::HandlerResponse,
    models::SearchQuery,
    search_index::SearchIndex,
};

pub const MISSING_QUERY_MESSAGE: &str = "Query parameter \"query\" is missing";

#[derive(Clone)]
pub struct SearchHandler {
    index: Arc<dyn SearchIndex>,
}

impl SearchHandler {
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        SearchHandler { index }
    }

    /// Search for `query`, answering 400 without touching the index when it is
    /// absent or empty.
    pub async fn handle(&self, query: Option<&str>) -> HandlerResponse {
        match self.search(query).await {
            Ok(documents) => HandlerResponse::ok(Value::Array(documents)),
            Err(err) => err.into(),
        }
    }

    async fn search(&self, query: Option<&str>) -> ApiResult<Vec<Value>> {
        let query = SearchQuery::parse(query).ok_or_else(|| ApiError::validation(MISSING_QUERY_MESSAGE))?;

        let documents = self.index.search(&query).await?;

        info!("Search for '{}' returned {} documents", query.term(), documents.len());
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchIndexError;
    use crate::search_index::MockSearchIndex;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_or_empty_query_is_rejected_locally() {
        for query in [None, Some("")] {
            let mut index = MockSearchIndex::new();
            index.expect_search().times(0);

            let response = SearchHandler::new(Arc::new(index)).handle(query).await;

            assert_eq!(response.status_code, 400);
            assert_eq!(response.body, json!({ "message": MISSING_QUERY_MESSAGE }));
        }
    }

    #[tokio::test]
    async fn test_matches_are_returned_in_index_order() {
        let d1 = json!({ "blog_title": "Rust async", "blog_text": "tokio", "user_id": "u1" });
        let d2 = json!({ "blog_title": "Other", "blog_text": "about Rust", "user_id": "u2" });
        let hits = vec![d1.clone(), d2.clone()];

        let mut index = MockSearchIndex::new();
        index
            .expect_search()
            .withf(|query| query.term() == "Rust")
            .times(1)
            .returning(move |_| Ok(hits.clone()));

        let response = SearchHandler::new(Arc::new(index)).handle(Some("Rust")).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, json!([d1, d2]));
    }

    #[tokio::test]
    async fn test_no_matches_is_empty_array() {
        let mut index = MockSearchIndex::new();
        index.expect_search().times(1).returning(|_| Ok(Vec::new()));

        let response = SearchHandler::new(Arc::new(index)).handle(Some("nothing")).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, json!([]));
    }

    #[tokio::test]
    async fn test_upstream_error_keeps_status_and_text() {
        let mut index = MockSearchIndex::new();
        index.expect_search().times(1).returning(|_| {
            Err(SearchIndexError::Upstream {
                status: 404,
                body: r#"{"error":{"type":"index_not_found_exception"},"status":404}"#.to_string(),
            })
        });

        let response = SearchHandler::new(Arc::new(index)).handle(Some("rust")).await;

        assert_eq!(response.status_code, 404);
        assert_eq!(
            response.body,
            json!({ "error": r#"{"error":{"type":"index_not_found_exception"},"status":404}"# })
        );
    }

    #[tokio::test]
    async fn test_transport_error_is_server_error() {
        let mut index = MockSearchIndex::new();
        index
            .expect_search()
            .times(1)
            .returning(|_| Err(SearchIndexError::Transport("timed out".to_string())));

        let response = SearchHandler::new(Arc::new(index)).handle(Some("rust")).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(response.body, json!({ "error": "Search index request failed: timed out" }));
    }
}
