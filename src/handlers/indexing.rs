// Indexing handler
// Writes each queued message of a batch into the search index

use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    error::ApiError,
    handlers::HandlerResponse,
    models::BlogDocument,
    queue::QueueRecord,
    search_index::SearchIndex,
};

#[derive(Clone)]
pub struct IndexingHandler {
    index: Arc<dyn SearchIndex>,
}

impl IndexingHandler {
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        IndexingHandler { index }
    }

    /// Index a batch in delivery order, stopping at the first failure.
    ///
    /// Records after a failing one are left for the queue to redeliver.
    pub async fn handle_batch(&self, records: &[QueueRecord]) -> HandlerResponse {
        for (position, record) in records.iter().enumerate() {
            if let Err(err) = self.index_record(record).await {
                error!(
                    "Error indexing document from message {} ({} of {}): {}",
                    record.message_id,
                    position + 1,
                    records.len(),
                    err
                );
                return HandlerResponse::error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
            }
        }

        info!("Indexed {} documents", records.len());
        HandlerResponse::ok(json!({ "message": "Documents indexed successfully" }))
    }

    async fn index_record(&self, record: &QueueRecord) -> Result<(), ApiError> {
        let document: BlogDocument = serde_json::from_str(&record.body)
            .map_err(|e| ApiError::validation(format!("Invalid message body: {}", e)))?;

        self.index.index_document(&document).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchIndexError;
    use crate::search_index::MockSearchIndex;
    use mockall::Sequence;

    fn record(id: &str, body: &str) -> QueueRecord {
        QueueRecord {
            message_id: id.to_string(),
            receipt_handle: format!("receipt-{}", id),
            body: body.to_string(),
        }
    }

    fn titled(id: &str, title: &str) -> QueueRecord {
        record(
            id,
            &json!({ "blog_title": title, "blog_text": "text", "user_id": "u1" }).to_string(),
        )
    }

    #[tokio::test]
    async fn test_batch_is_written_in_order() {
        let mut index = MockSearchIndex::new();
        let mut seq = Sequence::new();
        for title in ["first", "second", "third"] {
            index
                .expect_index_document()
                .withf(move |doc| doc.blog_title.as_deref() == Some(title))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| Ok(()));
        }

        let handler = IndexingHandler::new(Arc::new(index));
        let batch = [titled("1", "first"), titled("2", "second"), titled("3", "third")];
        let response = handler.handle_batch(&batch).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, json!({ "message": "Documents indexed successfully" }));
    }

    #[tokio::test]
    async fn test_failure_stops_remaining_writes() {
        let mut index = MockSearchIndex::new();
        let mut seq = Sequence::new();
        index
            .expect_index_document()
            .withf(|doc| doc.blog_title.as_deref() == Some("first"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        index
            .expect_index_document()
            .withf(|doc| doc.blog_title.as_deref() == Some("second"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Err(SearchIndexError::Upstream {
                    status: 429,
                    body: "Too Many Requests".to_string(),
                })
            });

        let handler = IndexingHandler::new(Arc::new(index));
        let batch = [
            titled("1", "first"),
            titled("2", "second"),
            titled("3", "third"),
            titled("4", "fourth"),
        ];
        let response = handler.handle_batch(&batch).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(response.body, json!({ "error": "Too Many Requests" }));
    }

    #[tokio::test]
    async fn test_missing_fields_are_indexed_as_null() {
        let mut index = MockSearchIndex::new();
        index
            .expect_index_document()
            .withf(|doc| {
                *doc == BlogDocument {
                    blog_title: Some("only title".to_string()),
                    blog_text: None,
                    user_id: None,
                }
            })
            .times(1)
            .returning(|_| Ok(()));

        let handler = IndexingHandler::new(Arc::new(index));
        let response = handler
            .handle_batch(&[record("1", r#"{"blog_title":"only title"}"#)])
            .await;

        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_unparseable_body_aborts_batch() {
        let mut index = MockSearchIndex::new();
        index.expect_index_document().times(1).returning(|_| Ok(()));

        let handler = IndexingHandler::new(Arc::new(index));
        let batch = [titled("1", "first"), record("2", "not json"), titled("3", "third")];
        let response = handler.handle_batch(&batch).await;

        assert_eq!(response.status_code, 500);
        assert!(response.body["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid message body"));
    }

    #[tokio::test]
    async fn test_empty_batch_succeeds_without_writes() {
        let mut index = MockSearchIndex::new();
        index.expect_index_document().times(0);

        let response = IndexingHandler::new(Arc::new(index)).handle_batch(&[]).await;

        assert!(response.is_success());
    }
}
