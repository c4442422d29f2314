use async_trait::async_trait;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_credential_types::Credentials;
use aws_sigv4::http_request::{sign, SignableBody, SignableRequest, SigningSettings};
use aws_sigv4::sign::v4;
use http::{header::CONTENT_TYPE, Method, Request};
use serde_json::Value;
use std::time::{Duration, SystemTime};
use tracing::{debug, info};

use crate::config::SearchConfig;
use crate::error::SearchIndexError;
use crate::models::{BlogDocument, SearchQuery, SearchResponse};

/// Service name OpenSearch domains are signed for
pub const SIGNING_SERVICE: &str = "es";

/// Document store the indexing and search handlers talk to
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Store one new document; the index generates its id
    async fn index_document(&self, document: &BlogDocument) -> Result<(), SearchIndexError>;

    /// Run a free-text query, returning stored payloads in ranking order
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Value>, SearchIndexError>;
}

/// Signs requests with SigV4 for one region
#[derive(Clone, Debug)]
pub struct RequestSigner {
    credentials: SharedCredentialsProvider,
    region: String,
}

impl RequestSigner {
    pub fn new(credentials: SharedCredentialsProvider, region: impl Into<String>) -> Self {
        RequestSigner {
            credentials,
            region: region.into(),
        }
    }

    /// Fetch current credentials from the provider and sign `request` in place.
    /// The provider caches and refreshes short-lived credentials itself.
    pub async fn sign(&self, request: &mut Request<Vec<u8>>) -> Result<(), SearchIndexError> {
        let credentials = self
            .credentials
            .provide_credentials()
            .await
            .map_err(|e| SearchIndexError::Credentials(e.to_string()))?;

        sign_request(request, &credentials, &self.region, SystemTime::now())
    }
}

/// Add SigV4 headers (`authorization`, `x-amz-date`, and the session token when
/// present) to `request`.
pub fn sign_request(
    request: &mut Request<Vec<u8>>,
    credentials: &Credentials,
    region: &str,
    time: SystemTime,
) -> Result<(), SearchIndexError> {
    let identity = credentials.clone().into();
    let params = v4::SigningParams::builder()
        .identity(&identity)
        .region(region)
        .name(SIGNING_SERVICE)
        .time(time)
        .settings(SigningSettings::default())
        .build()
        .map_err(|e| SearchIndexError::Signing(e.to_string()))?
        .into();

    let headers = request
        .headers()
        .iter()
        .map(|(name, value)| {
            value
                .to_str()
                .map(|value| (name.as_str(), value))
                .map_err(|e| SearchIndexError::Signing(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let signable = SignableRequest::new(
        request.method().as_str(),
        request.uri().to_string(),
        headers.into_iter(),
        SignableBody::Bytes(request.body()),
    )
    .map_err(|e| SearchIndexError::Signing(e.to_string()))?;

    let (instructions, _signature) = sign(signable, &params)
        .map_err(|e| SearchIndexError::Signing(e.to_string()))?
        .into_parts();
    instructions.apply_to_request_http1x(request);

    Ok(())
}

/// OpenSearch client scoped to one domain and index
#[derive(Clone)]
pub struct OpenSearchClient {
    http: reqwest::Client,
    signer: RequestSigner,
    base_url: String,
    index: String,
}

impl OpenSearchClient {
    pub fn new(config: &SearchConfig, signer: RequestSigner, timeout: Duration) -> Result<Self, SearchIndexError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchIndexError::Transport(e.to_string()))?;

        info!("Using search index '{}' at {}", config.index_name, config.base_url());

        Ok(OpenSearchClient {
            http,
            signer,
            base_url: config.base_url(),
            index: config.index_name.clone(),
        })
    }

    /// `POST` target for new documents
    pub fn document_url(&self) -> String {
        format!("{}/{}/_doc/", self.base_url, self.index)
    }

    /// `GET` target for queries
    pub fn search_url(&self) -> String {
        format!("{}/{}/_search", self.base_url, self.index)
    }

    /// Build, sign and send a JSON request, returning the status and body text
    async fn send(&self, method: Method, url: String, body: &Value) -> Result<(u16, String), SearchIndexError> {
        let payload = serde_json::to_vec(body).map_err(|e| SearchIndexError::Transport(e.to_string()))?;
        let mut request = Request::builder()
            .method(method)
            .uri(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .map_err(|e| SearchIndexError::Transport(e.to_string()))?;

        self.signer.sign(&mut request).await?;

        let request = reqwest::Request::try_from(request).map_err(|e| SearchIndexError::Transport(e.to_string()))?;
        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| SearchIndexError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| SearchIndexError::Transport(e.to_string()))?;

        Ok((status, text))
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[async_trait]
impl SearchIndex for OpenSearchClient {
    async fn index_document(&self, document: &BlogDocument) -> Result<(), SearchIndexError> {
        let body = serde_json::to_value(document).map_err(|e| SearchIndexError::Transport(e.to_string()))?;
        let (status, text) = self.send(Method::POST, self.document_url(), &body).await?;

        if !is_success(status) {
            return Err(SearchIndexError::Upstream { status, body: text });
        }

        debug!("Indexed document into '{}' (status {})", self.index, status);
        Ok(())
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Value>, SearchIndexError> {
        let (status, text) = self
            .send(Method::GET, self.search_url(), &query.to_request_body())
            .await?;

        if status != 200 {
            return Err(SearchIndexError::Upstream { status, body: text });
        }

        let response: SearchResponse =
            serde_json::from_str(&text).map_err(|e| SearchIndexError::Decode(e.to_string()))?;
        Ok(response.into_documents())
    }
}
