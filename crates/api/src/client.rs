use std::sync::Arc;

use serde::de::DeserializeOwned;
use workboard_core::{ListPage, QueryState};

use crate::auth::TokenProvider;
use crate::error::ApiError;

/// Request timeout for all collection API calls.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for one paginated collection endpoint.
///
/// Cheap to clone; clones share the connection pool and token provider.
#[derive(Clone)]
pub struct CollectionClient {
    client: reqwest::Client,
    base_url: String,
    endpoint: String,
    tokens: Arc<dyn TokenProvider>,
}

impl std::fmt::Debug for CollectionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionClient")
            .field("base_url", &self.base_url)
            .field("endpoint", &self.endpoint)
            .field("tokens", &"<provider>")
            .finish()
    }
}

impl CollectionClient {
    /// Creates a client for `<base_url>/<endpoint>`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend
    /// failure).
    pub fn new(
        base_url: impl Into<String>,
        endpoint: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        let endpoint = endpoint.into().trim_matches('/').to_owned();
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ApiError::ClientInit(e.to_string()))?;
        Ok(Self { client, base_url, endpoint, tokens })
    }

    /// Returns the endpoint path this client addresses.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, self.endpoint)
    }

    fn bearer(&self) -> Result<String, ApiError> {
        self.tokens.token().map(|t| format!("Bearer {t}")).ok_or(ApiError::MissingAuth)
    }

    /// Fetch one page of the collection for the given query.
    ///
    /// Single attempt: staleness is the caller's concern (generation
    /// discarding), and transient failures surface as screen-level errors
    /// with a retry action.
    ///
    /// # Errors
    /// Returns an error if no credential is available, the request fails,
    /// the server answers non-success, or the body cannot be parsed.
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        query: &QueryState,
    ) -> Result<ListPage<T>, ApiError> {
        let response = self
            .client
            .get(self.collection_url())
            .header("Authorization", self.bearer()?)
            .query(&query.to_query_pairs())
            .send()
            .await?;
        Self::read_json(response, "list response").await
    }

    /// Send a per-resource PATCH with an action-specific body.
    ///
    /// The body is opaque to this client; there is no batch endpoint, so
    /// bulk operations issue one PATCH per id.
    ///
    /// # Errors
    /// Returns an error if no credential is available, the request fails, or
    /// the server answers non-success.
    pub async fn patch(&self, id: &str, body: &serde_json::Value) -> Result<(), ApiError> {
        let response = self
            .client
            .patch(format!("{}/{id}", self.collection_url()))
            .header("Authorization", self.bearer()?)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(ApiError::HttpStatus { code: status.as_u16(), body: Self::error_body(response).await })
    }

    /// Fetch the endpoint's aggregate stats (`GET <endpoint>/stats`), used
    /// by the dashboards' chart widgets.
    ///
    /// # Errors
    /// Same failure modes as [`fetch_page`](Self::fetch_page).
    pub async fn fetch_stats<S: DeserializeOwned>(&self) -> Result<S, ApiError> {
        let response = self
            .client
            .get(format!("{}/stats", self.collection_url()))
            .header("Authorization", self.bearer()?)
            .send()
            .await?;
        Self::read_json(response, "stats response").await
    }

    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
        context: &str,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus {
                code: status.as_u16(),
                body: Self::error_body(response).await,
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::JsonParse {
            context: format!("{context} (body: {})", truncate(&body, 200)),
            source: e,
        })
    }

    async fn error_body(response: reqwest::Response) -> String {
        response.text().await.unwrap_or_else(|_| "could not read error body".to_owned())
    }
}

/// Truncates a string to `max_len` bytes at a char boundary, for error
/// context without dumping whole bodies into logs.
#[must_use]
fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    s.get(..end).unwrap_or("")
}
