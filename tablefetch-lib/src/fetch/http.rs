//! HTTP page fetcher for REST-style paginated list endpoints.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::PageFetcher;
use crate::error::ConfigError;
use crate::error::FetchError;
use crate::query::Page;
use crate::query::PageQuery;

/// Default response header carrying the total row count.
pub const DEFAULT_TOTAL_HEADER: &str = "X-Total-Count";

/// Fetches pages from a REST list endpoint.
///
/// Each fetch is a `GET` on the endpoint with the query's parameters
/// appended (`sort`, `direction`, filters, `offset`, `limit`). The body may
/// be a bare JSON array of rows or an envelope:
///
/// ```json
/// { "data": [ ... ], "pagination": { "total": 120 } }
/// ```
///
/// When the envelope carries no total, the total header (default
/// `X-Total-Count`) is used if present.
///
/// This fetcher is cheap to clone (uses `Arc` internally).
///
/// # Example
///
/// ```ignore
/// use tablefetch_lib::fetch::HttpPageFetcher;
/// use tablefetch_lib::model::JsonRecord;
///
/// let fetcher: HttpPageFetcher<JsonRecord> = HttpPageFetcher::builder()
///     .endpoint("https://example.com/api/users")
///     .bearer_token("secret")
///     .timeout(Duration::from_secs(10))
///     .build()?;
/// ```
pub struct HttpPageFetcher<T> {
    inner: Arc<HttpPageFetcherInner>,
    _row: PhantomData<fn() -> T>,
}

struct HttpPageFetcherInner {
    endpoint: Url,
    http_client: Client,
    timeout: Option<Duration>,
    bearer_token: Option<String>,
    total_header: String,
}

impl<T> HttpPageFetcher<T> {
    /// Creates a new builder for constructing a fetcher.
    pub fn builder() -> HttpPageFetcherBuilder<T, Missing> {
        HttpPageFetcherBuilder::new()
    }

    /// Returns the endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Returns the URL requested for a query.
    pub fn request_url(&self, query: &PageQuery) -> Url {
        let mut url = self.inner.endpoint.clone();
        url.query_pairs_mut().extend_pairs(query.to_pairs());
        url
    }
}

impl<T> Clone for HttpPageFetcher<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _row: PhantomData,
        }
    }
}

impl<T> fmt::Debug for HttpPageFetcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpPageFetcher")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("timeout", &self.inner.timeout)
            .field("total_header", &self.inner.total_header)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T> PageFetcher<T> for HttpPageFetcher<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch(&self, query: &PageQuery) -> Result<Page<T>, FetchError> {
        let url = self.request_url(query);
        log::debug!("[http] GET {}", url);

        let mut request = self
            .inner
            .http_client
            .get(url)
            .header(ACCEPT, "application/json");

        if let Some(token) = &self.inner.bearer_token {
            request = request.bearer_auth(token);
        }

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.is_empty() {
                status.canonical_reason().unwrap_or_default().to_string()
            } else {
                body
            };
            return Err(FetchError::server(status.as_u16(), message));
        }

        let header_total = response
            .headers()
            .get(self.inner.total_header.as_str())
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<usize>().ok());

        let body = response.bytes().await?;
        let list: ListResponse<T> = serde_json::from_slice(&body).map_err(|err| {
            FetchError::parse_with_body(err.to_string(), String::from_utf8_lossy(&body))
        })?;

        let (items, envelope_total) = match list {
            ListResponse::Bare(items) => (items, None),
            ListResponse::Envelope { data, pagination } => {
                (data, pagination.and_then(|p| p.total))
            }
        };

        let page = Page::new(items);
        Ok(match envelope_total.or(header_total) {
            Some(total) => page.with_total(total),
            None => page,
        })
    }
}

/// Body of a list endpoint response.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListResponse<T> {
    /// A bare array of rows.
    Bare(Vec<T>),
    /// Rows wrapped in an envelope with optional pagination info.
    Envelope {
        data: Vec<T>,
        pagination: Option<Pagination>,
    },
}

/// Pagination info of an enveloped response.
#[derive(Debug, Deserialize)]
struct Pagination {
    total: Option<usize>,
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing an [`HttpPageFetcher`].
///
/// Uses the typestate pattern to ensure the endpoint is set at compile time.
pub struct HttpPageFetcherBuilder<T, Endpoint> {
    endpoint: Endpoint,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    bearer_token: Option<String>,
    total_header: String,
    http_client: Option<Client>,
    _row: PhantomData<fn() -> T>,
}

impl<T> HttpPageFetcherBuilder<T, Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            endpoint: Missing,
            timeout: None,
            connect_timeout: None,
            bearer_token: None,
            total_header: DEFAULT_TOTAL_HEADER.to_string(),
            http_client: None,
            _row: PhantomData,
        }
    }

    /// Sets the list endpoint URL.
    ///
    /// Parameters already present on the URL are kept and sent with every
    /// request.
    pub fn endpoint(self, endpoint: impl Into<String>) -> HttpPageFetcherBuilder<T, Set<String>> {
        HttpPageFetcherBuilder {
            endpoint: Set(endpoint.into()),
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            bearer_token: self.bearer_token,
            total_header: self.total_header,
            http_client: self.http_client,
            _row: PhantomData,
        }
    }
}

impl<T> Default for HttpPageFetcherBuilder<T, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> HttpPageFetcherBuilder<T, E> {
    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a bearer token sent with every request.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Sets the response header read for the total row count.
    ///
    /// Defaults to `X-Total-Count`.
    pub fn total_header(mut self, header: impl Into<String>) -> Self {
        self.total_header = header.into();
        self
    }

    /// Sets a custom HTTP client.
    ///
    /// If not set, a default client will be created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl<T> HttpPageFetcherBuilder<T, Set<String>> {
    /// Builds the [`HttpPageFetcher`].
    ///
    /// This method is only available once the endpoint has been set.
    pub fn build(self) -> Result<HttpPageFetcher<T>, ConfigError> {
        let raw = self.endpoint.0;
        let endpoint = Url::parse(&raw).map_err(|source| ConfigError::InvalidEndpoint {
            endpoint: raw.clone(),
            source,
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(ConfigError::CannotBeABase(raw));
        }

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(HttpPageFetcher {
            inner: Arc::new(HttpPageFetcherInner {
                endpoint,
                http_client,
                timeout: self.timeout,
                bearer_token: self.bearer_token,
                total_header: self.total_header,
            }),
            _row: PhantomData,
        })
    }
}
