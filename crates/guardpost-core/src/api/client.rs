//! API client for communicating with the staffing REST API.
//!
//! This module provides the `ApiClient` struct for listing and mutating the
//! five resources the console manages. Every collection follows the same
//! shape: `GET /<path>/?search=`, `POST /<path>/`, `PUT /<path>/<id>`,
//! `DELETE /<path>/<id>`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::future::{BoxFuture, FutureExt};
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::ListSource;
use crate::models::{PaymentUpdate, Resource, SalaryRecord};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// HTTP request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// API client for the staffing backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
}

impl ApiClient {
    /// Create a new API client with the default request timeout
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, path: &str) -> String {
        format!("{}/{}/", self.base_url, path)
    }

    fn item_url(&self, path: &str, id: i64) -> String {
        format!("{}/{}/{}", self.base_url, path, id)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(response: Response) -> Result<Option<Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Send a request, backing off and retrying while the API answers 429.
    async fn send(&self, method: &str, url: &str, build: impl Fn() -> RequestBuilder) -> Result<Response> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = build()
                .send()
                .await
                .map_err(ApiError::from)
                .with_context(|| format!("Failed to send {} request to {}", method, url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Ok(response),
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response, url: &str) -> Result<T> {
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    // ===== Collections =====

    /// Fetch a resource list, optionally narrowed by the API's `search` filter
    pub async fn list<R: Resource>(&self, search: Option<&str>) -> Result<Vec<R>> {
        let url = self.collection_url(R::PATH);
        let search = search.map(str::trim).filter(|s| !s.is_empty());

        let response = self
            .send("GET", &url, || {
                let request = self.client.get(&url);
                match search {
                    Some(term) => request.query(&[("search", term)]),
                    None => request,
                }
            })
            .await?;

        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read {} list", R::PATH))?;
        let items = parse_list::<R>(&text)
            .with_context(|| format!("Failed to parse {} list", R::PATH))?;

        debug!(resource = R::PATH, count = items.len(), search = ?search, "List fetched");
        Ok(items)
    }

    pub async fn get<R: Resource>(&self, id: i64) -> Result<R> {
        let url = self.item_url(R::PATH, id);
        let response = self.send("GET", &url, || self.client.get(&url)).await?;
        Self::read_json(response, &url).await
    }

    pub async fn create<R: Resource, B: Serialize>(&self, body: &B) -> Result<R> {
        let url = self.collection_url(R::PATH);
        let response = self
            .send("POST", &url, || self.client.post(&url).json(body))
            .await?;
        let created: R = Self::read_json(response, &url).await?;
        debug!(resource = R::PATH, id = created.id(), "Created");
        Ok(created)
    }

    pub async fn update<R: Resource, B: Serialize>(&self, id: i64, body: &B) -> Result<R> {
        let url = self.item_url(R::PATH, id);
        let response = self
            .send("PUT", &url, || self.client.put(&url).json(body))
            .await?;
        Self::read_json(response, &url).await
    }

    /// Delete by id. The body of a successful delete is ignored.
    pub async fn delete<R: Resource>(&self, id: i64) -> Result<()> {
        let url = self.item_url(R::PATH, id);
        self.send("DELETE", &url, || self.client.delete(&url)).await?;
        debug!(resource = R::PATH, id = id, "Deleted");
        Ok(())
    }

    // ===== Salary =====

    /// Set the payment state of one salary record, addressed by its id.
    pub async fn set_salary_payment(&self, id: i64, update: &PaymentUpdate) -> Result<SalaryRecord> {
        self.update::<SalaryRecord, _>(id, update).await
    }
}

impl<R: Resource> ListSource<R> for ApiClient {
    fn fetch_list(&self, search: Option<String>) -> BoxFuture<'static, Result<Vec<R>>> {
        let api = self.clone();
        async move { api.list::<R>(search.as_deref()).await }.boxed()
    }
}

/// Accept either a bare JSON array or an object wrapping one.
fn parse_list<R: DeserializeOwned>(text: &str) -> Result<Vec<R>> {
    #[derive(Deserialize)]
    struct Wrapper<R> {
        #[serde(alias = "results", alias = "data")]
        items: Vec<R>,
    }

    match serde_json::from_str::<Vec<R>>(text) {
        Ok(items) => Ok(items),
        Err(array_err) => match serde_json::from_str::<Wrapper<R>>(text) {
            Ok(wrapper) => Ok(wrapper.items),
            Err(_) => Err(ApiError::InvalidResponse(array_err.to_string()).into()),
        },
    }
}
