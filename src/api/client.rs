//! SCP OpenAPI HTTP client.
//!
//! Every product-line facade funnels through [`ScpClient::send`], which
//! scopes the request to the configured project, retries network failures
//! and rate limits, and turns the answer into an [`ApiResponse`] that keeps
//! the HTTP status code alongside the decoded body.

use reqwest::{Client, Method, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace};

use crate::config::ProviderConfig;
use crate::error::{ApiError, Result, ScpError};

/// Maximum number of retries for network failures and rate limits.
const MAX_RETRIES: u32 = 3;

/// Delay between retries in milliseconds.
const RETRY_DELAY_MS: u64 = 1000;

/// Client type reported to the gateway.
const CLIENT_TYPE: &str = "OpenApi";

/// A decoded API answer together with its HTTP status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse<T> {
    /// Decoded response body.
    pub body: T,
    /// HTTP status code.
    pub status: u16,
}

impl<T> ApiResponse<T> {
    /// Drops the status code.
    pub fn into_body(self) -> T {
        self.body
    }
}

/// SCP OpenAPI client.
#[derive(Debug, Clone)]
pub struct ScpClient {
    /// HTTP client.
    client: Client,
    /// Gateway base URL without trailing slash.
    endpoint: String,
    /// Project scope.
    project_id: String,
    /// Access key header value.
    access_key: Option<String>,
    /// Bearer token.
    auth_token: Option<String>,
}

impl ScpClient {
    /// Creates a client from the provider configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            access_key: config.access_key.clone(),
            auth_token: config.auth_token.clone(),
        })
    }

    /// Returns the project this client is scoped to.
    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Sends a GET request.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<ApiResponse<T>> {
        self.send::<(), T>(Method::GET, path, query, None).await
    }

    /// Sends a GET request and returns the raw body text.
    pub(crate) async fn get_text(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<ApiResponse<String>> {
        let (status, body) = self.execute::<()>(Method::GET, path, query, None).await?;
        Ok(ApiResponse { body, status })
    }

    /// Sends a POST request.
    pub(crate) async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse<T>> {
        self.send(Method::POST, path, &[], body).await
    }

    /// Sends a PUT request.
    pub(crate) async fn put<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>> {
        self.send(Method::PUT, path, &[], Some(body)).await
    }

    /// Sends a DELETE request.
    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>> {
        self.send::<(), T>(Method::DELETE, path, &[], None).await
    }

    /// Sends a request and decodes the JSON answer.
    async fn send<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<ApiResponse<T>> {
        let (status, text) = self.execute(method, path, query, body).await?;

        // Empty bodies decode as JSON null so `()` and `Option` targets work.
        let raw = if text.trim().is_empty() { "null" } else { text.as_str() };
        let body = serde_json::from_str(raw).map_err(|e| {
            ApiError::invalid_response(format!("Failed to parse response of {path}: {e}"))
        })?;

        Ok(ApiResponse { body, status })
    }

    /// Executes a request with retries for network failures and rate limits.
    ///
    /// Requests the server may already have accepted are only repeated for
    /// idempotent methods, so a create is never submitted twice.
    async fn execute<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<(u16, String)> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = last_error
                    .as_ref()
                    .and_then(ScpError::retry_delay_secs)
                    .map_or(RETRY_DELAY_MS * u64::from(attempt), |s| {
                        (s * 1000).min(RETRY_DELAY_MS * 10)
                    });
                debug!("Retry attempt {attempt} of {MAX_RETRIES} for {path}");
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            match self.execute_once(method.clone(), path, query, body).await {
                Ok(result) => return Ok(result),
                Err(failure) => {
                    if !may_retry(&method, &failure) {
                        return Err(failure.error);
                    }
                    last_error = Some(failure.error);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ApiError::network("Max retries exceeded").into()))
    }

    /// Executes a single request.
    async fn execute_once<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> std::result::Result<(u16, String), AttemptFailure> {
        let url = format!("{}{path}", self.endpoint);
        trace!("{method} {url}");

        let mut request = self
            .client
            .request(method, &url)
            .header(header::ACCEPT, "application/json")
            .header("X-Cmp-ProjectId", &self.project_id)
            .header("X-Cmp-ClientType", CLIENT_TYPE)
            .header(
                "X-Cmp-Timestamp",
                chrono::Utc::now().timestamp_millis().to_string(),
            );

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(access_key) = &self.access_key {
            request = request.header("X-Cmp-AccessKey", access_key);
        }
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| AttemptFailure {
            delivered: !e.is_connect(),
            error: ApiError::network(format!("Request failed: {e}")).into(),
        })?;

        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or_default();
            let retry_after = if retry_after == 0 { 60 } else { retry_after };

            return Err(AttemptFailure {
                delivered: false,
                error: ApiError::RateLimited {
                    retry_after_secs: retry_after,
                }
                .into(),
            });
        }

        let text = response.text().await.map_err(|e| AttemptFailure {
            delivered: true,
            error: ApiError::network(format!("Failed to read response body: {e}")).into(),
        })?;

        if !status.is_success() {
            return Err(AttemptFailure {
                delivered: true,
                error: ApiError::request_failed(status.as_u16(), error_message(&text)).into(),
            });
        }

        Ok((status.as_u16(), text))
    }
}

/// A single attempt that produced no usable answer.
#[derive(Debug)]
struct AttemptFailure {
    error: ScpError,
    /// The server may have acted on the request.
    delivered: bool,
}

/// Whether a failed attempt can be sent again.
fn may_retry(method: &Method, failure: &AttemptFailure) -> bool {
    failure.error.is_retryable() && (!failure.delivered || method.is_idempotent())
}

/// Extracts the human-readable message from an SCP error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("errorMessage"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

/// Pushes a query pair when the value is present and non-empty.
pub(crate) fn push_opt(query: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        query.push((key, v.to_string()));
    }
}
