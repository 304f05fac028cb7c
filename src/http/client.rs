//! Request executor with bounded retry
//!
//! Builds one HTTP request from a [`RequestSpec`] and sends it, retrying
//! every wire-level failure (connect error, timeout, non-2xx status,
//! undecodable body) until the [`RetryPolicy`] is spent.

use crate::error::{Error, Result};
use crate::logging::Logger;
use crate::template;
use crate::types::{JsonValue, Method, QueryMap, StringMap};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Timeout used when a `RequestSpec` does not carry one
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

const LABEL: &str = "execute";

// ============================================================================
// Request Spec
// ============================================================================

/// Everything needed to build one request
#[derive(Clone, Default)]
pub struct RequestSpec {
    /// Path template, e.g. `/organizations/{orgId}/catalog-content`
    pub uri_template: String,
    /// Values for the template placeholders
    pub path_params: StringMap,
    /// Query parameters; `null` entries are not sent
    pub query_params: QueryMap,
    /// JSON body; `null` members are stripped, an empty object is not sent
    pub body: Option<JsonValue>,
    /// HTTP method
    pub method: Method,
    /// Scheme and host the rendered path is appended to
    pub base_url: String,
    /// Bearer token
    pub auth_token: String,
    /// Client-side timeout, [`DEFAULT_TIMEOUT`] when unset
    pub timeout: Option<Duration>,
}

impl RequestSpec {
    /// Create a GET spec for `uri_template` below `base_url`
    pub fn new(base_url: impl Into<String>, uri_template: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            uri_template: uri_template.into(),
            ..Default::default()
        }
    }

    /// Add a path parameter
    #[must_use]
    pub fn path_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.query_params.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the method
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the bearer token
    #[must_use]
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.auth_token = token.into();
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replace a query parameter in place
    pub fn set_query(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
        self.query_params.insert(key.into(), value.into());
    }

    /// Render the template and append it to the base URL
    pub fn url(&self) -> Result<Url> {
        let path = template::render(&self.uri_template, &self.path_params)?;
        Ok(Url::parse(&join_url(&self.base_url, &path))?)
    }

    /// Query parameters that will actually be sent, in key order
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query_params
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), scalar_to_string(v)))
            .collect()
    }

    /// Body that will actually be sent, if any
    pub fn request_body(&self) -> Option<JsonValue> {
        match &self.body {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::Object(map)) => {
                let stripped: serde_json::Map<String, JsonValue> = map
                    .iter()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                if stripped.is_empty() {
                    None
                } else {
                    Some(JsonValue::Object(stripped))
                }
            }
            Some(JsonValue::Array(items)) if items.is_empty() => None,
            Some(other) => Some(other.clone()),
        }
    }
}

impl std::fmt::Debug for RequestSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSpec")
            .field("method", &self.method)
            .field("base_url", &self.base_url)
            .field("uri_template", &self.uri_template)
            .field("path_params", &self.path_params)
            .field("query_params", &self.query_params)
            .field("body", &self.body)
            .field("auth_token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ============================================================================
// Retry Policy
// ============================================================================

/// Bounded retry with capped exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub min_backoff: Duration,
    /// Upper bound for any delay
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            min_backoff: Duration::from_millis(1000),
            max_backoff: Duration::from_millis(2000),
        }
    }
}

impl RetryPolicy {
    /// Create a policy
    pub fn new(max_retries: u32, min_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_retries,
            min_backoff,
            max_backoff,
        }
    }

    /// Single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Total attempts allowed per request
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (1-based)
    ///
    /// `min_backoff * 2^(retry - 1)`, never above `max_backoff`.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        let delay = self.min_backoff.saturating_mul(factor);
        std::cmp::min(delay, self.max_backoff)
    }
}

// ============================================================================
// Response
// ============================================================================

/// A successful response: headers plus decoded JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status
    pub status: u16,
    /// Headers with lowercase names
    pub headers: BTreeMap<String, String>,
    /// Decoded body, `Null` for an empty body
    pub body: JsonValue,
}

impl ApiResponse {
    /// Look up a header by name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

// ============================================================================
// Executor
// ============================================================================

/// Executes a request spec under a retry policy
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Send the request, retrying per `policy`
    async fn execute(&self, spec: &RequestSpec, policy: &RetryPolicy) -> Result<ApiResponse>;
}

/// reqwest-backed request executor
pub struct HttpClient {
    client: Client,
    logger: Arc<dyn Logger>,
}

impl HttpClient {
    /// Create a client that reports to `logger`
    pub fn new(logger: Arc<dyn Logger>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        Ok(Self::with_client(client, logger))
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: Client, logger: Arc<dyn Logger>) -> Self {
        Self { client, logger }
    }

    async fn send_once(
        &self,
        spec: &RequestSpec,
        url: &Url,
        query: &[(String, String)],
        body: Option<&JsonValue>,
        timeout: Duration,
    ) -> Result<ApiResponse> {
        let mut req = self
            .client
            .request(spec.method.into(), url.clone())
            .bearer_auth(&spec.auth_token)
            .timeout(timeout);

        if !query.is_empty() {
            req = req.query(query);
        }

        if let Some(body) = body {
            req = req.json(body);
        }

        let response = match req.send().await {
            Ok(response) => response,
            Err(e) => {
                self.logger.debug(LABEL, "No response available");
                return Err(classify(e, timeout));
            }
        };

        let status = response.status();
        let headers = header_map(response.headers());
        let text = response.text().await.map_err(|e| classify(e, timeout))?;

        if !status.is_success() {
            self.logger
                .debug(LABEL, &format!("Response headers: {}", to_json(&headers)));
            self.logger.debug(LABEL, &format!("Response body: {text}"));
            return Err(Error::http_status(status.as_u16(), text));
        }

        let body = if text.trim().is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_str(&text)?
        };

        Ok(ApiResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}

#[async_trait]
impl RequestExecutor for HttpClient {
    async fn execute(&self, spec: &RequestSpec, policy: &RetryPolicy) -> Result<ApiResponse> {
        // Template and URL failures are the same on every attempt
        let url = spec.url()?;
        let query = spec.query_pairs();
        let body = spec.request_body();
        let timeout = spec.timeout.unwrap_or(DEFAULT_TIMEOUT);

        self.logger
            .debug(LABEL, &format!("Request URI: {} {url}", spec.method));
        self.logger.debug(
            LABEL,
            &format!(
                "Request query parameters: {}",
                to_json(&query.iter().cloned().collect::<BTreeMap<_, _>>())
            ),
        );
        self.logger.debug(
            LABEL,
            &format!(
                "Request body: {}",
                body.as_ref().map_or_else(|| "{}".to_string(), |b| to_json(b))
            ),
        );

        let max_attempts = policy.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self
                .send_once(spec, &url, &query, body.as_ref(), timeout)
                .await
            {
                Ok(response) => {
                    self.logger.debug(
                        LABEL,
                        &format!("Response headers: {}", to_json(&response.headers)),
                    );
                    return Ok(response);
                }
                Err(err) => {
                    self.logger.warn(
                        LABEL,
                        &format!("Attempt {attempt}/{max_attempts} failed: {err}"),
                    );

                    if attempt >= max_attempts || !err.is_retryable() {
                        self.logger.error(
                            LABEL,
                            &format!("Giving up on {url} after {attempt} attempt(s)"),
                        );
                        return Err(Error::RequestFailed {
                            attempts: attempt,
                            source: Box::new(err),
                        });
                    }

                    let delay = policy.backoff(attempt);
                    self.logger
                        .debug(LABEL, &format!("Retrying in {delay:?}"));
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient").finish_non_exhaustive()
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Join base URL and path the way most HTTP clients do: exactly one slash
fn join_url(base: &str, path: &str) -> String {
    if path.is_empty() {
        return base.to_string();
    }
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

/// Convert a scalar query value to its wire form
fn scalar_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => String::new(),
        // For complex types, use JSON serialization
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        map.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    map
}

fn classify(e: reqwest::Error, timeout: Duration) -> Error {
    if e.is_timeout() {
        Error::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        }
    } else {
        Error::Http(e)
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}
