//! Run configuration
//!
//! The exporter is configured from an optional YAML file layered over
//! built-in defaults, then from command-line flags and environment
//! variables. Field aliases accept the camelCase names used by older
//! configuration files (`baseURL`, `uritemplate`, `retry_options`, ...).

use crate::error::{Error, Result, ResultExt};
use crate::http::{RequestSpec, RetryPolicy};
use crate::pagination::PagerConfig;
use crate::types::{JsonValue, LogLevel, Method, OptionStringExt, QueryMap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Placeholder in file names replaced by the run's start time
pub const START_TIMESTAMP: &str = "{start_timestamp}";

/// Largest page the catalog API serves
pub const MAX_PAGE_SIZE: u64 = 1000;

const REDACTED: &str = "<redacted>";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete exporter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Customer label, informational only
    pub customer: String,

    /// Log file and level
    pub debug: DebugConfig,

    /// Where the JSON document goes
    pub output: OutputConfig,

    /// The catalog request
    pub request: RequestConfig,

    /// Retry behavior of each page request
    #[serde(alias = "retry_options")]
    pub retry: RetryConfig,

    /// Pager tuning
    pub paging: PagingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            customer: "default".to_string(),
            debug: DebugConfig::default(),
            output: OutputConfig::default(),
            request: RequestConfig::default(),
            retry: RetryConfig::default(),
            paging: PagingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Minimum level written
    #[serde(alias = "loggingLevel")]
    pub logging_level: LogLevel,
    /// Directory for the log file
    pub path: PathBuf,
    /// Log file name, may contain `{start_timestamp}`
    pub filename: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            logging_level: LogLevel::Info,
            path: PathBuf::from("results/output"),
            filename: format!("{START_TIMESTAMP}_results.log"),
        }
    }
}

/// Output file configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for the JSON document
    pub path: PathBuf,
    /// File name, may contain `{start_timestamp}`
    pub filename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("results/output"),
            filename: format!("{START_TIMESTAMP}_results.json"),
        }
    }
}

/// Catalog request configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Client-side timeout per attempt
    #[serde(alias = "timeout")]
    pub timeout_ms: u64,

    /// Bearer token
    pub bearer: Option<String>,

    /// API base URL
    #[serde(alias = "baseURL")]
    pub base_url: Option<String>,

    /// Path parameters for the URI template
    pub path: BTreeMap<String, Option<String>>,

    /// Query parameters; `null` values are not sent
    pub query: QueryMap,

    /// Optional JSON body
    pub body: Option<JsonValue>,

    /// HTTP method
    pub method: Method,

    /// Path template below the base URL
    #[serde(alias = "uritemplate")]
    pub uri_template: String,
}

impl Default for RequestConfig {
    fn default() -> Self {
        let mut path = BTreeMap::new();
        path.insert("orgId".to_string(), None);

        let mut query = QueryMap::new();
        query.insert("transformName".to_string(), JsonValue::Null);
        query.insert("updatedSince".to_string(), JsonValue::Null);
        query.insert("offset".to_string(), JsonValue::Null);
        query.insert("max".to_string(), JsonValue::from(MAX_PAGE_SIZE));
        query.insert("pagingRequestId".to_string(), JsonValue::Null);

        Self {
            timeout_ms: 20_000,
            bearer: None,
            base_url: None,
            path,
            query,
            body: None,
            method: Method::GET,
            uri_template: "/content-discovery/v2/organizations/{orgId}/catalog-content"
                .to_string(),
        }
    }
}

/// Retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub retries: u32,
    /// First backoff delay
    #[serde(alias = "minTimeout")]
    pub min_backoff_ms: u64,
    /// Backoff ceiling
    #[serde(alias = "maxTimeout")]
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            min_backoff_ms: 1000,
            max_backoff_ms: 2000,
        }
    }
}

/// Pager tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    /// Consecutive empty pages tolerated before failing
    pub max_empty_pages: u32,
    /// Array field holding the records when the body is an object
    pub records_field: Option<String>,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            max_empty_pages: 3,
            records_field: None,
        }
    }
}

// ============================================================================
// Overrides
// ============================================================================

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bearer: Option<String>,
    pub base_url: Option<String>,
    pub org_id: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub log_level: Option<LogLevel>,
    pub updated_since: Option<String>,
    pub page_size: Option<u64>,
}

// ============================================================================
// Loading
// ============================================================================

impl AppConfig {
    /// Parse a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from a file, or fall back to defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&contents)
    }

    /// Apply command-line and environment values on top of the file
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(bearer) = overrides.bearer.none_if_empty() {
            self.request.bearer = Some(bearer);
        }
        if let Some(base_url) = overrides.base_url.none_if_empty() {
            self.request.base_url = Some(base_url);
        }
        if let Some(org_id) = overrides.org_id.none_if_empty() {
            self.request.path.insert("orgId".to_string(), Some(org_id));
        }
        if let Some(dir) = overrides.output_dir {
            self.output.path.clone_from(&dir);
            self.debug.path = dir;
        }
        if let Some(level) = overrides.log_level {
            self.debug.logging_level = level;
        }
        if let Some(since) = overrides.updated_since.none_if_empty() {
            self.request
                .query
                .insert("updatedSince".to_string(), JsonValue::from(since));
        }
        if let Some(size) = overrides.page_size {
            self.request
                .query
                .insert("max".to_string(), JsonValue::from(size));
        }
    }

    /// Substitute the start time into the log and output file names
    pub fn resolve_filenames(&mut self, started: DateTime<Utc>) {
        let stamp = started.format("%Y%m%d_%H%M%S").to_string();
        self.debug.filename = self.debug.filename.replace(START_TIMESTAMP, &stamp);
        self.output.filename = self.output.filename.replace(START_TIMESTAMP, &stamp);
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check that everything needed for a run is present and sane
    pub fn validate(&self) -> Result<()> {
        if self.request.bearer.clone().none_if_empty().is_none() {
            return Err(Error::missing_field("request.bearer"));
        }

        let base_url = self
            .request
            .base_url
            .clone()
            .none_if_empty()
            .ok_or_else(|| Error::missing_field("request.base_url"))?;
        url::Url::parse(&base_url)
            .map_err(|e| Error::invalid_value("request.base_url", e.to_string()))?;

        for name in crate::template::extract_variables(&self.request.uri_template) {
            let present = self
                .request
                .path
                .get(&name)
                .cloned()
                .flatten()
                .none_if_empty()
                .is_some();
            if !present {
                return Err(Error::missing_field(format!("request.path.{name}")));
            }
        }

        let page_size = self.page_size()?;
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(Error::invalid_value(
                "request.query.max",
                format!("must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"),
            ));
        }

        if self.retry.min_backoff_ms > self.retry.max_backoff_ms {
            return Err(Error::invalid_value(
                "retry.min_backoff_ms",
                "must not exceed retry.max_backoff_ms",
            ));
        }

        if self.paging.max_empty_pages == 0 {
            return Err(Error::invalid_value(
                "paging.max_empty_pages",
                "must be at least 1",
            ));
        }

        Ok(())
    }

    /// Page size taken from the `max` query parameter
    pub fn page_size(&self) -> Result<u64> {
        match self.request.query.get("max") {
            None | Some(JsonValue::Null) => Ok(MAX_PAGE_SIZE),
            Some(JsonValue::Number(n)) => n.as_u64().ok_or_else(|| {
                Error::invalid_value("request.query.max", format!("{n} is not a page size"))
            }),
            Some(JsonValue::String(s)) => s.trim().parse().map_err(|_| {
                Error::invalid_value("request.query.max", format!("'{s}' is not a page size"))
            }),
            Some(other) => Err(Error::invalid_value(
                "request.query.max",
                format!("{other} is not a page size"),
            )),
        }
    }

    // ========================================================================
    // Conversions
    // ========================================================================

    /// Build the initial request for the pager
    pub fn request_spec(&self) -> Result<RequestSpec> {
        let path_params = self
            .request
            .path
            .iter()
            .filter_map(|(k, v)| v.clone().map(|v| (k.clone(), v)))
            .collect();

        Ok(RequestSpec {
            uri_template: self.request.uri_template.clone(),
            path_params,
            query_params: self.request.query.clone(),
            body: self.request.body.clone(),
            method: self.request.method,
            base_url: self
                .request
                .base_url
                .clone()
                .ok_or_else(|| Error::missing_field("request.base_url"))?,
            auth_token: self
                .request
                .bearer
                .clone()
                .ok_or_else(|| Error::missing_field("request.bearer"))?,
            timeout: Some(Duration::from_millis(self.request.timeout_ms)),
        })
    }

    /// Retry policy for each page request
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.retries,
            Duration::from_millis(self.retry.min_backoff_ms),
            Duration::from_millis(self.retry.max_backoff_ms),
        )
    }

    /// Pager configuration
    pub fn pager_config(&self) -> Result<PagerConfig> {
        let mut config =
            PagerConfig::new(self.page_size()?).with_max_empty_pages(self.paging.max_empty_pages);
        config.records_field.clone_from(&self.paging.records_field);
        Ok(config)
    }

    /// Full path of the log file
    pub fn log_file_path(&self) -> PathBuf {
        self.debug.path.join(&self.debug.filename)
    }

    /// Full path of the JSON document
    pub fn output_file_path(&self) -> PathBuf {
        self.output.path.join(&self.output.filename)
    }

    /// Copy safe to log: the bearer token is masked
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.request.bearer.is_some() {
            copy.request.bearer = Some(REDACTED.to_string());
        }
        copy
    }
}
