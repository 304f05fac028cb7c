//! Error types for the catalog exporter
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the catalog exporter
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Template Errors
    // ============================================================================
    #[error("Undefined variable in template: {variable}")]
    UndefinedVariable { variable: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Request failed after {attempts} attempt(s): {source}")]
    RequestFailed {
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    // ============================================================================
    // Paging Errors
    // ============================================================================
    #[error("Malformed header '{header}': {message}")]
    MalformedHeader { header: String, message: String },

    #[error("Failed to fetch page at offset {offset}: {source}")]
    PageFetchFailed {
        offset: u64,
        #[source]
        source: Box<Error>,
    },

    #[error("Unexpected response body: {message}")]
    UnexpectedBody { message: String },

    #[error("Paging stalled at offset {offset} of {total}: {empty_pages} consecutive empty pages")]
    StalledPaging {
        offset: u64,
        total: u64,
        empty_pages: u32,
    },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unresolved placeholder in a URI template
    Template,
    /// Request failed and the retry budget is spent
    RequestFailed,
    /// Pagination header missing or unparsable
    MalformedHeader,
    /// A page after the first one could not be fetched
    PageFetchFailed,
    /// Response body has no recognizable record list
    UnexpectedBody,
    /// Server keeps returning empty pages before the reported total
    StalledPaging,
    /// Configuration missing or invalid
    Config,
    /// Filesystem or output failure
    Io,
    /// Transport-level failure not yet classified by the executor
    Transport,
    /// Anything else
    Other,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create an undefined variable error
    pub fn undefined_var(variable: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            variable: variable.into(),
        }
    }

    /// Create a malformed header error
    pub fn malformed_header(header: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedHeader {
            header: header.into(),
            message: message.into(),
        }
    }

    /// Create an unexpected body error
    pub fn unexpected_body(message: impl Into<String>) -> Self {
        Self::UnexpectedBody {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UndefinedVariable { .. } => ErrorKind::Template,
            Error::RequestFailed { .. } => ErrorKind::RequestFailed,
            Error::MalformedHeader { .. } => ErrorKind::MalformedHeader,
            Error::PageFetchFailed { .. } => ErrorKind::PageFetchFailed,
            Error::UnexpectedBody { .. } => ErrorKind::UnexpectedBody,
            Error::StalledPaging { .. } => ErrorKind::StalledPaging,
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::InvalidConfigValue { .. }
            | Error::YamlParse(_) => ErrorKind::Config,
            Error::Io(_) | Error::FileNotFound { .. } | Error::Output { .. } => ErrorKind::Io,
            Error::Http(_)
            | Error::HttpStatus { .. }
            | Error::Timeout { .. }
            | Error::InvalidUrl(_)
            | Error::JsonParse(_) => ErrorKind::Transport,
            Error::Other(_) => ErrorKind::Other,
        }
    }

    /// Check if this error can be cured by sending the same request again
    ///
    /// Template and URL errors fail identically on every attempt, everything
    /// coming back from the wire is worth another try.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::HttpStatus { .. } | Error::Timeout { .. } | Error::JsonParse(_)
        )
    }
}

/// Result type alias for the catalog exporter
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
