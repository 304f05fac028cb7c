//! Common types used throughout the exporter
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;

/// Query parameters: scalar JSON values, `null` meaning "not sent".
///
/// Ordered so the rendered query string is stable between runs.
pub type QueryMap = BTreeMap<String, JsonValue>;

// ============================================================================
// HTTP Types
// ============================================================================

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    #[serde(alias = "get")]
    GET,
    #[serde(alias = "post")]
    POST,
    #[serde(alias = "put")]
    PUT,
    #[serde(alias = "patch")]
    PATCH,
    #[serde(alias = "delete")]
    DELETE,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => reqwest::Method::GET,
            Method::POST => reqwest::Method::POST,
            Method::PUT => reqwest::Method::PUT,
            Method::PATCH => reqwest::Method::PATCH,
            Method::DELETE => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::PATCH => "PATCH",
            Method::DELETE => "DELETE",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Log Level
// ============================================================================

/// Log level accepted in configuration and on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_conversion() {
        let get: reqwest::Method = Method::GET.into();
        assert_eq!(reqwest::Method::GET, get);
        let post: reqwest::Method = Method::POST.into();
        assert_eq!(reqwest::Method::POST, post);
    }

    #[test]
    fn test_method_default() {
        assert_eq!(Method::default(), Method::GET);
    }

    #[test]
    fn test_method_serde_accepts_lowercase() {
        let method: Method = serde_json::from_str("\"get\"").unwrap();
        assert_eq!(method, Method::GET);
        let method: Method = serde_json::from_str("\"POST\"").unwrap();
        assert_eq!(method, Method::POST);

        let json = serde_json::to_string(&Method::PATCH).unwrap();
        assert_eq!(json, "\"PATCH\"");
    }

    #[test]
    fn test_log_level_serde() {
        let level: LogLevel = serde_json::from_str("\"debug\"").unwrap();
        assert_eq!(level, LogLevel::Debug);
        assert_eq!(tracing::Level::from(LogLevel::Warn), tracing::Level::WARN);
    }

    #[test]
    fn test_option_string_none_if_empty() {
        assert_eq!(
            Some("test".to_string()).none_if_empty(),
            Some("test".to_string())
        );
        assert_eq!(Some(String::new()).none_if_empty(), None);
        assert_eq!(Some("  ".to_string()).none_if_empty(), None);
        assert_eq!(None::<String>.none_if_empty(), None);
    }
}
