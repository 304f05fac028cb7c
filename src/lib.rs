// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::needless_pass_by_value)]

//! # Percipio Catalog Exporter
//!
//! Downloads the complete content catalog of an organization from the paged
//! content-discovery API and saves it as a single JSON document.
//!
//! ## Features
//!
//! - **URI Templates**: request paths rendered from `{name}` placeholders
//! - **Bounded Retries**: every page request retried with capped exponential backoff
//! - **Header-Driven Paging**: total count and paging request id learned from the first page
//! - **Fail-Fast**: a run either returns every record or an error, never a partial file
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use percipio_catalog::http::{HttpClient, RequestSpec, RetryPolicy};
//! use percipio_catalog::logging::TracingLogger;
//! use percipio_catalog::pagination::{Pager, PagerConfig};
//!
//! #[tokio::main]
//! async fn main() -> percipio_catalog::Result<()> {
//!     let logger = TracingLogger::shared();
//!     let pager = Pager::new(HttpClient::new(logger.clone())?, PagerConfig::new(1000), logger);
//!
//!     let spec = RequestSpec::new("https://api.example.com", "/content-discovery/v2/organizations/{orgId}/catalog-content")
//!         .path_param("orgId", "my-org")
//!         .bearer("token");
//!
//!     let outcome = pager.fetch_all(spec, &RetryPolicy::default()).await?;
//!     println!("{} records", outcome.records.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │    Config     │──▶│     Pager     │──▶│    Writer     │
//! │ YAML+env+CLI  │   │ offset/total  │   │  JSON file    │
//! └───────────────┘   └───────┬───────┘   └───────────────┘
//!                             │ one call per page
//!                     ┌───────┴───────┐
//!                     │ HttpClient    │
//!                     │ template+retry│
//!                     └───────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// URI template rendering
pub mod template;

/// Logger capability and subscriber setup
pub mod logging;

/// Request executor with retry
pub mod http;

/// Offset pager
pub mod pagination;

/// JSON document output
pub mod output;

/// Run configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, ErrorKind, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
