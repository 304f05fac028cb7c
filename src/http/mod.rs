//! HTTP request executor module
//!
//! Turns a [`RequestSpec`] into one HTTP call and retries it under a
//! [`RetryPolicy`].
//!
//! # Features
//!
//! - **URI Templates**: `{name}` placeholders filled from path parameters
//! - **Null Stripping**: `null` query parameters and body members are never sent
//! - **Bounded Retries**: at most `max_retries + 1` attempts with capped backoff
//! - **Bearer Authentication**: token sent on every attempt

mod client;

pub use client::{
    ApiResponse, HttpClient, RequestExecutor, RequestSpec, RetryPolicy, DEFAULT_TIMEOUT,
};
