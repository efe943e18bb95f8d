//! HTTP client module
//!
//! The transport beneath every page fetch.
//!
//! # Features
//!
//! - **Automatic Retries**: 5xx, timeouts and connection errors, with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Service Errors**: AWS REST-JSON error bodies mapped to `Error::Service`
//! - **Name Resolution**: DNS failures reported with the host that failed

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
