// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # omics-pager
//!
//! Paginated list calls for AWS Omics.
//!
//! Every Omics `List*` operation returns results a page at a time with a
//! continuation token. This crate drives those operations: it follows the
//! token until the service stops returning one, flattens the pages into a
//! single sequence of items, and lets the caller take over paging
//! (`next_token`, `no_auto_iteration`) or switch it off process-wide
//! ([`pagination::PaginationPolicy`]).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use omics_pager::config::Settings;
//! use omics_pager::http::HttpClient;
//! use omics_pager::operations::{builtin_catalog, execute, lookup, HttpPageFetcher, ListInvocation};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> omics_pager::Result<()> {
//!     let settings = Settings::default();
//!     let catalog = builtin_catalog()?;
//!     let op = lookup(&catalog, "ListReadSets")?;
//!
//!     let client = HttpClient::with_config(settings.http_client_config(settings.endpoint_for(op)))?;
//!     let fetcher = HttpPageFetcher::new(client, op.clone());
//!     let invocation = ListInvocation::new().param("sequenceStoreId", "1234567890");
//!
//!     execute(op, &invocation, &fetcher, &settings.pagination_policy(), &CancellationToken::new(), |item| {
//!         println!("{item}");
//!         Ok(())
//!     })
//!     .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          CLI (list)                             │
//! │  settings + catalog → ListInvocation → execute → JSON lines     │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴───────────────┬──────────────────┐
//! │  Operations  │          Pagination           │       HTTP       │
//! ├──────────────┼───────────────────────────────┼──────────────────┤
//! │ Catalog      │ paginate (push to sink)       │ Retry, backoff   │
//! │ Request      │ item_stream (lazy pull)       │ Rate limit       │
//! │ Selector     │ PaginationPolicy              │ Service errors   │
//! └──────────────┴───────────────────────────────┴──────────────────┘
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

/// HTTP client with retry and rate limiting
pub mod http;

/// Generic paginated list loop
pub mod pagination;

/// Operation catalog, requests and execution
pub mod operations;

/// Runtime settings
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::Settings;
pub use operations::{builtin_catalog, execute, lookup, HttpPageFetcher, ListInvocation};
pub use pagination::{
    item_stream, paginate, IterationMode, ListOptions, PageFetcher, PaginationPolicy,
    PaginationSummary,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
