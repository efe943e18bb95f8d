//! Pagination types and traits
//!
//! Defines the request/response capabilities a paged operation exposes, the
//! policy and per-call options that decide whether continuation tokens are
//! followed, and the state carried across one paginated call.

use crate::error::{Error, Result};
use crate::types::OptionStringExt;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A request that can carry a continuation token
pub trait PagedRequest {
    /// Continuation token currently set on the request
    fn token(&self) -> Option<&str>;

    /// Replace the continuation token (None for "first page")
    fn set_token(&mut self, token: Option<String>);

    /// Page-size hint, passed to the service as-is
    fn max_results(&self) -> Option<u32>;
}

/// One page returned by a paged operation
pub trait PagedResponse {
    /// Element type of the page's result collection
    type Item;

    /// Continuation token; None or empty means this was the last page
    fn next_token(&self) -> Option<&str>;

    /// Move the page's items out, in the order the service returned them
    fn take_items(&mut self) -> Vec<Self::Item>;
}

/// Performs one remote call for a paged operation
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Request type sent for every page
    type Request: PagedRequest + Send + Sync;
    /// Response type returned for every page
    type Response: PagedResponse + Send;

    /// Fetch the page selected by the request's current token
    async fn fetch_page(&self, request: &Self::Request) -> Result<Self::Response>;
}

/// Item type produced by a fetcher's pages
pub type PageItem<F> = <<F as PageFetcher>::Response as PagedResponse>::Item;

// ============================================================================
// Policy and options
// ============================================================================

/// Whether continuation tokens are followed automatically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IterationMode {
    /// Follow continuation tokens until the last page
    #[default]
    Auto,
    /// Fetch a single page per call, like older releases of the tooling did
    #[serde(alias = "legacy")]
    SinglePage,
}

impl fmt::Display for IterationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::SinglePage => f.write_str("single-page"),
        }
    }
}

impl FromStr for IterationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "single-page" | "single_page" | "legacy" => Ok(Self::SinglePage),
            other => Err(Error::invalid_config(
                "iteration_mode",
                format!("expected 'auto' or 'single-page', got '{other}'"),
            )),
        }
    }
}

/// Process-level pagination behaviour, passed explicitly into every call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaginationPolicy {
    /// Iteration mode
    pub mode: IterationMode,
}

impl PaginationPolicy {
    /// Create a policy with the given mode
    pub fn new(mode: IterationMode) -> Self {
        Self { mode }
    }

    /// Policy that never follows continuation tokens
    pub fn single_page() -> Self {
        Self::new(IterationMode::SinglePage)
    }

    /// Whether continuation tokens may be followed at all
    pub fn auto_iterate(&self) -> bool {
        self.mode == IterationMode::Auto
    }
}

/// What a paginated call emits to its sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseSelection {
    /// Each page's items, as soon as the page arrives
    #[default]
    Items,
    /// The last raw page, once the loop has finished
    RawResponse,
}

/// Per-call options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListOptions {
    /// Caller asked for exactly one page
    pub no_auto_iteration: bool,
    /// What to emit
    pub selection: ResponseSelection,
}

impl ListOptions {
    /// Options emitting items with auto-iteration left to the policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a single page regardless of policy
    #[must_use]
    pub fn no_auto_iteration(mut self) -> Self {
        self.no_auto_iteration = true;
        self
    }

    /// Set what is emitted
    #[must_use]
    pub fn with_selection(mut self, selection: ResponseSelection) -> Self {
        self.selection = selection;
        self
    }
}

/// Envelope handed to the sink
#[derive(Debug, Clone, PartialEq)]
pub enum ListOutput<I, R> {
    /// Items of one page, in service order
    Items(Vec<I>),
    /// A full page
    RawResponse(R),
}

// ============================================================================
// State
// ============================================================================

/// Tracks one paginated call from its first fetch to termination
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IterationState {
    /// Token the next fetch will send
    pub current_token: Option<String>,
    /// Caller supplied a starting token or disabled auto-iteration
    pub user_controlling_paging: bool,
    /// Policy allows following tokens
    pub auto_iterate: bool,
    /// Pages fetched so far
    pub pages_fetched: u32,
    /// Items handed to the sink so far
    pub items_emitted: u64,
    /// Loop stopped on a cancellation signal
    pub cancelled: bool,
}

impl IterationState {
    /// Create the state for a new call.
    ///
    /// A starting token counts as caller control whenever one was supplied,
    /// even an empty one; an empty token is still sent as "no token".
    pub fn new(
        starting_token: Option<&str>,
        no_auto_iteration: bool,
        policy: &PaginationPolicy,
    ) -> Self {
        Self {
            current_token: starting_token.map(String::from).none_if_empty(),
            user_controlling_paging: no_auto_iteration || starting_token.is_some(),
            auto_iterate: policy.auto_iterate(),
            ..Default::default()
        }
    }

    /// Record a fetched page and its continuation token
    pub fn record_page(&mut self, next_token: Option<&str>) {
        self.pages_fetched += 1;
        self.current_token = next_token.map(String::from).none_if_empty();
    }

    /// Add to the number of emitted items
    pub fn add_emitted(&mut self, count: usize) {
        self.items_emitted += count as u64;
    }

    /// Whether another page should be fetched.
    ///
    /// Before the first fetch this is always true.
    pub fn should_continue(&self) -> bool {
        if self.cancelled {
            return false;
        }
        if self.pages_fetched == 0 {
            return true;
        }
        !self.user_controlling_paging && self.auto_iterate && self.current_token.is_some()
    }

    /// Mark the call as cancelled
    pub fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    /// Condense the final state into a summary
    pub fn into_summary(self) -> PaginationSummary {
        PaginationSummary {
            pages_fetched: self.pages_fetched,
            items_emitted: self.items_emitted,
            next_token: self.current_token,
            cancelled: self.cancelled,
        }
    }
}

/// Outcome of a paginated call that did not fail
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaginationSummary {
    /// Pages fetched
    pub pages_fetched: u32,
    /// Items handed to the sink
    pub items_emitted: u64,
    /// Token to resume from, when the loop stopped before the last page
    pub next_token: Option<String>,
    /// Loop stopped on a cancellation signal
    pub cancelled: bool,
}

impl PaginationSummary {
    /// More pages exist beyond what was fetched
    pub fn has_more(&self) -> bool {
        self.next_token.is_some()
    }
}
