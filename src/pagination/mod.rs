//! Pagination module
//!
//! Drives paged list operations: fetch a page, emit its items, follow the
//! continuation token, stop at the last page.
//!
//! # Overview
//!
//! A list operation is described by three capabilities: a [`PagedRequest`]
//! that carries the continuation token, a [`PagedResponse`] that yields the
//! page's items and the next token, and a [`PageFetcher`] that performs the
//! remote call. [`paginate`] pushes output into a sink as pages arrive;
//! [`item_stream`] offers the same walk as a lazily pulled stream.
//!
//! Whether tokens are followed is decided per call ([`ListOptions`]) and per
//! process ([`PaginationPolicy`]). Either one can restrict a call to a single
//! page; a caller-supplied starting token does too.

mod paginator;
mod stream;
mod types;

pub use paginator::paginate;
pub use stream::item_stream;
pub use types::{
    IterationMode, IterationState, ListOptions, ListOutput, PageFetcher, PageItem, PagedRequest,
    PagedResponse, PaginationPolicy, PaginationSummary, ResponseSelection,
};
