//! Operations module
//!
//! Omics list operations described as data instead of one hand-written
//! command each.
//!
//! # Overview
//!
//! - `OperationCatalog` / `OperationDefinition` - declarative YAML description
//!   of each list operation: route, parameters, paging fields
//! - `ListInvocation` - caller input, validated before any request is sent
//! - `OperationRequest` / `JsonPage` - the paging capabilities for catalog
//!   operations
//! - `HttpPageFetcher` - performs one page call over HTTP
//! - `execute` - runs a call through the paginator and shapes its output

mod catalog;
mod executor;
mod fetcher;
mod invocation;
mod request;
mod types;

pub use catalog::{
    builtin_catalog, load_catalog, load_catalog_from_str, lookup, path_placeholders,
    BUILTIN_CATALOG,
};
pub use executor::execute;
pub use fetcher::HttpPageFetcher;
pub use invocation::{ListInvocation, Selector};
pub use request::{JsonPage, OperationRequest};
pub use types::{
    OperationCatalog, OperationDefinition, ParamDefinition, ParamLocation, ParamType,
};

#[cfg(test)]
mod tests;
