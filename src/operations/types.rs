//! Operation definition types
//!
//! The declarative description of a list operation, loaded from YAML.

use crate::types::Method;
use serde::{Deserialize, Serialize};

// ============================================================================
// Catalog
// ============================================================================

/// A set of operation definitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationCatalog {
    /// Kind of document (always "operations")
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Catalog format version
    #[serde(default = "default_version")]
    pub version: String,

    /// Service the operations belong to
    #[serde(default)]
    pub service: Option<String>,

    /// Operation definitions
    #[serde(default)]
    pub operations: Vec<OperationDefinition>,
}

fn default_kind() -> String {
    "operations".to_string()
}

fn default_version() -> String {
    "1.0".to_string()
}

impl OperationCatalog {
    /// Look up an operation by name, ignoring ASCII case
    pub fn get(&self, name: &str) -> Option<&OperationDefinition> {
        self.operations
            .iter()
            .find(|op| op.name.eq_ignore_ascii_case(name))
    }

    /// Number of operations
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the catalog has no operations
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

// ============================================================================
// Operation
// ============================================================================

/// One paged list operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDefinition {
    /// Operation name (e.g., "ListRuns")
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,

    /// Service host prefix (e.g., "workflows" for workflows-omics.<region>.amazonaws.com)
    pub endpoint_prefix: String,

    /// HTTP method
    #[serde(default)]
    pub method: Method,

    /// Route with `{param}` placeholders
    pub path: String,

    /// Query parameter carrying the continuation token on requests
    #[serde(default = "default_token_param")]
    pub token_param: String,

    /// Query parameter carrying the page-size hint
    #[serde(default = "default_max_results_param")]
    pub max_results_param: String,

    /// Response field holding the page's items
    pub items_field: String,

    /// Response field holding the continuation token
    #[serde(default = "default_next_token_field")]
    pub next_token_field: String,

    /// Parameter emitted by `--pass-thru`
    #[serde(default)]
    pub pass_thru: Option<String>,

    /// Operation parameters
    #[serde(default)]
    pub params: Vec<ParamDefinition>,
}

fn default_token_param() -> String {
    "nextToken".to_string()
}

fn default_max_results_param() -> String {
    "maxResults".to_string()
}

fn default_next_token_field() -> String {
    "nextToken".to_string()
}

impl OperationDefinition {
    /// Find a parameter by exact name
    pub fn param(&self, name: &str) -> Option<&ParamDefinition> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Parameters that must be supplied
    pub fn required_params(&self) -> impl Iterator<Item = &ParamDefinition> {
        self.params.iter().filter(|p| p.required)
    }

    /// Parameters placed at the given location
    pub fn params_at(&self, location: ParamLocation) -> impl Iterator<Item = &ParamDefinition> {
        self.params.iter().filter(move |p| p.location == location)
    }
}

/// An operation parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDefinition {
    /// Wire name
    pub name: String,

    /// Where the parameter goes on the wire
    #[serde(default)]
    pub location: ParamLocation,

    /// Whether the parameter must be supplied
    #[serde(default)]
    pub required: bool,

    /// How the supplied text is interpreted
    #[serde(rename = "type", default)]
    pub param_type: ParamType,
}

/// Where a parameter is placed in the HTTP request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamLocation {
    /// Substituted into the route
    Path,
    /// Query string
    #[default]
    Query,
    /// Member of the JSON body
    Body,
}

/// How a parameter value supplied as text is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    /// Sent as a string
    #[default]
    String,
    /// Parsed as JSON (objects, lists, numbers)
    Json,
}
