//! Error types for omics-pager
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for omics-pager
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Invocation Errors (raised before any remote call)
    // ============================================================================
    #[error("Unknown operation: {name}")]
    UnknownOperation { name: String },

    #[error("{operation}: missing required parameter '{parameter}'")]
    MissingParameter { operation: String, parameter: String },

    #[error("{operation}: invalid parameter '{parameter}': {message}")]
    InvalidParameter {
        operation: String,
        parameter: String,
        message: String,
    },

    #[error("Parameters '{first}' and '{second}' cannot be used together")]
    ConflictingParameters { first: String, second: String },

    #[error("{operation}: invalid selector '{selector}' (expected '*', '^<parameter>' or '{items_field}')")]
    InvalidSelector {
        operation: String,
        selector: String,
        items_field: String,
    },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Service error {code} (HTTP {status}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Could not resolve host '{host}'; check the region and endpoint settings ({message})")]
    NameResolution { host: String, message: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Max retries ({max_retries}) exceeded")]
    MaxRetriesExceeded { max_retries: u32 },

    #[error("Request cancelled")]
    Cancelled,

    // ============================================================================
    // Pagination Errors
    // ============================================================================
    #[error("{operation} failed: {source}")]
    Page {
        operation: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a missing parameter error
    pub fn missing_parameter(operation: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self::MissingParameter {
            operation: operation.into(),
            parameter: parameter.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        operation: impl Into<String>,
        parameter: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            operation: operation.into(),
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a conflicting parameters error
    pub fn conflicting(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self::ConflictingParameters {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Wrap a remote failure with the operation it happened in
    pub fn page(operation: impl Into<String>, source: Error) -> Self {
        Self::Page {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Returns true for errors raised by local validation, before any remote call
    pub fn is_invocation_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownOperation { .. }
                | Error::MissingParameter { .. }
                | Error::InvalidParameter { .. }
                | Error::ConflictingParameters { .. }
                | Error::InvalidSelector { .. }
        )
    }

    /// The innermost error, looking through `Page` wrappers
    pub fn root(&self) -> &Error {
        match self {
            Error::Page { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether the call was abandoned on a cancellation signal
    pub fn is_cancelled(&self) -> bool {
        matches!(self.root(), Error::Cancelled)
    }
}

/// Result type alias for omics-pager
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
