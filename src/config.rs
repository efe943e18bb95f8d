//! Runtime settings
//!
//! Settings come from an optional YAML file, then environment variables,
//! then command-line flags. Every field has a default so an empty file (or
//! no file) is a valid configuration.

use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::operations::OperationDefinition;
use crate::pagination::{IterationMode, PaginationPolicy};
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding the region
pub const ENV_REGION: &str = "OMICS_PAGER_REGION";

/// Environment variable overriding the endpoint URL
pub const ENV_ENDPOINT_URL: &str = "OMICS_PAGER_ENDPOINT_URL";

/// Environment variable overriding the iteration mode
pub const ENV_ITERATION_MODE: &str = "OMICS_PAGER_ITERATION_MODE";

// ============================================================================
// Settings
// ============================================================================

/// Process-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// AWS region used to build service endpoints
    #[serde(default = "default_region")]
    pub region: String,

    /// Endpoint used for every operation instead of the regional one
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Whether continuation tokens are followed
    #[serde(default)]
    pub iteration_mode: IterationMode,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            region: default_region(),
            endpoint_url: None,
            iteration_mode: IterationMode::default(),
            http: HttpSettings::default(),
        }
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl Settings {
    /// Load settings from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings '{}'", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Parse settings from a YAML string; an empty document yields the defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply overrides from environment variables read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(region) = lookup(ENV_REGION).filter(|v| !v.trim().is_empty()) {
            self.region = region.trim().to_string();
        }
        if let Some(url) = lookup(ENV_ENDPOINT_URL).filter(|v| !v.trim().is_empty()) {
            self.endpoint_url = Some(url.trim().to_string());
        }
        if let Some(mode) = lookup(ENV_ITERATION_MODE).filter(|v| !v.trim().is_empty()) {
            self.iteration_mode = mode.parse()?;
        }
        self.validate()
    }

    /// Apply overrides from the process environment
    pub fn apply_process_env(&mut self) -> Result<()> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(Error::invalid_config("region", "cannot be empty"));
        }
        if let Some(url) = &self.endpoint_url {
            url::Url::parse(url)
                .map_err(|e| Error::invalid_config("endpoint_url", format!("{url}: {e}")))?;
        }
        if self.http.timeout_seconds == 0 {
            return Err(Error::invalid_config(
                "http.timeout_seconds",
                "must be greater than zero",
            ));
        }
        if self.http.backoff.initial_delay_ms > self.http.backoff.max_delay_ms {
            return Err(Error::invalid_config(
                "http.backoff",
                "initial_delay_ms cannot exceed max_delay_ms",
            ));
        }
        Ok(())
    }

    /// Base URL for an operation's service
    pub fn endpoint_for(&self, definition: &OperationDefinition) -> String {
        match &self.endpoint_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!(
                "https://{}-omics.{}.amazonaws.com",
                definition.endpoint_prefix, self.region
            ),
        }
    }

    /// HTTP client configuration rooted at `base_url`
    pub fn http_client_config(&self, base_url: impl Into<String>) -> HttpClientConfig {
        let http = &self.http;
        let mut builder = HttpClientConfig::builder()
            .base_url(base_url)
            .timeout(Duration::from_secs(http.timeout_seconds))
            .max_retries(http.max_retries)
            .backoff(
                http.backoff.backoff_type,
                Duration::from_millis(http.backoff.initial_delay_ms),
                Duration::from_millis(http.backoff.max_delay_ms),
            );

        builder = match &http.rate_limit {
            Some(limit) => builder.rate_limit(RateLimiterConfig::new(
                limit.requests_per_second,
                limit.burst_size,
            )),
            None => builder.no_rate_limit(),
        };
        for (key, value) in &http.headers {
            builder = builder.header(key, value);
        }
        if let Some(agent) = &http.user_agent {
            builder = builder.user_agent(agent);
        }
        builder.build()
    }

    /// Pagination policy for this process
    pub fn pagination_policy(&self) -> PaginationPolicy {
        PaginationPolicy::new(self.iteration_mode)
    }
}

// ============================================================================
// HTTP Settings
// ============================================================================

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff
    #[serde(default)]
    pub backoff: BackoffSettings,

    /// Client-side rate limit; `null` disables it
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<RateLimitSettings>,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            backoff: BackoffSettings::default(),
            rate_limit: default_rate_limit(),
            headers: BTreeMap::new(),
            user_agent: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_rate_limit() -> Option<RateLimitSettings> {
    Some(RateLimitSettings::default())
}

/// Backoff settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackoffSettings {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for BackoffSettings {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_initial_delay_ms() -> u64 {
    100
}

fn default_max_delay_ms() -> u64 {
    20_000
}

/// Rate limit settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitSettings {
    /// Requests per second
    #[serde(default = "default_rps")]
    pub requests_per_second: u32,

    /// Burst size
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            requests_per_second: default_rps(),
            burst_size: default_burst(),
        }
    }
}

fn default_rps() -> u32 {
    5
}

fn default_burst() -> u32 {
    5
}
