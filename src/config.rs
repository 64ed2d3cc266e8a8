//! Client configuration.
//!
//! [`ClientConfig`] is an immutable value handed to
//! [`ClientProvider::new`](crate::provider::ClientProvider::new). Environment
//! lookups are done once, by the caller, through [`ClientConfig::from_env`].

use anyhow::{Context, Result};
use reqwest::Url;
use std::time::Duration;

/// Timeout applied to every request unless overridden.
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Env var holding the request timeout in milliseconds.
pub const TIMEOUT_ENV: &str = "API_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base address used when the settings store carries no override.
    pub base_url: Option<Url>,
    pub timeout: Duration,
    /// Query parameters sent ahead of the per-call ones on every GET.
    pub default_query: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: REQUEST_TIMEOUT,
            default_query: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Defaults, with the timeout taken from `API_TIMEOUT_MS` when set
    /// (`0` disables it).
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            let millis: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("{TIMEOUT_ENV} must be an integer, got '{raw}'"))?;
            config.timeout = Duration::from_millis(millis);
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url).with_context(|| format!("invalid base url '{base_url}'"))?;
        self.base_url = Some(url);
        Ok(self)
    }

    /// A zero timeout means requests are never cut off.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_default_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_query.push((key.into(), value.into()));
        self
    }
}
