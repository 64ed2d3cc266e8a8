use super::client::HttpClient;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use std::time::Duration;

/// [`HttpClient`] backed directly by a pooled `reqwest::Client`.
///
/// Cloning is cheap and shares the underlying pool.
#[derive(Debug, Clone, Default)]
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    /// Builds a client whose every request is bounded by `timeout`.
    /// A zero timeout disables the bound.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if !timeout.is_zero() {
            builder = builder.timeout(timeout);
        }
        Ok(Self(builder.build()?))
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.0.request(method, url)
    }

    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}
