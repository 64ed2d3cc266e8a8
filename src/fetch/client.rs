use async_trait::async_trait;
use reqwest::{Method, Request, RequestBuilder, Response, Url};

/// Transport seam used by [`ApiClient`](crate::provider::ApiClient).
///
/// `request` hands out a builder tied to the implementor's connection pool so
/// bodies like multipart forms can be encoded by reqwest; `execute` sends the
/// finished request.
#[async_trait]
pub trait HttpClient: Send + Sync {
    fn request(&self, method: Method, url: Url) -> RequestBuilder;

    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
