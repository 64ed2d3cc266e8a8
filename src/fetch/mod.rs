mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use serde_json::Value;
use tracing::debug;

use crate::error::RequestError;

/// Sends `req` through `client` and decodes the response body as JSON.
///
/// Non-2xx statuses become [`RequestError::Status`]. An empty body on a
/// successful response decodes to `Value::Null`.
pub async fn send_json<C: HttpClient + ?Sized>(
    client: &C,
    req: reqwest::Request,
) -> Result<Value, RequestError> {
    let method = req.method().clone();
    let url = req.url().clone();

    let resp = client.execute(req).await?;
    let status = resp.status();
    let body = resp.text().await?;
    debug!(%method, %url, status = status.as_u16(), bytes = body.len(), "Response received");

    if !status.is_success() {
        return Err(RequestError::Status {
            status: status.as_u16(),
            body,
        });
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&body).map_err(|e| RequestError::Decode(e.to_string()))
}
