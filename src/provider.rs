//! HTTP client provider.
//!
//! [`ClientProvider`] owns one transport (and therefore one connection pool)
//! and hands out [`ApiClient`] values bound to a base address. The
//! base-address override from [`AppSettings`] is applied to the returned
//! value; the shared transport is never reconfigured.

use anyhow::Result;
use reqwest::multipart::Form;
use reqwest::{Method, Url};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::warn;

use crate::config::ClientConfig;
use crate::error::RequestError;
use crate::fetch::{BasicClient, HttpClient, send_json};
use crate::settings::AppSettings;

pub struct ClientProvider<C = BasicClient> {
    transport: Arc<C>,
    config: ClientConfig,
}

impl ClientProvider<BasicClient> {
    /// Builds the shared reqwest client with `config.timeout`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = BasicClient::with_timeout(config.timeout)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<C: HttpClient> ClientProvider<C> {
    /// Uses a caller-supplied transport. `config.timeout` is not applied to
    /// it; the transport is expected to carry its own.
    pub fn with_transport(config: ClientConfig, transport: C) -> Self {
        Self {
            transport: Arc::new(transport),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns a client for the current settings snapshot.
    ///
    /// A non-empty `base_url_server` replaces the configured base address.
    /// An override that does not parse is logged and ignored.
    pub fn get_client(&self, settings: &AppSettings) -> ApiClient<C> {
        let base_url = match settings.base_url_override() {
            Some(raw) => match Url::parse(raw) {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!(base_url = raw, error = %e, "Ignoring unparsable base url override");
                    self.config.base_url.clone()
                }
            },
            None => self.config.base_url.clone(),
        };

        ApiClient {
            transport: Arc::clone(&self.transport),
            base_url,
            default_query: self.config.default_query.clone(),
        }
    }
}

/// A client bound to one base address.
pub struct ApiClient<C = BasicClient> {
    transport: Arc<C>,
    base_url: Option<Url>,
    default_query: Vec<(String, String)>,
}

impl<C> Clone for ApiClient<C> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            base_url: self.base_url.clone(),
            default_query: self.default_query.clone(),
        }
    }
}

impl<C: HttpClient> ApiClient<C> {
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Joins `path` onto the base address.
    ///
    /// Paths starting with `scheme://` are parsed as-is; everything else,
    /// including `items:1`, is relative. Slashes at the seam are collapsed so
    /// `http://h/api` + `/items` gives `http://h/api/items`.
    pub fn resolve(&self, path: &str) -> Result<Url, RequestError> {
        if has_scheme(path) {
            return Url::parse(path).map_err(|e| RequestError::InvalidUrl(format!("{path}: {e}")));
        }

        let base = self.base_url.as_ref().ok_or_else(|| {
            RequestError::InvalidUrl(format!("relative path '{path}' with no base address"))
        })?;

        let joined = format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| RequestError::InvalidUrl(format!("{joined}: {e}")))
    }

    /// GET `path` with the default query followed by `params`.
    #[tracing::instrument(skip(self, params), fields(param_count = params.len()))]
    pub async fn get(&self, path: &str, params: &Map<String, Value>) -> Result<Value, RequestError> {
        let url = self.resolve(path)?;

        let mut query = self.default_query.clone();
        query.extend(form_pairs(params));

        let req = self
            .transport
            .request(Method::GET, url)
            .query(&query)
            .build()?;
        send_json(self.transport.as_ref(), req).await
    }

    /// POST `path` with `body` encoded as `multipart/form-data`.
    #[tracing::instrument(skip(self, body), fields(field_count = body.len()))]
    pub async fn post_multipart(
        &self,
        path: &str,
        body: &Map<String, Value>,
    ) -> Result<Value, RequestError> {
        let url = self.resolve(path)?;

        let req = self
            .transport
            .request(Method::POST, url)
            .multipart(multipart_form(body))
            .build()?;
        send_json(self.transport.as_ref(), req).await
    }
}

/// True for `scheme://...`, where scheme is a letter followed by letters,
/// digits, `+`, `-` or `.`.
fn has_scheme(path: &str) -> bool {
    let Some((scheme, _)) = path.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Flattens a JSON object into form/query pairs.
///
/// Strings are sent as-is, nulls are skipped, arrays repeat the key as
/// `key[]`, and everything else is sent as its JSON text.
pub fn form_pairs(map: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                let array_key = format!("{key}[]");
                for item in items.iter().filter(|v| !v.is_null()) {
                    pairs.push((array_key.clone(), scalar_text(item)));
                }
            }
            other => pairs.push((key.clone(), scalar_text(other))),
        }
    }
    pairs
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn multipart_form(body: &Map<String, Value>) -> Form {
    form_pairs(body)
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider(base: Option<&str>) -> ClientProvider {
        let mut config = ClientConfig::default();
        if let Some(base) = base {
            config = config.with_base_url(base).unwrap();
        }
        ClientProvider::new(config).unwrap()
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_provider_exposes_its_config() {
        let config = ClientConfig::default().with_timeout(std::time::Duration::ZERO);
        let p = ClientProvider::new(config.clone()).unwrap();
        assert_eq!(p.config(), &config);
    }

    #[test]
    fn test_get_client_keeps_default_without_override() {
        let client = provider(Some("http://default.local")).get_client(&AppSettings::default());
        assert_eq!(client.base_url().unwrap().as_str(), "http://default.local/");
    }

    #[test]
    fn test_get_client_applies_override() {
        let p = provider(Some("http://default.local"));
        let client = p.get_client(&AppSettings::new("http://override.local:9000"));
        assert_eq!(client.base_url().unwrap().as_str(), "http://override.local:9000/");

        // The provider itself is untouched.
        let again = p.get_client(&AppSettings::default());
        assert_eq!(again.base_url().unwrap().as_str(), "http://default.local/");
    }

    #[test]
    fn test_get_client_ignores_unparsable_override() {
        let client = provider(None).get_client(&AppSettings::new("not a url"));
        assert!(client.base_url().is_none());
    }

    #[test]
    fn test_resolve_joins_without_double_slash() {
        let client = provider(Some("http://h.local/api/")).get_client(&AppSettings::default());
        assert_eq!(
            client.resolve("/items").unwrap().as_str(),
            "http://h.local/api/items"
        );
        assert_eq!(
            client.resolve("items").unwrap().as_str(),
            "http://h.local/api/items"
        );
    }

    #[test]
    fn test_resolve_passes_absolute_urls_through() {
        let client = provider(Some("http://h.local")).get_client(&AppSettings::default());
        assert_eq!(
            client.resolve("https://elsewhere.local/x").unwrap().as_str(),
            "https://elsewhere.local/x"
        );
    }

    #[test]
    fn test_resolve_treats_colon_paths_as_relative() {
        let client = provider(Some("http://h.local:8000")).get_client(&AppSettings::default());
        assert_eq!(
            client.resolve("items:1").unwrap().as_str(),
            "http://h.local:8000/items:1"
        );
        assert_eq!(
            client.resolve("localhost:8000/x").unwrap().as_str(),
            "http://h.local:8000/localhost:8000/x"
        );
        assert_eq!(
            client.resolve("/search?q=a://b").unwrap().as_str(),
            "http://h.local:8000/search?q=a://b"
        );
    }

    #[test]
    fn test_resolve_relative_without_base_fails() {
        let client = provider(None).get_client(&AppSettings::default());
        let err = client.resolve("/items").unwrap_err();
        assert!(matches!(err, RequestError::InvalidUrl(_)));
    }

    #[test]
    fn test_form_pairs_rendering() {
        let pairs = form_pairs(&object(json!({
            "title": "x",
            "price": 20,
            "missing": null,
            "tags": ["a", 2],
            "meta": {"k": true}
        })));

        assert!(pairs.contains(&("title".to_string(), "x".to_string())));
        assert!(pairs.contains(&("price".to_string(), "20".to_string())));
        assert!(pairs.contains(&("tags[]".to_string(), "a".to_string())));
        assert!(pairs.contains(&("tags[]".to_string(), "2".to_string())));
        assert!(pairs.contains(&("meta".to_string(), r#"{"k":true}"#.to_string())));
        assert!(!pairs.iter().any(|(k, _)| k == "missing"));
        assert_eq!(pairs.len(), 5);
    }
}
