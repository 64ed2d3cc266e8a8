//! Loading/data request wrapper over a shared, configurable HTTP client.
//!
//! [`ClientProvider`] hands out [`ApiClient`]s bound to a base address and a
//! fixed timeout; [`Requester`] wraps their GET and multipart POST calls with
//! a loading flag and a last-payload slot.

pub mod config;
pub mod error;
pub mod fetch;
pub mod provider;
pub mod request;
pub mod settings;

pub use config::ClientConfig;
pub use error::RequestError;
pub use fetch::{BasicClient, HttpClient};
pub use provider::{ApiClient, ClientProvider};
pub use request::Requester;
pub use settings::{AppSettings, SettingsStore};
