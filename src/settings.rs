//! Process-wide application settings.
//!
//! [`SettingsStore`] publishes whole [`AppSettings`] snapshots over a
//! `tokio::sync::watch` channel. Readers clone the current snapshot once per
//! client acquisition and never observe a half-applied update.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::watch;

/// Env var holding the base-address override.
pub const BASE_URL_ENV: &str = "API_BASE_URL";

/// Stored on disk as a JSON object, e.g. `{"base_url_server": "http://localhost:8000"}`.
/// Missing fields fall back to their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Server address override. Empty means "keep the client default".
    pub base_url_server: String,
}

impl AppSettings {
    pub fn new(base_url_server: impl Into<String>) -> Self {
        Self {
            base_url_server: base_url_server.into(),
        }
    }

    /// Reads `API_BASE_URL`; missing is treated as no override.
    pub fn from_env() -> Self {
        Self::new(std::env::var(BASE_URL_ENV).unwrap_or_default())
    }

    /// Loads settings from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
        let settings = serde_json::from_str(&content)
            .with_context(|| format!("invalid settings file '{}'", path.display()))?;
        Ok(settings)
    }

    /// Returns the override, if one is set.
    pub fn base_url_override(&self) -> Option<&str> {
        let trimmed = self.base_url_server.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

#[derive(Debug)]
pub struct SettingsStore {
    tx: watch::Sender<AppSettings>,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(AppSettings::default())
    }
}

impl SettingsStore {
    pub fn new(initial: AppSettings) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn snapshot(&self) -> AppSettings {
        self.tx.borrow().clone()
    }

    pub fn set_base_url(&self, base_url: impl Into<String>) {
        let base_url = base_url.into();
        self.tx.send_modify(|s| s.base_url_server = base_url);
    }

    pub fn replace(&self, settings: AppSettings) -> AppSettings {
        self.tx.send_replace(settings)
    }

    /// Receiver notified on every published change.
    pub fn subscribe(&self) -> watch::Receiver<AppSettings> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_override_is_none() {
        assert_eq!(AppSettings::default().base_url_override(), None);
        assert_eq!(AppSettings::new("   ").base_url_override(), None);
        assert_eq!(
            AppSettings::new(" http://api.local ").base_url_override(),
            Some("http://api.local")
        );
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(name)
    }

    #[test]
    fn test_load_reads_json_file() {
        let path = temp_path("request_hook_test_settings.json");
        std::fs::write(&path, r#"{"base_url_server": "http://api.local:8000"}"#).unwrap();

        let settings = AppSettings::load(&path).unwrap();
        assert_eq!(settings.base_url_override(), Some("http://api.local:8000"));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_defaults_missing_fields() {
        let path = temp_path("request_hook_test_settings_empty.json");
        std::fs::write(&path, "{}").unwrap();

        assert_eq!(AppSettings::load(&path).unwrap(), AppSettings::default());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let path = temp_path("request_hook_test_settings_bad.json");
        std::fs::write(&path, "base_url_server=nope").unwrap();

        assert!(AppSettings::load(&path).is_err());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_set_base_url_updates_snapshot() {
        let store = SettingsStore::default();
        let before = store.snapshot();
        store.set_base_url("http://api.local");

        assert_eq!(before.base_url_server, "");
        assert_eq!(store.snapshot().base_url_server, "http://api.local");
    }

    #[tokio::test]
    async fn test_subscribers_see_replacement() {
        let store = SettingsStore::default();
        let mut rx = store.subscribe();

        let previous = store.replace(AppSettings::new("http://other"));
        rx.changed().await.unwrap();

        assert_eq!(previous, AppSettings::default());
        assert_eq!(rx.borrow().base_url_server, "http://other");
    }
}
