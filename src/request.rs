//! Loading/data wrapper over GET and POST calls.
//!
//! A [`Requester`] tracks whether any of its calls is outstanding and keeps
//! the payload of the most recently settled successful call. Overlapping
//! calls are allowed: loading stays true until the last one settles, and the
//! stored payload is whichever success settled last.

use serde_json::{Map, Value};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{error, info};

use crate::error::RequestError;
use crate::fetch::{BasicClient, HttpClient};
use crate::provider::{ApiClient, ClientProvider};
use crate::settings::SettingsStore;

pub struct Requester<C = BasicClient> {
    provider: Arc<ClientProvider<C>>,
    settings: Arc<SettingsStore>,
    in_flight: AtomicUsize,
    data: Mutex<Option<Value>>,
}

/// Decrements the outstanding-call count when dropped, so the count is
/// restored on success, failure, and cancellation alike.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<C: HttpClient> Requester<C> {
    pub fn new(provider: Arc<ClientProvider<C>>, settings: Arc<SettingsStore>) -> Self {
        Self {
            provider,
            settings,
            in_flight: AtomicUsize::new(0),
            data: Mutex::new(None),
        }
    }

    /// True while at least one call issued by this requester is unsettled.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Payload of the last successful call, if any.
    pub fn data(&self) -> Option<Value> {
        self.data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// GET `path` with `params` as query parameters.
    ///
    /// Failures are logged and reported as `None`; the stored payload is
    /// left as it was.
    pub async fn fetch_get(&self, path: &str, params: &Map<String, Value>) -> Option<Value> {
        self.try_get(path, params).await.ok()
    }

    /// POST `path` with `body` as multipart form data.
    ///
    /// Failures are logged and reported as `None`.
    pub async fn submit_post(&self, path: &str, body: &Map<String, Value>) -> Option<Value> {
        self.try_post(path, body).await.ok()
    }

    /// Like [`fetch_get`](Self::fetch_get) but returns the failure reason.
    pub async fn try_get(
        &self,
        path: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, RequestError> {
        self.run("GET", path, |client| async move { client.get(path, params).await })
            .await
    }

    /// Like [`submit_post`](Self::submit_post) but returns the failure reason.
    pub async fn try_post(
        &self,
        path: &str,
        body: &Map<String, Value>,
    ) -> Result<Value, RequestError> {
        self.run("POST", path, |client| async move {
            client.post_multipart(path, body).await
        })
        .await
    }

    async fn run<F, Fut>(&self, method: &'static str, path: &str, call: F) -> Result<Value, RequestError>
    where
        F: FnOnce(ApiClient<C>) -> Fut,
        Fut: Future<Output = Result<Value, RequestError>>,
    {
        let _in_flight = InFlight::enter(&self.in_flight);

        let client = self.provider.get_client(&self.settings.snapshot());
        let result = call(client).await;

        match &result {
            Ok(payload) => {
                *self.data.lock().unwrap_or_else(PoisonError::into_inner) = Some(payload.clone());
                info!(method, path, "Request succeeded");
            }
            Err(e) => {
                error!(method, path, kind = e.kind(), error = %e, "Request failed");
            }
        }

        result
    }
}
