//! REST clients for the backend services.
//!
//! # Architecture
//!
//! - One [`BackendClient`] holds the HTTP client, the base URL of every
//!   service, and the catalog cache
//! - Each service gets its own `impl BackendClient` block in a submodule
//! - Catalog responses are cached in-process via `moka`; nothing else is
//!
//! # Services
//!
//! - `auth` - credential check and signup
//! - `catalog` - products (cached)
//! - `cart` - the persisted copy of a user's cart, keyed by email
//! - `payment` - charge processing and payment history
//! - `contact` - contact messages, editable through a token
//! - `reviews` - product reviews and statistics

mod auth;
mod cart;
mod catalog;
mod contact;
mod payment;
mod reviews;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::Response;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::BackendUrls;

pub use catalog::{CacheKey, CacheValue};
pub use types::*;

/// Longest backend error body kept in an error message.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Errors that can occur when calling a backend service.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection refused, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl BackendError {
    /// Whether the service itself is unreachable or failing.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Parse(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::NotFound(_) => false,
        }
    }
}

/// Which backend service a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Auth,
    Catalog,
    Commerce,
    Engagement,
}

/// Client for the backend REST services.
///
/// Cheap to clone. Catalog lookups are cached for the configured TTL.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    urls: BackendUrls,
    cache: Cache<CacheKey, CacheValue>,
}

impl BackendClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(urls: BackendUrls, catalog_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(catalog_ttl)
            .build();

        Self {
            inner: Arc::new(BackendClientInner {
                client: reqwest::Client::new(),
                urls,
                cache,
            }),
        }
    }

    /// Base URLs this client talks to.
    #[must_use]
    pub fn urls(&self) -> &BackendUrls {
        &self.inner.urls
    }

    fn http(&self) -> &reqwest::Client {
        &self.inner.client
    }

    fn cache(&self) -> &Cache<CacheKey, CacheValue> {
        &self.inner.cache
    }

    /// Absolute URL for `path` on `service`.
    fn url(&self, service: Service, path: &str) -> String {
        let base: &Url = match service {
            Service::Auth => &self.inner.urls.auth,
            Service::Catalog => &self.inner.urls.catalog,
            Service::Commerce => &self.inner.urls.commerce,
            Service::Engagement => &self.inner.urls.engagement,
        };
        format!("{}{path}", base.as_str().trim_end_matches('/'))
    }
}

// =============================================================================
// Response helpers
// =============================================================================

/// Fail on a non-success status, keeping the service's message.
async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(
        status = %status,
        body = %body.chars().take(500).collect::<String>(),
        "Backend returned non-success status"
    );
    Err(BackendError::Api {
        status: status.as_u16(),
        message: error_message(&body, status.canonical_reason().unwrap_or("request failed")),
    })
}

/// Check the status and decode a JSON body.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let response = check_status(response).await?;
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %text.chars().take(500).collect::<String>(),
            "Failed to parse backend response"
        );
        BackendError::Parse(e.to_string())
    })
}

/// Pull a human-readable message out of an error body.
///
/// Services answer either `{"message": ...}`, `{"error": ...}` or plain text.
fn error_message(body: &str, fallback: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error", "errorMessage"] {
            if let Some(serde_json::Value::String(message)) = map.get(key)
                && !message.trim().is_empty()
            {
                return message.clone();
            }
        }
    }

    let body = body.trim();
    if body.is_empty() {
        fallback.to_string()
    } else {
        body.chars().take(MAX_ERROR_BODY_CHARS).collect()
    }
}
