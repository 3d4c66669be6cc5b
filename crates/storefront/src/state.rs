//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::BackendClient;
use crate::config::StorefrontConfig;
use crate::services::{AuthService, CartMirror};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// backend client, the cart mirror worker and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: BackendClient,
    mirror: CartMirror,
}

impl AppState {
    /// Create a new application state and start the cart mirror worker.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let backend = BackendClient::new(config.backends.clone(), config.catalog_cache_ttl);
        let mirror = CartMirror::spawn(backend.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                mirror,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend services client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Get a reference to the cart mirror handle.
    #[must_use]
    pub fn mirror(&self) -> &CartMirror {
        &self.inner.mirror
    }

    /// Authentication service over this state's backend and test account.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(&self.inner.backend, self.inner.config.test_login.as_ref())
    }
}
