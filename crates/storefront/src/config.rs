//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `BACKEND_AUTH_URL` - Auth service (default: <http://localhost:8081>)
//! - `BACKEND_CATALOG_URL` - Product catalog (default: <http://localhost:8081>)
//! - `BACKEND_COMMERCE_URL` - Cart and payment service (default: <http://localhost:8080>)
//! - `BACKEND_ENGAGEMENT_URL` - Contact and review service (default: <http://localhost:8082>)
//! - `STOREFRONT_CATALOG_CACHE_TTL_SECS` - Catalog cache lifetime (default: 300)
//! - `STOREFRONT_BUY_NOW_POLICY` - `add-to-cart` (default) or `isolated`
//! - `STOREFRONT_TEST_LOGIN_EMAIL` / `_PASSWORD` / `_FIRST_NAME` / `_LAST_NAME` / `_MOBILE` -
//!   local test account, checked before the auth service
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use cinnamon_core::BuyNowPolicy;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_AUTH_URL: &str = "http://localhost:8081";
const DEFAULT_CATALOG_URL: &str = "http://localhost:8081";
const DEFAULT_COMMERCE_URL: &str = "http://localhost:8080";
const DEFAULT_ENGAGEMENT_URL: &str = "http://localhost:8082";
const DEFAULT_CATALOG_CACHE_TTL_SECS: &str = "300";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Backend REST services
    pub backends: BackendUrls,
    /// How long catalog responses stay cached
    pub catalog_cache_ttl: Duration,
    /// What "buy now" does to the cart
    pub buy_now_policy: BuyNowPolicy,
    /// Local test account, if configured
    pub test_login: Option<TestLogin>,
    /// Emit logs as JSON lines instead of text
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// Base URLs of the backend services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendUrls {
    pub auth: Url,
    pub catalog: Url,
    pub commerce: Url,
    pub engagement: Url,
}

impl BackendUrls {
    /// Point every service at the same base URL.
    #[must_use]
    pub fn single(base: &Url) -> Self {
        Self {
            auth: base.clone(),
            catalog: base.clone(),
            commerce: base.clone(),
            engagement: base.clone(),
        }
    }
}

/// Test account accepted without calling the auth service.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct TestLogin {
    pub email: String,
    pub password: SecretString,
    pub first_name: String,
    pub last_name: String,
    pub mobile: String,
}

impl std::fmt::Debug for TestLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestLogin")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("mobile", &self.mobile)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let host = env.parsed("STOREFRONT_HOST", "127.0.0.1")?;
        let port = env.parsed("STOREFRONT_PORT", "3000")?;
        let base_url = env.required("STOREFRONT_BASE_URL")?;

        let backends = BackendUrls {
            auth: env.url("BACKEND_AUTH_URL", DEFAULT_AUTH_URL)?,
            catalog: env.url("BACKEND_CATALOG_URL", DEFAULT_CATALOG_URL)?,
            commerce: env.url("BACKEND_COMMERCE_URL", DEFAULT_COMMERCE_URL)?,
            engagement: env.url("BACKEND_ENGAGEMENT_URL", DEFAULT_ENGAGEMENT_URL)?,
        };

        let ttl_secs: u64 = env.parsed(
            "STOREFRONT_CATALOG_CACHE_TTL_SECS",
            DEFAULT_CATALOG_CACHE_TTL_SECS,
        )?;
        let buy_now_policy = env.parsed("STOREFRONT_BUY_NOW_POLICY", "add-to-cart")?;
        let test_login = TestLogin::from_env(&env)?;

        Ok(Self {
            host,
            port,
            base_url,
            backends,
            catalog_cache_ttl: Duration::from_secs(ttl_secs),
            buy_now_policy,
            test_login,
            log_json: env
                .optional("STOREFRONT_LOG_FORMAT")
                .is_some_and(|format| format.eq_ignore_ascii_case("json")),
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parsed("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: env.parsed("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Absolute URL for a storefront path.
    #[must_use]
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

impl TestLogin {
    fn from_env<F>(env: &Env<F>) -> Result<Option<Self>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(email) = env.optional("STOREFRONT_TEST_LOGIN_EMAIL") else {
            return Ok(None);
        };
        Ok(Some(Self {
            email,
            password: SecretString::from(env.required("STOREFRONT_TEST_LOGIN_PASSWORD")?),
            first_name: env.or_default("STOREFRONT_TEST_LOGIN_FIRST_NAME", "Test"),
            last_name: env.or_default("STOREFRONT_TEST_LOGIN_LAST_NAME", "User"),
            mobile: env.or_default("STOREFRONT_TEST_LOGIN_MOBILE", ""),
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable. Blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Parse a base URL.
    fn url(&self, key: &str, default: &str) -> Result<Url, ConfigError> {
        self.parsed::<Url>(key, default)
    }
}
