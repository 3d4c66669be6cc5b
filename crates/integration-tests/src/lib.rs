//! Integration tests for the Cinnamon storefront.
//!
//! The storefront router runs in-process; every backend service is a single
//! `wiremock` server. Requests go through `tower::ServiceExt::oneshot` and the
//! session cookie is carried from one call to the next, like a browser.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cinnamon-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc, clippy::expect_used)]

use std::collections::HashMap;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cinnamon_storefront::config::StorefrontConfig;
use cinnamon_storefront::routes;
use cinnamon_storefront::state::AppState;

/// Test account configured on every context.
pub const TEST_EMAIL: &str = "test@cinnamonmiracle.com";
pub const TEST_PASSWORD: &str = "test123";

/// Path of the test account's persisted cart on the commerce service.
pub const TEST_REMOTE_CART: &str = "/api/cart/database/test%40cinnamonmiracle.com";

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    /// JSON body, or the raw text as a JSON string when it is not JSON.
    pub body: Value,
}

/// One browser session against a fresh storefront.
pub struct TestContext {
    pub server: MockServer,
    pub state: AppState,
    app: Router,
    cookie: Option<String>,
}

impl TestContext {
    /// Storefront with default settings.
    pub async fn start() -> Self {
        Self::with_env(&[]).await
    }

    /// Storefront with extra environment variables.
    pub async fn with_env(extra: &[(&str, &str)]) -> Self {
        let server = MockServer::start().await;

        let mut vars: HashMap<String, String> = HashMap::from([
            ("STOREFRONT_BASE_URL".to_string(), "http://localhost:3000".to_string()),
            ("BACKEND_AUTH_URL".to_string(), server.uri()),
            ("BACKEND_CATALOG_URL".to_string(), server.uri()),
            ("BACKEND_COMMERCE_URL".to_string(), server.uri()),
            ("BACKEND_ENGAGEMENT_URL".to_string(), server.uri()),
            ("STOREFRONT_TEST_LOGIN_EMAIL".to_string(), TEST_EMAIL.to_string()),
            ("STOREFRONT_TEST_LOGIN_PASSWORD".to_string(), TEST_PASSWORD.to_string()),
        ]);
        for (key, value) in extra {
            vars.insert((*key).to_string(), (*value).to_string());
        }

        let config = StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
            .expect("test configuration should load");
        let state = AppState::new(config);
        let app = routes::app(state.clone());

        Self {
            server,
            state,
            app,
            cookie: None,
        }
    }

    /// Serve a catalog product.
    pub async fn mount_product(&self, id: i64, name: &str, price: f64) {
        Mock::given(method("GET"))
            .and(path(format!("/products/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": id,
                "name": name,
                "category": "spices",
                "price": price,
                "stockQuantity": 100,
                "imageFilename": format!("product-{id}.jpg")
            })))
            .mount(&self.server)
            .await;
    }

    /// Serve the test account's persisted cart.
    pub async fn mount_remote_cart(&self, items: Value) {
        Mock::given(method("GET"))
            .and(path(TEST_REMOTE_CART))
            .respond_with(ResponseTemplate::new(200).set_body_json(items))
            .mount(&self.server)
            .await;
    }

    /// Accept every cart mirror write.
    pub async fn mount_cart_mirror(&self) {
        for verb in ["POST", "PUT", "DELETE"] {
            Mock::given(method(verb))
                .and(path_regex(r"^/api/cart/database/"))
                .respond_with(ResponseTemplate::new(200))
                .mount(&self.server)
                .await;
        }
    }

    /// Log in with the test account. Expects an empty persisted cart unless
    /// one was mounted before.
    pub async fn login(&mut self) -> TestResponse {
        self.mount_remote_cart(json!([])).await;
        let response = self
            .post(
                "/auth/login",
                json!({"email": TEST_EMAIL, "password": TEST_PASSWORD}),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {:?}", response.body);
        response
    }

    /// Wait until the cart mirror has processed everything queued so far.
    pub async fn flush_mirror(&self) {
        self.state.mirror().flush().await;
    }

    /// Requests the mock backend received with `verb` on `path`.
    pub async fn received(&self, verb: &str, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.method.as_str() == verb && r.url.path() == request_path)
            .count()
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn post_empty(&mut self, uri: &str) -> TestResponse {
        self.send(Method::POST, uri, None).await
    }

    pub async fn put(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&mut self, uri: &str, body: Option<Value>) -> TestResponse {
        self.send(Method::DELETE, uri, body).await
    }

    /// Send one request, carrying and updating the session cookie.
    pub async fn send(&mut self, verb: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(verb).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        self.remember_cookie(response.headers());

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse { status, body }
    }

    fn remember_cookie(&mut self, headers: &axum::http::HeaderMap) {
        let Some(set_cookie) = headers
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
        else {
            return;
        };

        if set_cookie.contains("Max-Age=0") {
            self.cookie = None;
        } else if let Some(pair) = set_cookie.split(';').next() {
            self.cookie = Some(pair.trim().to_string());
        }
    }
}

/// A card form that passes validation.
#[must_use]
pub fn valid_payment_form() -> Value {
    json!({
        "cardNumber": "4242 4242 4242 4242",
        "expiryMonth": "12",
        "expiryYear": "30",
        "cvv": "123",
        "cardHolderName": "Test User",
        "email": TEST_EMAIL,
        "billingAddress": {
            "street": "12 Galle Road",
            "city": "Colombo",
            "state": "Western",
            "zipCode": "00300",
            "country": "Sri Lanka"
        }
    })
}
