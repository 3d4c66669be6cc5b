//! Router tests for login, the auth gate and the cart.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::{Value, json};

use cinnamon_integration_tests::{TEST_EMAIL, TEST_REMOTE_CART, TestContext};

fn line<'a>(cart: &'a Value, order_type: &str) -> &'a Value {
    cart["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["orderType"] == order_type)
        .unwrap()
}

// ============================================================================
// Auth gate
// ============================================================================

#[tokio::test]
async fn test_anonymous_cart_mutation_prompts_login() {
    let mut ctx = TestContext::start().await;
    ctx.mount_product(1, "Ceylon Cinnamon Powder", 20.0).await;

    let response = ctx
        .post(
            "/cart/items",
            json!({"productId": 1, "quantity": 2, "orderType": "single"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["login_required"], true);

    let response = ctx.post("/checkout", json!({})).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["login_required"], true);

    let cart = ctx.get("/cart").await;
    assert_eq!(cart.status, StatusCode::OK);
    assert_eq!(cart.body["count"], 0);

    // The gate answers before the catalog is asked
    assert_eq!(ctx.received("GET", "/products/1").await, 0);
}

#[tokio::test]
async fn test_login_logout_round_trip() {
    let mut ctx = TestContext::start().await;

    let me = ctx.get("/auth/me").await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);

    let login = ctx.login().await;
    assert_eq!(login.body["user"]["email"], TEST_EMAIL);
    assert_eq!(login.body["displayName"], "Test User");

    let me = ctx.get("/auth/me").await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["user"]["email"], TEST_EMAIL);

    let logout = ctx.post_empty("/auth/logout").await;
    assert_eq!(logout.status, StatusCode::NO_CONTENT);

    let me = ctx.get("/auth/me").await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
    assert_eq!(me.body["login_required"], true);
}

#[tokio::test]
async fn test_wrong_password_is_rejected_by_auth_service() {
    let mut ctx = TestContext::start().await;
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .and(wiremock::matchers::path("/api/auth/authenticateuser"))
        .respond_with(
            wiremock::ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "message": "Invalid email or password"
            })),
        )
        .mount(&ctx.server)
        .await;

    let response = ctx
        .post(
            "/auth/login",
            json!({"email": TEST_EMAIL, "password": "wrong"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "Invalid email or password");
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_single_and_bulk_lines_priced_separately() {
    let mut ctx = TestContext::start().await;
    ctx.mount_product(1, "Ceylon Cinnamon Powder", 20.0).await;
    ctx.mount_cart_mirror().await;
    ctx.login().await;

    let cart = ctx
        .post(
            "/cart/items",
            json!({"productId": 1, "quantity": 2, "orderType": "single"}),
        )
        .await;
    assert_eq!(cart.status, StatusCode::OK);
    assert_eq!(cart.body["totalDisplay"], "$40.00");

    let cart = ctx
        .post(
            "/cart/items",
            json!({"productId": 1, "quantity": 10, "orderType": "bulk"}),
        )
        .await;
    assert_eq!(cart.status, StatusCode::OK);
    assert_eq!(cart.body["lineCount"], 2);
    assert_eq!(cart.body["count"], 12);
    assert_eq!(cart.body["totalDisplay"], "$220.00");
    assert_eq!(line(&cart.body, "bulk")["lineTotalDisplay"], "$180.00");

    let count = ctx.get("/cart/count").await;
    assert_eq!(count.body["count"], 12);
}

#[tokio::test]
async fn test_adding_same_line_twice_merges() {
    let mut ctx = TestContext::start().await;
    ctx.mount_product(1, "Ceylon Cinnamon Powder", 20.0).await;
    ctx.mount_cart_mirror().await;
    ctx.login().await;

    for _ in 0..2 {
        ctx.post(
            "/cart/items",
            json!({"productId": 1, "quantity": 1, "orderType": "single"}),
        )
        .await;
    }

    let cart = ctx.get("/cart").await;
    assert_eq!(cart.body["lineCount"], 1);
    assert_eq!(line(&cart.body, "single")["quantity"], 2);
}

#[tokio::test]
async fn test_bulk_quantity_below_minimum_is_rejected() {
    let mut ctx = TestContext::start().await;
    ctx.mount_product(1, "Ceylon Cinnamon Powder", 20.0).await;
    ctx.mount_cart_mirror().await;
    ctx.login().await;

    ctx.post(
        "/cart/items",
        json!({"productId": 1, "quantity": 10, "orderType": "bulk"}),
    )
    .await;

    let response = ctx
        .put(
            "/cart/items",
            json!({"productId": 1, "orderType": "bulk", "quantity": 5}),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let cart = ctx.get("/cart").await;
    assert_eq!(line(&cart.body, "bulk")["quantity"], 10);

    let response = ctx
        .post(
            "/cart/items",
            json!({"productId": 1, "quantity": 3, "orderType": "bulk"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_and_remove_lines() {
    let mut ctx = TestContext::start().await;
    ctx.mount_product(1, "Ceylon Cinnamon Powder", 20.0).await;
    ctx.mount_cart_mirror().await;
    ctx.login().await;

    ctx.post(
        "/cart/items",
        json!({"productId": 1, "quantity": 1, "orderType": "single"}),
    )
    .await;

    let cart = ctx
        .put(
            "/cart/items",
            json!({"productId": 1, "orderType": "single", "quantity": 4}),
        )
        .await;
    assert_eq!(cart.status, StatusCode::OK);
    assert_eq!(cart.body["totalDisplay"], "$80.00");

    let missing = ctx
        .put(
            "/cart/items",
            json!({"productId": 1, "orderType": "bulk", "quantity": 12}),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let removed = ctx
        .delete(
            "/cart/items",
            Some(json!({"productId": 1, "orderType": "single"})),
        )
        .await;
    assert_eq!(removed.body["removed"], true);
    assert_eq!(removed.body["cart"]["count"], 0);

    let again = ctx
        .delete(
            "/cart/items",
            Some(json!({"productId": 1, "orderType": "single"})),
        )
        .await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.body["removed"], false);
}

#[tokio::test]
async fn test_logout_clears_cart() {
    let mut ctx = TestContext::start().await;
    ctx.mount_product(1, "Ceylon Cinnamon Powder", 20.0).await;
    ctx.mount_cart_mirror().await;
    ctx.login().await;

    ctx.post(
        "/cart/items",
        json!({"productId": 1, "quantity": 2, "orderType": "single"}),
    )
    .await;
    ctx.post_empty("/auth/logout").await;

    let cart = ctx.get("/cart").await;
    assert_eq!(cart.body["count"], 0);

    ctx.login().await;
    let cart = ctx.get("/cart").await;
    assert_eq!(cart.body["count"], 0);
}

// ============================================================================
// Cart mirror
// ============================================================================

#[tokio::test]
async fn test_cart_changes_are_mirrored() {
    let mut ctx = TestContext::start().await;
    ctx.mount_product(1, "Ceylon Cinnamon Powder", 20.0).await;
    ctx.mount_cart_mirror().await;
    ctx.login().await;

    ctx.post(
        "/cart/items",
        json!({"productId": 1, "quantity": 2, "orderType": "single"}),
    )
    .await;
    ctx.delete("/cart", None).await;
    ctx.flush_mirror().await;

    let items_path = format!("{TEST_REMOTE_CART}/items");
    assert_eq!(ctx.received("POST", &items_path).await, 1);
    assert_eq!(ctx.received("DELETE", TEST_REMOTE_CART).await, 1);

    let sync = ctx.get("/api/cart/sync").await;
    assert_eq!(sync.body["inSync"], true);
}

#[tokio::test]
async fn test_mirror_failure_is_reported_until_resync() {
    let mut ctx = TestContext::start().await;
    ctx.mount_product(1, "Ceylon Cinnamon Powder", 20.0).await;
    wiremock::Mock::given(wiremock::matchers::method("POST"))
        .and(wiremock::matchers::path_regex(r"^/api/cart/database/.*/items$"))
        .respond_with(wiremock::ResponseTemplate::new(503).set_body_string("database offline"))
        .up_to_n_times(1)
        .mount(&ctx.server)
        .await;
    ctx.mount_cart_mirror().await;
    ctx.login().await;

    let cart = ctx
        .post(
            "/cart/items",
            json!({"productId": 1, "quantity": 2, "orderType": "single"}),
        )
        .await;
    assert_eq!(cart.status, StatusCode::OK);
    ctx.flush_mirror().await;

    let sync = ctx.get("/api/cart/sync").await;
    assert_eq!(sync.status, StatusCode::OK);
    assert_eq!(sync.body["inSync"], false);
    assert_eq!(sync.body["failure"]["operation"], "add");

    let cart = ctx.get("/cart").await;
    assert_eq!(cart.body["count"], 2);

    // The remote copy still lacks the line, so a quantity change succeeding
    // does not put it back in sync.
    ctx.put(
        "/cart/items",
        json!({"productId": 1, "orderType": "single", "quantity": 3}),
    )
    .await;
    ctx.flush_mirror().await;
    let sync = ctx.get("/api/cart/sync").await;
    assert_eq!(sync.body["inSync"], false);

    let resync = ctx.post_empty("/api/cart/sync").await;
    assert_eq!(resync.status, StatusCode::OK);
    assert_eq!(resync.body["inSync"], true);

    let items_path = format!("{TEST_REMOTE_CART}/items");
    assert_eq!(ctx.received("POST", &items_path).await, 2);
    assert_eq!(ctx.received("DELETE", TEST_REMOTE_CART).await, 1);
}

#[tokio::test]
async fn test_login_restores_saved_cart_at_catalog_prices() {
    let mut ctx = TestContext::start().await;
    ctx.mount_product(7, "Cinnamon Leaf Oil", 18.0).await;
    ctx.mount_remote_cart(json!([
        {
            "productId": 7,
            "productName": "Leaf Oil (old name)",
            "price": 15.5,
            "quantity": 10,
            "orderType": "bulk"
        },
        {
            "productId": 99,
            "productName": "Discontinued Quills",
            "price": 4.0,
            "quantity": 1,
            "orderType": "single"
        }
    ]))
    .await;

    let login = ctx.login().await;
    assert_eq!(login.body["cartRestored"], true);
    assert_eq!(login.body["cartCount"], 10);

    let cart = ctx.get("/cart").await;
    assert_eq!(cart.body["items"].as_array().unwrap().len(), 1);
    assert_eq!(line(&cart.body, "bulk")["name"], "Cinnamon Leaf Oil");
    assert_eq!(cart.body["totalDisplay"], "$162.00");
}
