//! Router tests for checkout, buy now and payment.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use cinnamon_integration_tests::{TEST_REMOTE_CART, TestContext, valid_payment_form};

async fn mount_payment(ctx: &TestContext, response: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/api/payment/process"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(&ctx.server)
        .await;
}

async fn cart_with_two_singles(ctx: &mut TestContext) {
    ctx.mount_product(1, "Ceylon Cinnamon Powder", 20.0).await;
    ctx.mount_cart_mirror().await;
    ctx.login().await;
    ctx.post(
        "/cart/items",
        json!({"productId": 1, "quantity": 2, "orderType": "single"}),
    )
    .await;
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_checkout_empty_cart_is_rejected() {
    let mut ctx = TestContext::start().await;
    ctx.login().await;

    let response = ctx.post("/checkout", json!({})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let pending = ctx.get("/checkout").await;
    assert_eq!(pending.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_checkout_cart_summary() {
    let mut ctx = TestContext::start().await;
    cart_with_two_singles(&mut ctx).await;

    let summary = ctx.post_empty("/checkout").await;
    assert_eq!(summary.status, StatusCode::OK);
    assert_eq!(summary.body["source"]["kind"], "cart");
    assert_eq!(summary.body["itemCount"], 2);

    let pending = ctx.get("/checkout").await;
    assert_eq!(pending.status, StatusCode::OK);
    assert_eq!(pending.body, summary.body);
}

#[tokio::test]
async fn test_direct_buy_checkout_leaves_cart_alone() {
    let mut ctx = TestContext::start().await;
    cart_with_two_singles(&mut ctx).await;

    let summary = ctx
        .post(
            "/checkout",
            json!({"directBuy": {"productId": 1, "quantity": 10, "orderType": "bulk"}}),
        )
        .await;
    assert_eq!(summary.status, StatusCode::OK);
    assert_eq!(summary.body["source"]["kind"], "directBuy");
    assert_eq!(summary.body["source"]["addedToCart"], false);
    assert_eq!(summary.body["itemCount"], 10);

    let cart = ctx.get("/cart").await;
    assert_eq!(cart.body["count"], 2);
}

// ============================================================================
// Buy now
// ============================================================================

#[tokio::test]
async fn test_buy_now_adds_to_cart_by_default() {
    let mut ctx = TestContext::start().await;
    cart_with_two_singles(&mut ctx).await;

    let summary = ctx
        .post(
            "/products/1/buy-now",
            json!({"quantity": 10, "orderType": "bulk"}),
        )
        .await;
    assert_eq!(summary.status, StatusCode::OK);
    assert_eq!(summary.body["source"]["addedToCart"], true);
    assert_eq!(summary.body["lines"].as_array().unwrap().len(), 1);
    assert_eq!(summary.body["itemCount"], 10);

    let cart = ctx.get("/cart").await;
    assert_eq!(cart.body["count"], 12);

    ctx.flush_mirror().await;
    let items_path = format!("{TEST_REMOTE_CART}/items");
    assert_eq!(ctx.received("POST", &items_path).await, 2);
}

#[tokio::test]
async fn test_buy_now_isolated_policy() {
    let mut ctx = TestContext::with_env(&[("STOREFRONT_BUY_NOW_POLICY", "isolated")]).await;
    cart_with_two_singles(&mut ctx).await;

    let summary = ctx
        .post(
            "/products/1/buy-now",
            json!({"quantity": 10, "orderType": "bulk"}),
        )
        .await;
    assert_eq!(summary.status, StatusCode::OK);
    assert_eq!(summary.body["source"]["addedToCart"], false);

    let cart = ctx.get("/cart").await;
    assert_eq!(cart.body["count"], 2);
}

#[tokio::test]
async fn test_buy_now_requires_login() {
    let mut ctx = TestContext::start().await;
    ctx.mount_product(1, "Ceylon Cinnamon Powder", 20.0).await;

    let response = ctx
        .post("/products/1/buy-now", json!({"quantity": 1}))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["login_required"], true);
}

// ============================================================================
// Payment
// ============================================================================

#[tokio::test]
async fn test_completed_payment_clears_cart() {
    let mut ctx = TestContext::start().await;
    cart_with_two_singles(&mut ctx).await;
    Mock::given(method("POST"))
        .and(path("/api/payment/process"))
        .and(body_partial_json(json!({
            "amount": 40.0,
            "paymentMethod": "CREDIT_CARD",
            "cardNumber": "4242424242424242",
            "expiryYear": "2030"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "COMPLETED",
            "paymentId": "PAY-1001",
            "amount": 40.0
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    ctx.post_empty("/checkout").await;
    let receipt = ctx.post("/payment", valid_payment_form()).await;
    assert_eq!(receipt.status, StatusCode::OK, "{:?}", receipt.body);
    assert_eq!(receipt.body["paymentId"], "PAY-1001");
    assert_eq!(receipt.body["status"], "COMPLETED");

    let cart = ctx.get("/cart").await;
    assert_eq!(cart.body["count"], 0);

    let pending = ctx.get("/checkout").await;
    assert_eq!(pending.status, StatusCode::NOT_FOUND);

    let success = ctx.get("/payment/success").await;
    assert_eq!(success.body["paymentId"], "PAY-1001");

    ctx.flush_mirror().await;
    assert_eq!(ctx.received("DELETE", TEST_REMOTE_CART).await, 1);
}

#[tokio::test]
async fn test_cart_change_after_checkout_is_charged() {
    let mut ctx = TestContext::start().await;
    cart_with_two_singles(&mut ctx).await;
    Mock::given(method("POST"))
        .and(path("/api/payment/process"))
        .and(body_partial_json(json!({"amount": 100.0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "COMPLETED",
            "paymentId": "PAY-1002"
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let summary = ctx.post_empty("/checkout").await;
    assert_eq!(summary.body["itemCount"], 2);
    ctx.post(
        "/cart/items",
        json!({"productId": 1, "quantity": 3, "orderType": "single"}),
    )
    .await;

    let receipt = ctx.post("/payment", valid_payment_form()).await;
    assert_eq!(receipt.status, StatusCode::OK, "{:?}", receipt.body);
    assert_eq!(receipt.body["order"]["itemCount"], 5);

    let cart = ctx.get("/cart").await;
    assert_eq!(cart.body["count"], 0);
}

#[tokio::test]
async fn test_buy_now_payment_keeps_rest_of_cart() {
    let mut ctx = TestContext::start().await;
    cart_with_two_singles(&mut ctx).await;
    Mock::given(method("POST"))
        .and(path("/api/payment/process"))
        .and(body_partial_json(json!({"amount": 180.0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "COMPLETED",
            "paymentId": "PAY-1003"
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    ctx.post(
        "/products/1/buy-now",
        json!({"quantity": 10, "orderType": "bulk"}),
    )
    .await;
    let receipt = ctx.post("/payment", valid_payment_form()).await;
    assert_eq!(receipt.status, StatusCode::OK, "{:?}", receipt.body);

    let cart = ctx.get("/cart").await;
    assert_eq!(cart.body["count"], 2);
    assert_eq!(cart.body["items"].as_array().unwrap().len(), 1);

    ctx.flush_mirror().await;
    let bulk_line = format!("{TEST_REMOTE_CART}/items/1/bulk");
    assert_eq!(ctx.received("DELETE", &bulk_line).await, 1);
    assert_eq!(ctx.received("DELETE", TEST_REMOTE_CART).await, 0);
}

#[tokio::test]
async fn test_declined_payment_keeps_cart() {
    let mut ctx = TestContext::start().await;
    cart_with_two_singles(&mut ctx).await;
    mount_payment(
        &ctx,
        json!({"status": "FAILED", "errorMessage": "Card declined"}),
    )
    .await;

    let response = ctx.post("/payment", valid_payment_form()).await;
    assert_eq!(response.status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(response.body["error"], "Card declined");

    let cart = ctx.get("/cart").await;
    assert_eq!(cart.body["count"], 2);

    let success = ctx.get("/payment/success").await;
    assert_eq!(success.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_isolated_buy_payment_leaves_cart() {
    let mut ctx = TestContext::with_env(&[("STOREFRONT_BUY_NOW_POLICY", "isolated")]).await;
    cart_with_two_singles(&mut ctx).await;
    mount_payment(
        &ctx,
        json!({"status": "COMPLETED", "paymentId": "PAY-2002"}),
    )
    .await;

    ctx.post(
        "/products/1/buy-now",
        json!({"quantity": 1, "orderType": "single"}),
    )
    .await;
    let receipt = ctx.post("/payment", valid_payment_form()).await;
    assert_eq!(receipt.status, StatusCode::OK);
    assert_eq!(receipt.body["order"]["itemCount"], 1);

    let cart = ctx.get("/cart").await;
    assert_eq!(cart.body["count"], 2);
}

#[tokio::test]
async fn test_invalid_card_never_reaches_payment_service() {
    let mut ctx = TestContext::start().await;
    cart_with_two_singles(&mut ctx).await;

    let mut form = valid_payment_form();
    form["cardNumber"] = json!("4242 4242");
    let response = ctx.post("/payment", form).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "please enter a valid 16-digit card number");

    assert_eq!(ctx.received("POST", "/api/payment/process").await, 0);
}

#[tokio::test]
async fn test_payment_service_outage_is_bad_gateway() {
    let mut ctx = TestContext::start().await;
    cart_with_two_singles(&mut ctx).await;
    Mock::given(method("POST"))
        .and(path("/api/payment/process"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&ctx.server)
        .await;

    let response = ctx.post("/payment", valid_payment_form()).await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["error"], "External service error");

    let cart = ctx.get("/cart").await;
    assert_eq!(cart.body["count"], 2);
}
