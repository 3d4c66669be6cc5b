//! Payment route handlers.
//!
//! The charged amount is always the payable order's total, computed from the
//! session; the client never sends an amount.

use axum::{Extension, Json, extract::State};
use tracing::instrument;

use cinnamon_core::{
    CheckoutSource, OrderSummary, PaymentForm, PaymentReceipt, Price, ValidatedCard,
};

use crate::backend::{PAYMENT_METHOD_CARD, PaymentRequest};
use crate::error::{AppError, add_breadcrumb};
use crate::middleware::{RequestId, Shop};
use crate::services::MirrorOp;
use crate::state::AppState;

/// Charge the payable order.
///
/// On a completed payment the receipt is stored, the pending checkout is
/// dropped and the paid lines are taken out of the cart, unless the order was
/// an isolated direct buy. Any other outcome leaves the session as it was.
#[instrument(skip(state, shop, form, request_id))]
pub async fn pay(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    mut shop: Shop,
    Json(form): Json<PaymentForm>,
) -> Result<Json<PaymentReceipt>, AppError> {
    let user = shop.require_user("pay")?.clone();
    let card = form.validate()?;
    let order = shop.payable_order()?;

    let request = build_request(&state, &order, &card, &user.display_name(), &request_id);
    tracing::info!(
        amount = %order.total,
        brand = ?card.brand,
        last4 = card.last4(),
        "Submitting payment"
    );

    let response = state.backend().process_payment(&request).await?;
    if !response.status.is_completed() {
        let message = response.failure_message();
        tracing::warn!(status = ?response.status, message = %message, "Payment not completed");
        add_breadcrumb("payment", "Payment declined", Some(&[("message", &message)]));
        return Err(AppError::Declined(message));
    }

    let receipt = PaymentReceipt {
        payment_id: response.payment_id.clone().unwrap_or_default(),
        amount: response
            .amount
            .map_or(order.total, |amount| Price::new(amount, order.total.currency_code)),
        status: response.status,
        order,
    };

    let settlement = shop.record_payment(receipt.clone());
    shop.save().await?;

    for op in MirrorOp::for_settlement(&settlement) {
        state.mirror().enqueue(&user.email, op);
    }
    // Stock levels changed
    state.backend().invalidate_catalog();

    tracing::info!(payment_id = %receipt.payment_id, ?settlement, "Payment completed");
    add_breadcrumb(
        "payment",
        "Payment completed",
        Some(&[("payment_id", &receipt.payment_id)]),
    );

    Ok(Json(receipt))
}

/// The most recent payment of this session.
#[instrument(skip(shop))]
pub async fn success(shop: Shop) -> Result<Json<PaymentReceipt>, AppError> {
    shop.require_user("view your receipt")?;
    shop.last_receipt()
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("no recent payment".to_string()))
}

fn build_request(
    state: &AppState,
    order: &OrderSummary,
    card: &ValidatedCard,
    customer_name: &str,
    request_id: &RequestId,
) -> PaymentRequest {
    let config = state.config();
    let kind = match order.source {
        CheckoutSource::Cart => "cart",
        CheckoutSource::DirectBuy { .. } => "direct_buy",
    };

    PaymentRequest {
        amount: order.total.amount,
        currency: order.total.currency_code.code().to_string(),
        payment_method: PAYMENT_METHOD_CARD,
        customer_email: card.email.as_str().to_string(),
        customer_name: customer_name.to_string(),
        card_number: card.number.clone(),
        card_holder_name: card.holder_name.clone(),
        expiry_month: format!("{:02}", card.expiry_month),
        expiry_year: card.expiry_year.to_string(),
        cvv: card.cvv.clone(),
        return_url: config.absolute_url("/payment/success"),
        cancel_url: config.absolute_url("/checkout"),
        description: format!("Cinnamon Miracle order ({} items)", order.item_count),
        metadata: serde_json::json!({
            "checkoutSource": kind,
            "itemCount": order.item_count,
            "requestId": request_id.0,
            "billingCity": card.billing_address.city,
            "billingCountry": card.billing_address.country,
        }),
    }
}
