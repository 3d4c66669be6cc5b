//! Wire types for the backend services.
//!
//! These match the services' JSON (camelCase). Domain types live in
//! `cinnamon-core`; conversions are here.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use cinnamon_core::review::star_rating;
use cinnamon_core::{
    ContactMessageId, ContactStatus, ContactSubmission, LineItem, OrderType, PaymentStatus,
    Product, ProductId, ReviewId, ReviewStatus,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Auth
// =============================================================================

/// Body of `POST /api/auth/authenticateuser`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub is_signup: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<&'a str>,
}

impl fmt::Debug for AuthRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("is_signup", &self.is_signup)
            .finish_non_exhaustive()
    }
}

/// Answer from the auth service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<RemoteUser>,
}

/// User profile as the auth service reports it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUser {
    pub email: String,
    #[serde(default, alias = "firstname")]
    pub first_name: Option<String>,
    #[serde(default, alias = "lastname")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
}

// =============================================================================
// Cart mirror
// =============================================================================

/// One line of the persisted cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCartItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: String,
    /// Listed unit price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(default)]
    pub image_filename: Option<String>,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
}

impl From<&LineItem> for RemoteCartItem {
    fn from(line: &LineItem) -> Self {
        Self {
            product_id: line.product_id,
            product_name: line.name.clone(),
            price: line.unit_price.amount,
            quantity: line.quantity,
            order_type: line.order_type,
            image_filename: line.image_ref.clone(),
            added_at: Some(line.added_at),
        }
    }
}

impl RemoteCartItem {
    /// The saved line with name, image and price taken from the current
    /// catalog entry. Only quantity, order type and timestamp are kept.
    #[must_use]
    pub fn into_line(self, product: &Product) -> LineItem {
        LineItem::for_product(
            product,
            self.quantity,
            self.order_type,
            self.added_at.unwrap_or_else(Utc::now),
        )
    }
}

/// Body of a quantity change.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct QuantityUpdate {
    pub quantity: u32,
}

// =============================================================================
// Payment
// =============================================================================

/// Payment method sent with every charge.
pub const PAYMENT_METHOD_CARD: &str = "CREDIT_CARD";

/// Body of `POST /api/payment/process`.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    pub payment_method: &'static str,
    pub customer_email: String,
    pub customer_name: String,
    pub card_number: String,
    pub card_holder_name: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvv: String,
    pub return_url: String,
    pub cancel_url: String,
    pub description: String,
    pub metadata: serde_json::Value,
}

impl fmt::Debug for PaymentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentRequest")
            .field("amount", &self.amount)
            .field("currency", &self.currency)
            .field("customer_email", &self.customer_email)
            .field("card_number", &"[REDACTED]")
            .field("cvv", &"[REDACTED]")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Answer from the payment service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl PaymentResponse {
    /// Why the payment did not complete.
    #[must_use]
    pub fn failure_message(&self) -> String {
        self.error_message
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "Please try again".to_string())
    }
}

/// A payment as listed by `GET /api/payment/all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub payment_id: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub status: PaymentStatus,
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl PaymentRecord {
    /// Whether this is a completed payment by `email`.
    #[must_use]
    pub fn is_completed_order_of(&self, email: &str) -> bool {
        self.status.is_completed() && self.customer_email.as_deref() == Some(email)
    }
}

// =============================================================================
// Contact
// =============================================================================

/// Answer to a new contact message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub edit_token: Option<String>,
    #[serde(default)]
    pub id: Option<ContactMessageId>,
}

/// A stored contact message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: ContactMessageId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: ContactStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Body of `PUT /api/contact/{id}/edit`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactEdit<'a> {
    #[serde(flatten)]
    pub submission: &'a ContactSubmission,
    pub edit_token: &'a str,
}

// =============================================================================
// Reviews
// =============================================================================

/// A published review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub review_title: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub verified_purchase: bool,
    #[serde(default)]
    pub helpful_votes: u32,
    #[serde(default)]
    pub status: ReviewStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Review {
    /// Rating as stars.
    #[must_use]
    pub fn stars(&self) -> String {
        star_rating(f64::from(self.rating))
    }
}

/// Body of `POST /api/reviews`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmission {
    pub customer_name: String,
    pub email: String,
    pub rating: u8,
    pub review_title: String,
    pub comment: String,
    pub product_id: ProductId,
    pub product_name: String,
    pub product_type: String,
    pub verified_purchase: bool,
}

/// Aggregate review numbers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStatistics {
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub total_reviews: u64,
    /// Review count per star value.
    #[serde(default)]
    pub rating_distribution: BTreeMap<u8, u64>,
}
