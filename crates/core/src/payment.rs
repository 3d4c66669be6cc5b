//! Card payment form validation and the receipt kept after a charge.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::checkout::OrderSummary;
use crate::types::{Email, EmailError, PaymentStatus, Price};

/// Digits in an accepted card number.
pub const CARD_NUMBER_DIGITS: usize = 16;

/// Billing address attached to a payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingAddress {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub country: String,
}

/// Raw payment form as submitted.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentForm {
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub expiry_month: String,
    #[serde(default)]
    pub expiry_year: String,
    #[serde(default)]
    pub cvv: String,
    #[serde(default)]
    pub card_holder_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub billing_address: BillingAddress,
}

impl fmt::Debug for PaymentForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentForm")
            .field("card_number", &"[REDACTED]")
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("cvv", &"[REDACTED]")
            .field("card_holder_name", &self.card_holder_name)
            .field("email", &self.email)
            .field("billing_address", &self.billing_address)
            .finish()
    }
}

/// Why a payment form was rejected before submission.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentFormError {
    #[error("please enter a valid 16-digit card number")]
    CardNumber,

    #[error("please enter a valid expiry date")]
    Expiry,

    #[error("please enter a valid CVV")]
    Cvv,

    #[error("please enter the card holder name")]
    CardHolder,

    #[error("please enter a valid email: {0}")]
    Email(#[from] EmailError),

    #[error("please complete the billing address ({0} is missing)")]
    BillingAddress(&'static str),
}

/// Card network, from the leading digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Unknown,
}

impl CardBrand {
    #[must_use]
    pub fn detect(card_number: &str) -> Self {
        match card_number.trim_start().chars().next() {
            Some('4') => Self::Visa,
            Some('5' | '2') => Self::Mastercard,
            Some('3') => Self::Amex,
            _ => Self::Unknown,
        }
    }
}

/// A payment form that passed validation.
#[derive(Clone, PartialEq, Eq)]
pub struct ValidatedCard {
    /// Digits only.
    pub number: String,
    pub expiry_month: u8,
    /// Four-digit year.
    pub expiry_year: u16,
    pub cvv: String,
    pub holder_name: String,
    pub email: Email,
    pub brand: CardBrand,
    pub billing_address: BillingAddress,
}

impl ValidatedCard {
    /// Last four digits, for display and logs.
    #[must_use]
    pub fn last4(&self) -> &str {
        self.number
            .get(self.number.len().saturating_sub(4)..)
            .unwrap_or_default()
    }
}

impl fmt::Debug for ValidatedCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedCard")
            .field("last4", &self.last4())
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("holder_name", &self.holder_name)
            .field("email", &self.email)
            .field("brand", &self.brand)
            .finish_non_exhaustive()
    }
}

impl PaymentForm {
    /// Check the form, in field order.
    ///
    /// # Errors
    ///
    /// Returns the first [`PaymentFormError`] found.
    pub fn validate(&self) -> Result<ValidatedCard, PaymentFormError> {
        let number: String = self.card_number.chars().filter(|c| !c.is_whitespace()).collect();
        if number.len() != CARD_NUMBER_DIGITS || !number.chars().all(|c| c.is_ascii_digit()) {
            return Err(PaymentFormError::CardNumber);
        }

        let expiry_month = parse_month(&self.expiry_month).ok_or(PaymentFormError::Expiry)?;
        let expiry_year = parse_year(&self.expiry_year).ok_or(PaymentFormError::Expiry)?;

        let cvv = self.cvv.trim();
        if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
            return Err(PaymentFormError::Cvv);
        }

        let holder_name = self.card_holder_name.trim();
        if holder_name.is_empty() {
            return Err(PaymentFormError::CardHolder);
        }

        let email = Email::parse(&self.email)?;

        let address = &self.billing_address;
        for (field, value) in [
            ("street", &address.street),
            ("city", &address.city),
            ("zip code", &address.zip_code),
        ] {
            if value.trim().is_empty() {
                return Err(PaymentFormError::BillingAddress(field));
            }
        }

        Ok(ValidatedCard {
            brand: CardBrand::detect(&number),
            number,
            expiry_month,
            expiry_year,
            cvv: cvv.to_string(),
            holder_name: holder_name.to_string(),
            email,
            billing_address: address.clone(),
        })
    }
}

fn parse_month(raw: &str) -> Option<u8> {
    let raw = raw.trim();
    if raw.is_empty() || raw.len() > 2 || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u8>().ok().filter(|m| (1..=12).contains(m))
}

fn parse_year(raw: &str) -> Option<u16> {
    let raw = raw.trim();
    if !matches!(raw.len(), 2 | 4) || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let year = raw.parse::<u16>().ok()?;
    Some(if raw.len() == 2 { 2000 + year } else { year })
}

/// Group card digits by four for display ("4242 4242 4242 4242").
///
/// Non-digits are dropped.
#[must_use]
pub fn format_card_number(raw: &str) -> String {
    let digits: Vec<char> = raw.chars().filter(char::is_ascii_digit).collect();
    digits
        .chunks(4)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// What the session remembers about a completed charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub payment_id: String,
    pub amount: Price,
    pub status: PaymentStatus,
    pub order: OrderSummary,
}
