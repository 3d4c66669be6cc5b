//! The bulk discount rule.
//!
//! Every price shown in the cart, the checkout summary and the payment
//! amount goes through these functions. A bulk line is priced at 90% of the
//! listed unit price; there are no other discount tiers.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Price;

/// Fraction taken off the listed price for bulk orders (10%).
pub const BULK_DISCOUNT_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Smallest quantity a bulk line may hold.
pub const BULK_MINIMUM_QUANTITY: u32 = 10;

/// Smallest quantity a single line may hold.
pub const SINGLE_MINIMUM_QUANTITY: u32 = 1;

/// How a line is being purchased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[default]
    Single,
    Bulk,
}

impl OrderType {
    /// Minimum quantity for a line of this type.
    #[must_use]
    pub const fn minimum_quantity(self) -> u32 {
        match self {
            Self::Single => SINGLE_MINIMUM_QUANTITY,
            Self::Bulk => BULK_MINIMUM_QUANTITY,
        }
    }

    /// Wire and path representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Bulk => "bulk",
        }
    }

    /// Label shown next to a line.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Single => "Single Order",
            Self::Bulk => "Bulk Order",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing an [`OrderType`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown order type: {0}")]
pub struct UnknownOrderType(pub String);

impl FromStr for OrderType {
    type Err = UnknownOrderType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "bulk" => Ok(Self::Bulk),
            other => Err(UnknownOrderType(other.to_string())),
        }
    }
}

/// Effective unit price after any order-type discount.
#[must_use]
pub fn unit_price(list_price: Price, order_type: OrderType) -> Price {
    match order_type {
        OrderType::Single => list_price,
        OrderType::Bulk => Price::new(
            list_price.amount * (Decimal::ONE - BULK_DISCOUNT_RATE),
            list_price.currency_code,
        ),
    }
}

/// Unrounded line total: effective unit price times quantity.
#[must_use]
pub fn line_total(list_price: Price, quantity: u32, order_type: OrderType) -> Price {
    unit_price(list_price, order_type).times(quantity)
}

/// Amount saved on a line versus the listed price.
#[must_use]
pub fn line_discount(list_price: Price, quantity: u32, order_type: OrderType) -> Price {
    match order_type {
        OrderType::Single => Price::zero(list_price.currency_code),
        OrderType::Bulk => Price::new(
            list_price.amount * BULK_DISCOUNT_RATE,
            list_price.currency_code,
        )
        .times(quantity),
    }
}
