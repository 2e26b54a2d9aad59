//! Shopping cart models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::animal::Animal;

/// Address sent with a checkout when the account has none on file.
///
/// Whether the storefront API accepts this placeholder as a real address is
/// undecided on the product side; the client keeps sending it unchanged.
pub const DEFAULT_SHIPPING_ADDRESS: &str = "Default address";

/// A line in the visitor's cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub id: i64,
    pub quantity: u32,
    pub animal: Animal,
}

impl CartItem {
    /// Price of this line, or `None` if it does not fit in a `Decimal`
    pub fn checked_line_total(&self) -> Option<Decimal> {
        self.animal.price.checked_mul(Decimal::from(self.quantity))
    }

    /// Price of this line: unit price times quantity, saturating at the
    /// `Decimal` bounds
    pub fn line_total(&self) -> Decimal {
        self.animal.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Sum of all line totals, or `None` if any step overflows
pub fn checked_cart_subtotal(items: &[CartItem]) -> Option<Decimal> {
    items.iter().try_fold(Decimal::ZERO, |sum, item| {
        sum.checked_add(item.checked_line_total()?)
    })
}

/// Sum of all line totals of a cart snapshot, saturating at the `Decimal`
/// bounds
pub fn cart_subtotal(items: &[CartItem]) -> Decimal {
    items
        .iter()
        .fold(Decimal::ZERO, |sum, item| sum.saturating_add(item.line_total()))
}

/// Body of `GET /cart`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartResponse {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

/// Body of `PUT /cart/items/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct UpdateCartItemInput {
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,
}

/// Body of `POST /cart/checkout`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutInput {
    pub shipping_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CheckoutInput {
    /// Build a checkout for the given address, falling back to the placeholder
    pub fn for_address(address: Option<&str>) -> Self {
        Self {
            shipping_address: address.unwrap_or(DEFAULT_SHIPPING_ADDRESS).to_string(),
            notes: None,
        }
    }
}

/// Body returned by a successful checkout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub order_id: Option<i64>,
    #[serde(default)]
    pub total_amount: Option<Decimal>,
}
