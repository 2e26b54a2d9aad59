//! WebAssembly module for the livestock storefront
//!
//! Pure view helpers for a browser renderer:
//! - Cart subtotal and currency formatting
//! - Quantity floor check before an update is sent
//! - Order status actions offered to a viewer

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Subtotal of a cart given as the JSON array returned by `GET /cart`
#[wasm_bindgen]
pub fn cart_subtotal_of(items_json: &str) -> Result<String, JsValue> {
    subtotal_from_json(items_json)
        .map(format_currency)
        .map_err(|e| JsValue::from_str(&e))
}

fn subtotal_from_json(items_json: &str) -> Result<Decimal, String> {
    let items: Vec<CartItem> =
        serde_json::from_str(items_json).map_err(|e| format!("Invalid cart JSON: {}", e))?;
    checked_cart_subtotal(&items).ok_or_else(|| "Cart total is out of range".to_string())
}

/// Format an amount as `$x.xx`
#[wasm_bindgen]
pub fn format_price(amount: f64) -> String {
    let amount = Decimal::try_from(amount).unwrap_or(Decimal::ZERO);
    format_currency(amount)
}

/// Whether a quantity may be sent to the cart
#[wasm_bindgen]
pub fn is_valid_quantity(quantity: i32) -> bool {
    validate_quantity(i64::from(quantity)).is_ok()
}

/// Whether a viewer of `user_type` may move an order from `current` to `next`
#[wasm_bindgen]
pub fn can_update_order_status(user_type: &str, current: &str, next: &str) -> bool {
    let Some(viewer) = parse_user_type(user_type) else {
        return false;
    };
    match (current.parse::<OrderStatus>(), next.parse::<OrderStatus>()) {
        (Ok(current), Ok(next)) => validate_status_change(viewer, current, next).is_ok(),
        _ => false,
    }
}

/// Status actions to render for an order, as a JSON array of wire names
#[wasm_bindgen]
pub fn order_actions(user_type: &str, status: &str) -> String {
    let actions: Vec<&str> = match (parse_user_type(user_type), status.parse::<OrderStatus>()) {
        (Some(viewer), Ok(status)) if viewer.can_manage_orders() => status
            .allowed_transitions()
            .iter()
            .map(OrderStatus::as_str)
            .collect(),
        _ => Vec::new(),
    };
    serde_json::to_string(&actions).unwrap_or_else(|_| "[]".to_string())
}

fn parse_user_type(raw: &str) -> Option<UserType> {
    serde_json::from_value(serde_json::Value::String(raw.to_ascii_lowercase())).ok()
}
