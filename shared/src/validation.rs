//! Client-side validation for storefront mutations
//!
//! The storefront API stays authoritative; these checks only keep the client
//! from sending requests that cannot succeed.

use validator::Validate;

use crate::models::{OrderStatus, UpdateCartItemInput, UserType};

/// Turn a requested cart quantity into the update body, refusing anything
/// below 1
pub fn validate_quantity(quantity: i64) -> Result<UpdateCartItemInput, &'static str> {
    let quantity = match u32::try_from(quantity) {
        Ok(quantity) => quantity,
        Err(_) if quantity < 1 => return Err("Quantity must be at least 1"),
        Err(_) => return Err("Quantity is too large"),
    };
    let input = UpdateCartItemInput { quantity };
    input
        .validate()
        .map_err(|_| "Quantity must be at least 1")?;
    Ok(input)
}

/// Validate that a viewer may move an order from `current` to `next`
pub fn validate_status_change(
    viewer: UserType,
    current: OrderStatus,
    next: OrderStatus,
) -> Result<(), &'static str> {
    if !viewer.can_manage_orders() {
        return Err("Only farmers can update order status");
    }
    if !current.can_transition_to(next) {
        return Err("Order status cannot change this way");
    }
    Ok(())
}

/// Validate an email address (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}
