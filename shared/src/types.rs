//! Common types used across the storefront

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Generic `{message}` body carried by mutation responses and API errors
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
}

/// Format an amount in dollars with two decimals, e.g. `$25.00`
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("${:.2}", rounded)
}
