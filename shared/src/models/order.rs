//! Order models

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::user::UserType;

/// Lifecycle status of an order.
///
/// The server decides transitions; the value held by the client is only
/// advisory until the next reload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
    Completed,
    /// Any status this client does not know about yet
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Completed => "completed",
            OrderStatus::Unknown => "unknown",
        }
    }

    /// Statuses a seller may move an order to from this one
    pub fn allowed_transitions(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Confirmed, OrderStatus::Rejected],
            _ => &[],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "rejected" => Ok(OrderStatus::Rejected),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "completed" => Ok(OrderStatus::Completed),
            other => Err(format!("Unknown order status: {}", other)),
        }
    }
}

/// Animal summary embedded in an order line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderAnimal {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub breed: Option<String>,
}

/// A line of an order.
///
/// Buyer listings embed the animal; seller listings only carry its name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub animal: Option<OrderAnimal>,
    #[serde(default)]
    pub animal_name: Option<String>,
    pub quantity: u32,
    pub price: Decimal,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
}

impl OrderItem {
    pub fn display_name(&self) -> &str {
        self.animal
            .as_ref()
            .map(|animal| animal.name.as_str())
            .or(self.animal_name.as_deref())
            .unwrap_or("Animal")
    }

    pub fn breed(&self) -> &str {
        self.animal
            .as_ref()
            .and_then(|animal| animal.breed.as_deref())
            .unwrap_or("Unknown breed")
    }

    /// Server-computed subtotal, or price times quantity when it is missing
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
            .unwrap_or_else(|| self.price.saturating_mul(Decimal::from(self.quantity)))
    }
}

/// Buyer contact attached to a seller's view of an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderCustomer {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// An order as listed by `GET /orders`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: i64,
    pub status: OrderStatus,
    /// ISO-8601 timestamp, with or without an offset
    #[serde(default)]
    pub created_at: Option<String>,
    pub total_amount: Decimal,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
    #[serde(default)]
    pub user: Option<OrderCustomer>,
}

impl Order {
    /// Status changes the given viewer is offered for this order
    pub fn available_actions(&self, viewer: UserType) -> &'static [OrderStatus] {
        if viewer.can_manage_orders() {
            self.status.allowed_transitions()
        } else {
            &[]
        }
    }

    /// Calendar date the order was placed, if the timestamp can be read
    pub fn created_date(&self) -> Option<NaiveDate> {
        let raw = self.created_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.date_naive())
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
            .ok()
    }
}

/// Body of `GET /orders`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrdersResponse {
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// Body of `PATCH /orders/{id}/status`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateOrderStatusInput {
    pub status: OrderStatus,
}
