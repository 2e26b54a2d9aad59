//! Animal listing model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An animal offered for sale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Animal {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub animal_type: Option<String>,
    /// Age in months
    #[serde(default)]
    pub age: Option<i32>,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
}
