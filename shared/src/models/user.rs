//! User and session models

use serde::{Deserialize, Serialize};

/// Roles a storefront account can have
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// Sells animals and confirms or rejects incoming orders
    Farmer,
    /// Buys animals. Older API versions call this role `user`.
    #[serde(alias = "user")]
    Buyer,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Farmer => "farmer",
            UserType::Buyer => "buyer",
        }
    }

    /// Whether this role may change the status of an order
    pub fn can_manage_orders(&self) -> bool {
        matches!(self, UserType::Farmer)
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A storefront account as returned by the auth endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub user_type: UserType,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl User {
    /// Shipping address on file, ignoring blank values
    pub fn shipping_address(&self) -> Option<&str> {
        self.address
            .as_deref()
            .map(str::trim)
            .filter(|address| !address.is_empty())
    }
}

/// Authentication state of the current visitor
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
    pub is_authenticated: bool,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(token: impl Into<String>, user: User) -> Self {
        Self {
            token: Some(token.into()),
            user: Some(user),
            is_authenticated: true,
        }
    }

    pub fn role(&self) -> Option<UserType> {
        self.user.as_ref().map(|user| user.user_type)
    }
}
