//! Domain services: one API call per page action

pub mod auth;
pub mod cart;
pub mod order;

pub use auth::AuthService;
pub use cart::CartService;
pub use order::OrderService;
