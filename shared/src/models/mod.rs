//! Domain models for the livestock storefront

mod animal;
mod auth;
mod cart;
mod order;
mod user;

pub use animal::*;
pub use auth::*;
pub use cart::*;
pub use order::*;
pub use user::*;
