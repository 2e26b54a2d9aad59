//! Page controllers
//!
//! Each page mounts behind a [`SessionGuard`], keeps a full snapshot of its
//! list and reloads that snapshot after every mutation.

mod cart;
mod guard;
mod list;
mod orders;

pub use cart::{CartList, CartPage, CheckoutOutcome};
pub use guard::{GuardDecision, PageState, SessionGuard};
pub use list::{ListPage, ListSource, ListView};
pub use orders::{OrderList, OrdersPage};
