//! Shared types and models for the livestock storefront
//!
//! This crate contains the wire model consumed by the storefront client, the
//! browser bindings (via WASM) and any other component talking to the
//! storefront API.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
