//! Domain layer for the promo code platform.
//!
//! This crate contains:
//! - Domain models (PromoCode, views, comments, usage records, accounts)
//! - The targeting and activity evaluators
//! - Redemption, feed, social and catalog engines
//! - The anti-fraud gate and the store/cache/decision traits
//! - In-memory stand-ins used by tests

pub mod error;
pub mod models;
pub mod services;

pub use error::{DomainError, StoreError};
