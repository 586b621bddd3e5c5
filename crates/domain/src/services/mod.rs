//! Domain services for the promo code platform.
//!
//! Engines contain business logic and talk to storage only through
//! [`PromoCodeStore`].

pub mod activity;
pub mod antifraud;
pub mod catalog;
pub mod feed;
pub mod memory;
pub mod redemption;
pub mod social;
pub mod store;
pub mod targeting;

pub use activity::is_active;
pub use antifraud::{
    AntifraudCache, AntifraudGate, CacheError, DecisionError, FraudDecisionService, FraudVerdict,
    InMemoryAntifraudCache, StaticDecisionService,
};
pub use catalog::Catalog;
pub use feed::FeedEngine;
pub use memory::InMemoryPromoCodeStore;
pub use redemption::RedemptionEngine;
pub use social::SocialEngine;
pub use store::PromoCodeStore;
pub use targeting::{eligible, in_category};
