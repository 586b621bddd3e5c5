//! Aggregate rows over likes, comments and uses.

use domain::models::{CountryActivations, PromoCounters, ViewerFlags};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct CountersEntity {
    pub like_count: i64,
    pub comment_count: i64,
    pub use_count: i64,
}

impl From<CountersEntity> for PromoCounters {
    fn from(e: CountersEntity) -> Self {
        Self {
            like_count: e.like_count,
            comment_count: e.comment_count,
            use_count: e.use_count,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ViewerFlagsEntity {
    pub is_liked: bool,
    pub is_activated: bool,
}

impl From<ViewerFlagsEntity> for ViewerFlags {
    fn from(e: ViewerFlagsEntity) -> Self {
        Self {
            is_liked: e.is_liked,
            is_activated: e.is_activated,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CountryCountEntity {
    pub country: String,
    pub activations_count: i64,
}

impl From<CountryCountEntity> for CountryActivations {
    fn from(e: CountryCountEntity) -> Self {
        Self {
            country: e.country,
            activations_count: e.activations_count,
        }
    }
}
