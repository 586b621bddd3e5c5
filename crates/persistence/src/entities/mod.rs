//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod account;
pub mod promo_code;
pub mod social;
pub mod usage;

pub use account::{BusinessEntity, SubjectKindDb, UserEntity};
pub use promo_code::{PromoCodeColumns, PromoCodeEntity, PromoModeDb};
pub use social::CommentWithAuthorEntity;
pub use usage::{CountersEntity, CountryCountEntity, ViewerFlagsEntity};
