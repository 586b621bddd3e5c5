//! Domain models for the promo code platform.

pub mod account;
pub mod listing;
pub mod promo_code;
pub mod social;
pub mod usage;
pub mod views;

pub use account::{Company, Redeemer, UserProfile};
pub use listing::{FeedQuery, Listing, OwnerListQuery, OwnerSort};
pub use promo_code::{Mode, PromoCode, Redemption, Target};
pub use social::{Comment, CommentAuthor, CommentView};
pub use usage::{CountryActivations, UsageStatistics, Use};
pub use views::{OwnerView, PromoCounters, TargetView, UserView, ViewerFlags};
