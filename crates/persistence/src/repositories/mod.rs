//! Repository implementations for database operations.

pub mod account;
pub mod promo_code;

pub use account::{AccountRepository, NewUser};
pub use promo_code::PromoCodeRepository;
