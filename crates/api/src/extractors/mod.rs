//! Custom Axum extractors.

pub mod auth;
pub mod json;
pub mod path;
pub mod query;

pub use auth::{BusinessAuth, UserAuth};
pub use json::ApiJson;
pub use path::ApiPath;
pub use query::ApiQuery;
