//! Application services and external integrations.

pub mod antifraud;
pub mod auth;
pub mod redis_cache;

pub use antifraud::HttpFraudDecisionClient;
pub use auth::{AuthError, AuthService, Principal};
pub use redis_cache::RedisAntifraudCache;
