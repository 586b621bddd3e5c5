//! Domain error taxonomy.

use thiserror::Error;

/// Errors raised by the promo code engines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors surfaced by a [`crate::services::PromoCodeStore`]. No driver error
/// crosses this boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists")]
    Conflict,

    /// A COMMON quota would drop below the redemptions already handed out.
    #[error("max_count below used_count")]
    QuotaBelowUsage,

    #[error("store failure: {0}")]
    Unknown(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => DomainError::NotFound("Resource not found".to_string()),
            StoreError::Conflict => DomainError::Conflict("Resource already exists".to_string()),
            StoreError::QuotaBelowUsage => DomainError::BadRequest(
                "max_count cannot be lower than used_count".to_string(),
            ),
            StoreError::Unknown(msg) => DomainError::Internal(msg),
        }
    }
}
