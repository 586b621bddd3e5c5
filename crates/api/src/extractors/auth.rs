//! Authenticated caller extractors.
//!
//! The auth middleware inserts these into request extensions; extracting one
//! on a route without that middleware yields 401.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::Company;
use uuid::Uuid;

use crate::error::ApiError;

/// Business caller. `company_id` is the business account id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessAuth {
    pub company_id: Uuid,
    pub email: String,
}

/// End-user caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAuth {
    pub user_id: Uuid,
    pub email: String,
}

impl BusinessAuth {
    /// Company record with its display name resolved by the caller.
    pub fn company(&self, name: String) -> Company {
        Company {
            id: self.company_id,
            name,
        }
    }
}

fn from_extensions<T: Clone + Send + Sync + 'static>(parts: &Parts) -> Result<T, ApiError> {
    parts
        .extensions
        .get::<T>()
        .cloned()
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".into()))
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for BusinessAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        from_extensions(parts)
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        from_extensions(parts)
    }
}
