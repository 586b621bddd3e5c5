//! HTTP route handlers.

pub mod auth;
pub mod business_promo;
pub mod health;
pub mod user;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, Utc};
use domain::models::Listing;
use serde::{Deserialize, Serialize};
use shared::pagination::{Page, TOTAL_COUNT_HEADER};

use crate::error::ApiError;

/// `limit` and `offset` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageParams {
    /// Rejects negative values. `default_limit` applies when `limit` is absent.
    pub fn into_page(self, default_limit: Option<i64>) -> Result<Page, ApiError> {
        if self.limit.is_some_and(|l| l < 0) {
            return Err(ApiError::BadRequest("limit must not be negative".into()));
        }
        if self.offset.is_some_and(|o| o < 0) {
            return Err(ApiError::BadRequest("offset must not be negative".into()));
        }
        Ok(Page::new(
            self.limit.or(default_limit),
            self.offset.unwrap_or(0),
        ))
    }
}

/// Items as a JSON array with the pre-pagination total in `X-Total-Count`.
pub fn listed<T: Serialize>(listing: Listing<T>) -> Response {
    (
        [(TOTAL_COUNT_HEADER, listing.total.to_string())],
        Json(listing.items),
    )
        .into_response()
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
