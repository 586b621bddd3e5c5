//! Query descriptors and paginated results.

use serde::{Deserialize, Serialize};
use shared::pagination::Page;

/// A page of results plus the total number of matches before pagination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Listing<T> {
    pub fn new(items: Vec<T>, total: i64) -> Self {
        Self { items, total }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Listing<U> {
        Listing {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

/// Sort keys accepted by the owner listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerSort {
    /// `active_from` descending.
    ActiveFrom,
    /// `active_until` ascending.
    ActiveUntil,
}

/// Owner listing filter. Countries are compared lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerListQuery {
    pub page: Page,
    pub sort_by: Option<OwnerSort>,
    pub countries: Vec<String>,
}

impl OwnerListQuery {
    pub fn countries_lower(&self) -> Vec<String> {
        self.countries.iter().map(|c| c.to_lowercase()).collect()
    }
}

/// User feed filter. `age` and `country` come from the caller's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub page: Page,
    pub category: Option<String>,
    pub active: Option<bool>,
    pub age: i32,
    pub country: String,
}
