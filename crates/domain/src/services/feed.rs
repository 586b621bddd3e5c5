//! Listings and single-code reads for owners and users.

use std::sync::Arc;

use chrono::NaiveDate;
use shared::pagination::Page;
use uuid::Uuid;

use super::activity::is_active;
use super::store::PromoCodeStore;
use crate::error::{DomainError, StoreError};
use crate::models::{
    FeedQuery, Listing, OwnerListQuery, OwnerView, PromoCode, UsageStatistics, UserProfile,
    UserView,
};

pub struct FeedEngine {
    store: Arc<dyn PromoCodeStore>,
}

fn not_found(e: StoreError) -> DomainError {
    match e {
        StoreError::NotFound => DomainError::NotFound("Promo code not found".to_string()),
        other => other.into(),
    }
}

impl FeedEngine {
    pub fn new(store: Arc<dyn PromoCodeStore>) -> Self {
        Self { store }
    }

    async fn owned(&self, company_id: Uuid, promo_id: Uuid) -> Result<PromoCode, DomainError> {
        let code = self.store.get(promo_id).await.map_err(not_found)?;
        if code.company_id != company_id {
            return Err(DomainError::Forbidden(
                "Promo code belongs to another company".to_string(),
            ));
        }
        Ok(code)
    }

    async fn owner_view(&self, code: &PromoCode, today: NaiveDate) -> Result<OwnerView, DomainError> {
        let counters = self.store.counters(code.id).await?;
        Ok(OwnerView::project(code, counters, is_active(code, today)))
    }

    async fn user_view(
        &self,
        code: &PromoCode,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<UserView, DomainError> {
        let counters = self.store.counters(code.id).await?;
        let flags = self.store.viewer_flags(code.id, user_id).await?;
        Ok(UserView::project(code, counters, flags, is_active(code, today)))
    }

    async fn user_views(
        &self,
        listing: Listing<PromoCode>,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<Listing<UserView>, DomainError> {
        let mut items = Vec::with_capacity(listing.items.len());
        for code in &listing.items {
            items.push(self.user_view(code, user_id, today).await?);
        }
        Ok(Listing::new(items, listing.total))
    }

    /// Codes of one business with optional country filter and sort key.
    pub async fn owner_list(
        &self,
        company_id: Uuid,
        query: &OwnerListQuery,
        today: NaiveDate,
    ) -> Result<Listing<OwnerView>, DomainError> {
        let listing = self.store.list_by_company(company_id, query).await?;
        let mut items = Vec::with_capacity(listing.items.len());
        for code in &listing.items {
            items.push(self.owner_view(code, today).await?);
        }
        Ok(Listing::new(items, listing.total))
    }

    pub async fn owner_get(
        &self,
        company_id: Uuid,
        promo_id: Uuid,
        today: NaiveDate,
    ) -> Result<OwnerView, DomainError> {
        let code = self.owned(company_id, promo_id).await?;
        self.owner_view(&code, today).await
    }

    /// Codes visible to the user, filtered by their age and country.
    pub async fn user_feed(
        &self,
        user: &UserProfile,
        page: Page,
        category: Option<String>,
        active: Option<bool>,
        today: NaiveDate,
    ) -> Result<Listing<UserView>, DomainError> {
        let query = FeedQuery {
            page,
            category: category.filter(|c| !c.is_empty()),
            active,
            age: user.age,
            country: user.country.clone(),
        };
        let listing = self.store.feed(&query, today).await?;
        self.user_views(listing, user.id, today).await
    }

    pub async fn user_get(
        &self,
        user_id: Uuid,
        promo_id: Uuid,
        today: NaiveDate,
    ) -> Result<UserView, DomainError> {
        let code = self.store.get(promo_id).await.map_err(not_found)?;
        self.user_view(&code, user_id, today).await
    }

    pub async fn usage_statistics(
        &self,
        company_id: Uuid,
        promo_id: Uuid,
    ) -> Result<UsageStatistics, DomainError> {
        self.owned(company_id, promo_id).await?;
        Ok(self.store.usage_statistics(promo_id).await?)
    }

    /// Codes the user has redeemed, newest redemption first.
    pub async fn history(
        &self,
        user_id: Uuid,
        page: Page,
        today: NaiveDate,
    ) -> Result<Listing<UserView>, DomainError> {
        let listing = self.store.use_history(user_id, page).await?;
        self.user_views(listing, user_id, today).await
    }
}
