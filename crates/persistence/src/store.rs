//! PostgreSQL implementation of the promo code store.

use chrono::NaiveDate;
use domain::models::{
    Comment, CommentView, CountryActivations, FeedQuery, Listing, OwnerListQuery, PromoCode,
    PromoCounters, Redeemer, UsageStatistics, UserProfile, ViewerFlags,
};
use domain::services::PromoCodeStore;
use domain::StoreError;
use shared::pagination::Page;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::store_error;
use crate::repositories::{AccountRepository, PromoCodeRepository};

fn expect_one(rows: u64) -> Result<(), StoreError> {
    if rows == 0 {
        Err(StoreError::NotFound)
    } else {
        Ok(())
    }
}

/// Store backed by the promo_codes table and its satellites.
#[derive(Clone)]
pub struct PgPromoCodeStore {
    promos: PromoCodeRepository,
    accounts: AccountRepository,
}

impl PgPromoCodeStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            promos: PromoCodeRepository::new(pool.clone()),
            accounts: AccountRepository::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl PromoCodeStore for PgPromoCodeStore {
    async fn insert(&self, code: &PromoCode) -> Result<(), StoreError> {
        self.promos.insert(code).await.map_err(store_error)
    }

    async fn get(&self, id: Uuid) -> Result<PromoCode, StoreError> {
        self.promos
            .find_by_id(id)
            .await
            .map_err(store_error)?
            .map(PromoCode::from)
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, code: &PromoCode) -> Result<(), StoreError> {
        let rows = self.promos.update(code).await.map_err(store_error)?;
        if rows > 0 {
            return Ok(());
        }
        match self.promos.find_by_id(code.id).await.map_err(store_error)? {
            Some(_) => Err(StoreError::QuotaBelowUsage),
            None => Err(StoreError::NotFound),
        }
    }

    async fn list_by_company(
        &self,
        company_id: Uuid,
        query: &OwnerListQuery,
    ) -> Result<Listing<PromoCode>, StoreError> {
        let countries = query.countries_lower();
        let rows = self
            .promos
            .list_by_company(
                company_id,
                &countries,
                query.sort_by,
                query.page.limit,
                query.page.offset,
            )
            .await
            .map_err(store_error)?;
        let total = self
            .promos
            .count_by_company(company_id, &countries)
            .await
            .map_err(store_error)?;
        Ok(Listing::new(rows.into_iter().map(PromoCode::from).collect(), total))
    }

    async fn feed(
        &self,
        query: &FeedQuery,
        today: NaiveDate,
    ) -> Result<Listing<PromoCode>, StoreError> {
        let category = query.category.as_ref().map(|c| c.to_lowercase());
        let country = query.country.to_lowercase();
        let rows = self
            .promos
            .feed(
                category.as_deref(),
                query.age,
                &country,
                query.active,
                today,
                query.page.limit,
                query.page.offset,
            )
            .await
            .map_err(store_error)?;
        let total = self
            .promos
            .count_feed(category.as_deref(), query.age, &country, query.active, today)
            .await
            .map_err(store_error)?;
        Ok(Listing::new(rows.into_iter().map(PromoCode::from).collect(), total))
    }

    async fn consume(
        &self,
        promo_id: Uuid,
        redeemer: &Redeemer,
        today: NaiveDate,
    ) -> Result<Option<String>, StoreError> {
        self.promos
            .consume(promo_id, redeemer, today)
            .await
            .map_err(store_error)
    }

    async fn counters(&self, promo_id: Uuid) -> Result<PromoCounters, StoreError> {
        self.promos
            .counters(promo_id)
            .await
            .map(PromoCounters::from)
            .map_err(store_error)
    }

    async fn viewer_flags(&self, promo_id: Uuid, user_id: Uuid) -> Result<ViewerFlags, StoreError> {
        self.promos
            .viewer_flags(promo_id, user_id)
            .await
            .map(ViewerFlags::from)
            .map_err(store_error)
    }

    async fn usage_statistics(&self, promo_id: Uuid) -> Result<UsageStatistics, StoreError> {
        let countries: Vec<CountryActivations> = self
            .promos
            .activations_by_country(promo_id)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(CountryActivations::from)
            .collect();
        Ok(UsageStatistics {
            activations_count: countries.iter().map(|c| c.activations_count).sum(),
            countries,
        })
    }

    async fn use_history(
        &self,
        user_id: Uuid,
        page: Page,
    ) -> Result<Listing<PromoCode>, StoreError> {
        let rows = self
            .promos
            .use_history(user_id, page.limit, page.offset)
            .await
            .map_err(store_error)?;
        let total = self
            .promos
            .count_uses_by_user(user_id)
            .await
            .map_err(store_error)?;
        Ok(Listing::new(rows.into_iter().map(PromoCode::from).collect(), total))
    }

    async fn insert_like(&self, promo_id: Uuid, user_id: Uuid) -> Result<(), StoreError> {
        self.promos
            .insert_like(promo_id, user_id)
            .await
            .map_err(store_error)
    }

    async fn delete_like(&self, promo_id: Uuid, user_id: Uuid) -> Result<(), StoreError> {
        expect_one(
            self.promos
                .delete_like(promo_id, user_id)
                .await
                .map_err(store_error)?,
        )
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), StoreError> {
        self.promos
            .insert_comment(comment)
            .await
            .map_err(store_error)
    }

    async fn comment(&self, promo_id: Uuid, comment_id: Uuid) -> Result<CommentView, StoreError> {
        self.promos
            .find_comment(promo_id, comment_id)
            .await
            .map_err(store_error)?
            .map(CommentView::from)
            .ok_or(StoreError::NotFound)
    }

    async fn comments(
        &self,
        promo_id: Uuid,
        page: Page,
    ) -> Result<Listing<CommentView>, StoreError> {
        let rows = self
            .promos
            .list_comments(promo_id, page.limit, page.offset)
            .await
            .map_err(store_error)?;
        let total = self
            .promos
            .count_comments(promo_id)
            .await
            .map_err(store_error)?;
        Ok(Listing::new(
            rows.into_iter().map(CommentView::from).collect(),
            total,
        ))
    }

    async fn update_comment_text(
        &self,
        promo_id: Uuid,
        comment_id: Uuid,
        text: &str,
    ) -> Result<(), StoreError> {
        expect_one(
            self.promos
                .update_comment_text(promo_id, comment_id, text)
                .await
                .map_err(store_error)?,
        )
    }

    async fn delete_comment(&self, promo_id: Uuid, comment_id: Uuid) -> Result<(), StoreError> {
        expect_one(
            self.promos
                .delete_comment(promo_id, comment_id)
                .await
                .map_err(store_error)?,
        )
    }

    async fn user_profile(&self, user_id: Uuid) -> Result<UserProfile, StoreError> {
        self.accounts
            .find_user_by_id(user_id)
            .await
            .map_err(store_error)?
            .map(UserProfile::from)
            .ok_or(StoreError::NotFound)
    }
}
