//! Storage contract for promo codes and everything scoped by a promo id.

use chrono::NaiveDate;
use shared::pagination::Page;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{
    Comment, CommentView, FeedQuery, Listing, OwnerListQuery, PromoCode, PromoCounters, Redeemer,
    UsageStatistics, UserProfile, ViewerFlags,
};

/// Single source of truth for promo codes, likes, comments and uses.
///
/// Ownership and authorship checks belong to the engines, not the store.
#[async_trait::async_trait]
pub trait PromoCodeStore: Send + Sync {
    async fn insert(&self, code: &PromoCode) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<PromoCode, StoreError>;

    /// Persists the editable fields of a code: description, image, target,
    /// dates and the COMMON quota.
    async fn update(&self, code: &PromoCode) -> Result<(), StoreError>;

    async fn list_by_company(
        &self,
        company_id: Uuid,
        query: &OwnerListQuery,
    ) -> Result<Listing<PromoCode>, StoreError>;

    async fn feed(&self, query: &FeedQuery, today: NaiveDate)
        -> Result<Listing<PromoCode>, StoreError>;

    /// Atomically takes one unit of capacity and records the use.
    ///
    /// Activity is re-checked while the code is locked. `Ok(None)` means the
    /// code ran out (or left its window) before this caller got the lock.
    async fn consume(
        &self,
        promo_id: Uuid,
        redeemer: &Redeemer,
        today: NaiveDate,
    ) -> Result<Option<String>, StoreError>;

    async fn counters(&self, promo_id: Uuid) -> Result<PromoCounters, StoreError>;

    async fn viewer_flags(&self, promo_id: Uuid, user_id: Uuid) -> Result<ViewerFlags, StoreError>;

    async fn usage_statistics(&self, promo_id: Uuid) -> Result<UsageStatistics, StoreError>;

    /// Codes the user redeemed, most recent use first. One entry per use.
    async fn use_history(&self, user_id: Uuid, page: Page)
        -> Result<Listing<PromoCode>, StoreError>;

    /// Fails with `Conflict` when the like already exists.
    async fn insert_like(&self, promo_id: Uuid, user_id: Uuid) -> Result<(), StoreError>;

    /// Fails with `NotFound` when there is no like to remove.
    async fn delete_like(&self, promo_id: Uuid, user_id: Uuid) -> Result<(), StoreError>;

    async fn insert_comment(&self, comment: &Comment) -> Result<(), StoreError>;

    /// `NotFound` when the comment is missing or its author is gone.
    async fn comment(&self, promo_id: Uuid, comment_id: Uuid) -> Result<CommentView, StoreError>;

    /// Newest first. Comments whose author cannot be resolved are skipped.
    async fn comments(
        &self,
        promo_id: Uuid,
        page: Page,
    ) -> Result<Listing<CommentView>, StoreError>;

    async fn update_comment_text(
        &self,
        promo_id: Uuid,
        comment_id: Uuid,
        text: &str,
    ) -> Result<(), StoreError>;

    async fn delete_comment(&self, promo_id: Uuid, comment_id: Uuid) -> Result<(), StoreError>;

    async fn user_profile(&self, user_id: Uuid) -> Result<UserProfile, StoreError>;
}
