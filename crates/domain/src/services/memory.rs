//! In-memory [`PromoCodeStore`] used by tests and local tooling.
//!
//! A single async mutex guards every record, which serializes consumption
//! the same way the row lock does in Postgres.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, Utc};
use shared::pagination::Page;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::activity::is_active;
use super::store::PromoCodeStore;
use super::targeting::{eligible, in_category};
use crate::error::StoreError;
use crate::models::{
    Comment, CommentAuthor, CommentView, FeedQuery, Listing, OwnerListQuery, OwnerSort, PromoCode,
    PromoCounters, Redeemer, Redemption, UsageStatistics, Use, UserProfile, ViewerFlags,
};

#[derive(Default)]
struct State {
    codes: HashMap<Uuid, PromoCode>,
    users: HashMap<Uuid, UserProfile>,
    likes: HashSet<(Uuid, Uuid)>,
    comments: Vec<Comment>,
    uses: Vec<Use>,
}

impl State {
    fn view(&self, comment: &Comment) -> Option<CommentView> {
        let author = self.users.get(&comment.author_id)?;
        Some(CommentView {
            id: comment.id,
            text: comment.text.clone(),
            date: comment.created_at,
            author: CommentAuthor {
                id: author.id,
                name: author.name.clone(),
                surname: author.surname.clone(),
                avatar_url: author.avatar_url.clone().filter(|u| !u.is_empty()),
            },
        })
    }
}

#[derive(Default)]
pub struct InMemoryPromoCodeStore {
    state: Mutex<State>,
}

impl InMemoryPromoCodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user profile for targeting and comment authors.
    pub async fn add_user(&self, profile: UserProfile) {
        self.state.lock().await.users.insert(profile.id, profile);
    }

    pub async fn remove_user(&self, user_id: Uuid) {
        self.state.lock().await.users.remove(&user_id);
    }

    /// All recorded uses in insertion order.
    pub async fn uses(&self) -> Vec<Use> {
        self.state.lock().await.uses.clone()
    }
}

/// Orders owner listings. `None` dates sort last under either key; ties fall
/// back to newest first.
fn owner_order(a: &PromoCode, b: &PromoCode, sort: Option<OwnerSort>) -> Ordering {
    let newest_first = b.created_at.cmp(&a.created_at);
    let primary = match sort {
        None => Ordering::Equal,
        Some(OwnerSort::ActiveFrom) => nulls_last(a.active_from, b.active_from, |x, y| y.cmp(&x)),
        Some(OwnerSort::ActiveUntil) => {
            nulls_last(a.active_until, b.active_until, |x, y| x.cmp(&y))
        }
    };
    primary.then(newest_first)
}

fn nulls_last(
    a: Option<NaiveDate>,
    b: Option<NaiveDate>,
    cmp: impl Fn(NaiveDate, NaiveDate) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn matches_countries(code: &PromoCode, countries: &[String]) -> bool {
    if countries.is_empty() {
        return true;
    }
    match code.target.country_lower() {
        Some(c) => countries.contains(&c),
        None => true,
    }
}

fn matches_feed(code: &PromoCode, query: &FeedQuery, today: NaiveDate) -> bool {
    if let Some(category) = &query.category {
        if !in_category(&code.target, category) {
            return false;
        }
    }
    if !eligible(&code.target, query.age, &query.country) {
        return false;
    }
    match query.active {
        Some(wanted) => is_active(code, today) == wanted,
        None => true,
    }
}

fn paginate<T>(items: Vec<T>, page: Page) -> Listing<T> {
    let total = items.len() as i64;
    Listing::new(page.apply(items), total)
}

#[async_trait::async_trait]
impl PromoCodeStore for InMemoryPromoCodeStore {
    async fn insert(&self, code: &PromoCode) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if state.codes.contains_key(&code.id) {
            return Err(StoreError::Conflict);
        }
        state.codes.insert(code.id, code.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<PromoCode, StoreError> {
        self.state
            .lock()
            .await
            .codes
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, code: &PromoCode) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let existing = state.codes.get_mut(&code.id).ok_or(StoreError::NotFound)?;

        if let (
            Redemption::Common { used_count, .. },
            Redemption::Common { max_count: new_max, .. },
        ) = (&existing.redemption, &code.redemption)
        {
            if *new_max < *used_count {
                return Err(StoreError::QuotaBelowUsage);
            }
        }

        existing.description = code.description.clone();
        existing.image_url = code.image_url.clone();
        existing.target = code.target.clone();
        existing.active_from = code.active_from;
        existing.active_until = code.active_until;

        if let (
            Redemption::Common { max_count, .. },
            Redemption::Common {
                max_count: new_max, ..
            },
        ) = (&mut existing.redemption, &code.redemption)
        {
            *max_count = *new_max;
        }
        Ok(())
    }

    async fn list_by_company(
        &self,
        company_id: Uuid,
        query: &OwnerListQuery,
    ) -> Result<Listing<PromoCode>, StoreError> {
        let state = self.state.lock().await;
        let countries = query.countries_lower();

        let mut codes: Vec<PromoCode> = state
            .codes
            .values()
            .filter(|c| c.company_id == company_id && matches_countries(c, &countries))
            .cloned()
            .collect();
        codes.sort_by(|a, b| owner_order(a, b, query.sort_by));

        Ok(paginate(codes, query.page))
    }

    async fn feed(
        &self,
        query: &FeedQuery,
        today: NaiveDate,
    ) -> Result<Listing<PromoCode>, StoreError> {
        let state = self.state.lock().await;

        let mut codes: Vec<PromoCode> = state
            .codes
            .values()
            .filter(|c| matches_feed(c, query, today))
            .cloned()
            .collect();
        codes.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(paginate(codes, query.page))
    }

    async fn consume(
        &self,
        promo_id: Uuid,
        redeemer: &Redeemer,
        today: NaiveDate,
    ) -> Result<Option<String>, StoreError> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let code = state.codes.get_mut(&promo_id).ok_or(StoreError::NotFound)?;
        if !is_active(code, today) {
            return Ok(None);
        }
        let Some(value) = code.redemption.take_unit() else {
            return Ok(None);
        };

        state.uses.push(Use {
            id: Uuid::new_v4(),
            promo_id,
            user_id: redeemer.user_id,
            value: value.clone(),
            country: redeemer.country.clone(),
            created_at: Utc::now(),
        });
        Ok(Some(value))
    }

    async fn counters(&self, promo_id: Uuid) -> Result<PromoCounters, StoreError> {
        let state = self.state.lock().await;
        Ok(PromoCounters {
            like_count: state.likes.iter().filter(|(p, _)| *p == promo_id).count() as i64,
            comment_count: state
                .comments
                .iter()
                .filter(|c| {
                    c.promo_id == promo_id && state.users.contains_key(&c.author_id)
                })
                .count() as i64,
            use_count: state.uses.iter().filter(|u| u.promo_id == promo_id).count() as i64,
        })
    }

    async fn viewer_flags(&self, promo_id: Uuid, user_id: Uuid) -> Result<ViewerFlags, StoreError> {
        let state = self.state.lock().await;
        Ok(ViewerFlags {
            is_liked: state.likes.contains(&(promo_id, user_id)),
            is_activated: state
                .uses
                .iter()
                .any(|u| u.promo_id == promo_id && u.user_id == user_id),
        })
    }

    async fn usage_statistics(&self, promo_id: Uuid) -> Result<UsageStatistics, StoreError> {
        let state = self.state.lock().await;
        Ok(UsageStatistics::from_uses(
            state.uses.iter().filter(|u| u.promo_id == promo_id),
        ))
    }

    async fn use_history(
        &self,
        user_id: Uuid,
        page: Page,
    ) -> Result<Listing<PromoCode>, StoreError> {
        let state = self.state.lock().await;

        let mut uses: Vec<&Use> = state
            .uses
            .iter()
            .rev()
            .filter(|u| u.user_id == user_id)
            .collect();
        uses.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let codes = uses
            .into_iter()
            .filter_map(|u| state.codes.get(&u.promo_id).cloned())
            .collect();
        Ok(paginate(codes, page))
    }

    async fn insert_like(&self, promo_id: Uuid, user_id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if !state.codes.contains_key(&promo_id) {
            return Err(StoreError::NotFound);
        }
        if state.likes.insert((promo_id, user_id)) {
            Ok(())
        } else {
            Err(StoreError::Conflict)
        }
    }

    async fn delete_like(&self, promo_id: Uuid, user_id: Uuid) -> Result<(), StoreError> {
        if self.state.lock().await.likes.remove(&(promo_id, user_id)) {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if !state.codes.contains_key(&comment.promo_id) {
            return Err(StoreError::NotFound);
        }
        state.comments.push(comment.clone());
        Ok(())
    }

    async fn comment(&self, promo_id: Uuid, comment_id: Uuid) -> Result<CommentView, StoreError> {
        let state = self.state.lock().await;
        state
            .comments
            .iter()
            .find(|c| c.id == comment_id && c.promo_id == promo_id)
            .and_then(|c| state.view(c))
            .ok_or(StoreError::NotFound)
    }

    async fn comments(
        &self,
        promo_id: Uuid,
        page: Page,
    ) -> Result<Listing<CommentView>, StoreError> {
        let state = self.state.lock().await;

        let mut comments: Vec<&Comment> = state
            .comments
            .iter()
            .rev()
            .filter(|c| c.promo_id == promo_id)
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let views = comments.into_iter().filter_map(|c| state.view(c)).collect();
        Ok(paginate(views, page))
    }

    async fn update_comment_text(
        &self,
        promo_id: Uuid,
        comment_id: Uuid,
        text: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let comment = state
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id && c.promo_id == promo_id)
            .ok_or(StoreError::NotFound)?;
        comment.text = text.to_string();
        Ok(())
    }

    async fn delete_comment(&self, promo_id: Uuid, comment_id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let before = state.comments.len();
        state
            .comments
            .retain(|c| !(c.id == comment_id && c.promo_id == promo_id));
        if state.comments.len() == before {
            Err(StoreError::NotFound)
        } else {
            Ok(())
        }
    }

    async fn user_profile(&self, user_id: Uuid) -> Result<UserProfile, StoreError> {
        self.state
            .lock()
            .await
            .users
            .get(&user_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}
