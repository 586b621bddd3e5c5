//! Likes and comments.

use std::sync::Arc;

use chrono::Utc;
use shared::pagination::Page;
use uuid::Uuid;

use super::store::PromoCodeStore;
use crate::error::{DomainError, StoreError};
use crate::models::{Comment, CommentView, Listing};

pub struct SocialEngine {
    store: Arc<dyn PromoCodeStore>,
}

impl SocialEngine {
    pub fn new(store: Arc<dyn PromoCodeStore>) -> Self {
        Self { store }
    }

    async fn ensure_code(&self, promo_id: Uuid) -> Result<(), DomainError> {
        match self.store.get(promo_id).await {
            Ok(_) => Ok(()),
            Err(StoreError::NotFound) => {
                Err(DomainError::NotFound("Promo code not found".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn authored(
        &self,
        user_id: Uuid,
        promo_id: Uuid,
        comment_id: Uuid,
    ) -> Result<CommentView, DomainError> {
        let comment = self.comment(promo_id, comment_id).await?;
        if comment.author.id != user_id {
            return Err(DomainError::Forbidden(
                "Only the author may change this comment".to_string(),
            ));
        }
        Ok(comment)
    }

    pub async fn like(&self, user_id: Uuid, promo_id: Uuid) -> Result<(), DomainError> {
        self.ensure_code(promo_id).await?;
        self.store
            .insert_like(promo_id, user_id)
            .await
            .map_err(|e| match e {
                StoreError::Conflict => DomainError::Conflict("Promo code already liked".to_string()),
                other => other.into(),
            })
    }

    pub async fn unlike(&self, user_id: Uuid, promo_id: Uuid) -> Result<(), DomainError> {
        self.store
            .delete_like(promo_id, user_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => DomainError::NotFound("Like not found".to_string()),
                other => other.into(),
            })
    }

    pub async fn add_comment(
        &self,
        user_id: Uuid,
        promo_id: Uuid,
        text: String,
    ) -> Result<CommentView, DomainError> {
        self.ensure_code(promo_id).await?;

        let comment = Comment {
            id: Uuid::new_v4(),
            promo_id,
            author_id: user_id,
            text,
            created_at: Utc::now(),
        };
        self.store.insert_comment(&comment).await?;
        tracing::debug!(promo_id = %promo_id, comment_id = %comment.id, "Comment added");

        self.comment(promo_id, comment.id).await
    }

    pub async fn comments(
        &self,
        promo_id: Uuid,
        page: Page,
    ) -> Result<Listing<CommentView>, DomainError> {
        self.ensure_code(promo_id).await?;
        Ok(self.store.comments(promo_id, page).await?)
    }

    pub async fn comment(&self, promo_id: Uuid, comment_id: Uuid) -> Result<CommentView, DomainError> {
        self.ensure_code(promo_id).await?;
        self.store
            .comment(promo_id, comment_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound => DomainError::NotFound("Comment not found".to_string()),
                other => other.into(),
            })
    }

    pub async fn edit_comment(
        &self,
        user_id: Uuid,
        promo_id: Uuid,
        comment_id: Uuid,
        text: String,
    ) -> Result<CommentView, DomainError> {
        self.authored(user_id, promo_id, comment_id).await?;
        self.store
            .update_comment_text(promo_id, comment_id, &text)
            .await?;
        self.comment(promo_id, comment_id).await
    }

    pub async fn delete_comment(
        &self,
        user_id: Uuid,
        promo_id: Uuid,
        comment_id: Uuid,
    ) -> Result<(), DomainError> {
        self.authored(user_id, promo_id, comment_id).await?;
        self.store.delete_comment(promo_id, comment_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PromoCode, Redemption, Target, UserProfile};
    use crate::services::memory::InMemoryPromoCodeStore;

    fn profile(name: &str) -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            name: name.into(),
            surname: "Ivanova".into(),
            email: format!("{}@example.com", name.to_lowercase()),
            age: 25,
            country: "ru".into(),
            avatar_url: Some("https://cdn.example.com/a.png".into()),
        }
    }

    async fn setup() -> (Arc<InMemoryPromoCodeStore>, SocialEngine, PromoCode) {
        let store = Arc::new(InMemoryPromoCodeStore::new());
        let code = PromoCode {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            company_name: "Bakery".into(),
            description: "Fresh bread every morning".into(),
            image_url: None,
            target: Target::default(),
            redemption: Redemption::common("BREAD".into(), 10),
            active_from: None,
            active_until: None,
            created_at: Utc::now(),
        };
        store.insert(&code).await.unwrap();
        (store.clone(), SocialEngine::new(store), code)
    }

    #[tokio::test]
    async fn test_like_twice_conflicts_and_unlike_missing_is_not_found() {
        let (_store, engine, code) = setup().await;
        let user = Uuid::new_v4();

        engine.like(user, code.id).await.unwrap();
        assert!(matches!(
            engine.like(user, code.id).await,
            Err(DomainError::Conflict(_))
        ));

        engine.unlike(user, code.id).await.unwrap();
        assert!(matches!(
            engine.unlike(user, code.id).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_like_missing_code() {
        let (_store, engine, _code) = setup().await;
        assert!(matches!(
            engine.like(Uuid::new_v4(), Uuid::new_v4()).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_comment_lifecycle() {
        let (store, engine, code) = setup().await;
        let anna = profile("Anna");
        store.add_user(anna.clone()).await;

        let created = engine
            .add_comment(anna.id, code.id, "Tasty and cheap bread".into())
            .await
            .unwrap();
        assert_eq!(created.author.id, anna.id);
        assert_eq!(created.author.name, "Anna");

        let edited = engine
            .edit_comment(anna.id, code.id, created.id, "Even better than before".into())
            .await
            .unwrap();
        assert_eq!(edited.text, "Even better than before");
        assert_eq!(edited.date, created.date);

        engine.delete_comment(anna.id, code.id, created.id).await.unwrap();
        assert!(matches!(
            engine.comment(code.id, created.id).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_only_author_may_edit_or_delete() {
        let (store, engine, code) = setup().await;
        let anna = profile("Anna");
        let boris = profile("Boris");
        store.add_user(anna.clone()).await;
        store.add_user(boris.clone()).await;

        let c = engine
            .add_comment(anna.id, code.id, "Tasty and cheap bread".into())
            .await
            .unwrap();

        assert!(matches!(
            engine
                .edit_comment(boris.id, code.id, c.id, "Hijacked comment text".into())
                .await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            engine.delete_comment(boris.id, code.id, c.id).await,
            Err(DomainError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_comments_newest_first_and_skip_unknown_authors() {
        let (store, engine, code) = setup().await;
        let anna = profile("Anna");
        let ghost = profile("Ghost");
        store.add_user(anna.clone()).await;
        store.add_user(ghost.clone()).await;

        let first = engine
            .add_comment(anna.id, code.id, "First comment text".into())
            .await
            .unwrap();
        engine
            .add_comment(ghost.id, code.id, "Comment by a ghost".into())
            .await
            .unwrap();
        let third = engine
            .add_comment(anna.id, code.id, "Third comment text".into())
            .await
            .unwrap();
        store.remove_user(ghost.id).await;

        let listing = engine.comments(code.id, Page::unlimited()).await.unwrap();
        let ids: Vec<Uuid> = listing.items.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![third.id, first.id]);
        assert_eq!(listing.total, 2);

        let page = engine.comments(code.id, Page::new(Some(1), 1)).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, first.id);
    }

    #[tokio::test]
    async fn test_comment_on_missing_code() {
        let (_store, engine, _code) = setup().await;
        assert!(matches!(
            engine
                .add_comment(Uuid::new_v4(), Uuid::new_v4(), "Some comment text".into())
                .await,
            Err(DomainError::NotFound(_))
        ));
    }
}
