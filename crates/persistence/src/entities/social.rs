//! Comment entities.

use chrono::{DateTime, Utc};
use domain::models::{CommentAuthor, CommentView};
use sqlx::FromRow;
use uuid::Uuid;

/// Comment joined with its author row.
#[derive(Debug, Clone, FromRow)]
pub struct CommentWithAuthorEntity {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
    pub author_name: String,
    pub author_surname: String,
    pub author_avatar_url: Option<String>,
}

impl From<CommentWithAuthorEntity> for CommentView {
    fn from(entity: CommentWithAuthorEntity) -> Self {
        Self {
            id: entity.id,
            text: entity.text,
            date: entity.created_at,
            author: CommentAuthor {
                id: entity.author_id,
                name: entity.author_name,
                surname: entity.author_surname,
                avatar_url: entity.author_avatar_url.filter(|u| !u.is_empty()),
            },
        }
    }
}
