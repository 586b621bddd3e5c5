//! Comments on promo codes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A stored comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: Uuid,
    pub promo_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Author projection resolved at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Comment as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub text: String,
    pub date: DateTime<Utc>,
    pub author: CommentAuthor,
}

/// Body of comment create and edit requests.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 10, max = 1000, message = "text must be 10-1000 characters"))]
    pub text: String,
}
