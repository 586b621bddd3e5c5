//! Business, user and session entities.

use chrono::{DateTime, Utc};
use domain::models::account::Business;
use domain::models::UserProfile;
use shared::jwt::SubjectKind;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for subject_kind that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "subject_kind", rename_all = "lowercase")]
pub enum SubjectKindDb {
    Business,
    User,
}

impl From<SubjectKind> for SubjectKindDb {
    fn from(kind: SubjectKind) -> Self {
        match kind {
            SubjectKind::Business => SubjectKindDb::Business,
            SubjectKind::User => SubjectKindDb::User,
        }
    }
}

/// Database row mapping for the businesses table.
#[derive(Debug, Clone, FromRow)]
pub struct BusinessEntity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<BusinessEntity> for Business {
    fn from(e: BusinessEntity) -> Self {
        Self {
            id: e.id,
            name: e.name,
            email: e.email,
            password_hash: e.password_hash,
            created_at: e.created_at,
        }
    }
}

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub age: i32,
    pub country: String,
    pub avatar_url: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserEntity> for UserProfile {
    fn from(e: UserEntity) -> Self {
        Self {
            id: e.id,
            name: e.name,
            surname: e.surname,
            email: e.email,
            age: e.age,
            country: e.country,
            avatar_url: e.avatar_url,
        }
    }
}
