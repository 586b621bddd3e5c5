//! Business, user and session repository.

use chrono::{DateTime, Utc};
use shared::jwt::SubjectKind;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{BusinessEntity, SubjectKindDb, UserEntity};
use crate::metrics::QueryTimer;

/// Fields of a new user row.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub surname: &'a str,
    pub email: &'a str,
    pub age: i32,
    pub country: &'a str,
    pub avatar_url: Option<&'a str>,
    pub password_hash: &'a str,
}

/// Repository for account-related database operations.
#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a business. A duplicate email surfaces as a unique violation.
    pub async fn create_business(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<BusinessEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_business");
        let result = sqlx::query_as::<_, BusinessEntity>(
            r#"
            INSERT INTO businesses (id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_business_by_email(
        &self,
        email: &str,
    ) -> Result<Option<BusinessEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_business_by_email");
        let result = sqlx::query_as::<_, BusinessEntity>(
            "SELECT id, name, email, password_hash, created_at FROM businesses WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_business_by_id(&self, id: Uuid) -> Result<Option<BusinessEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_business_by_id");
        let result = sqlx::query_as::<_, BusinessEntity>(
            "SELECT id, name, email, password_hash, created_at FROM businesses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn create_user(&self, user: NewUser<'_>) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_user");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (id, name, surname, email, age, country, avatar_url, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, surname, email, age, country, avatar_url, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.name)
        .bind(user.surname)
        .bind(user.email)
        .bind(user.age)
        .bind(user.country)
        .bind(user.avatar_url)
        .bind(user.password_hash)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, name, surname, email, age, country, avatar_url, password_hash, created_at
            FROM users WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, name, surname, email, age, country, avatar_url, password_hash, created_at
            FROM users WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Overwrites the mutable profile columns with already merged values.
    pub async fn update_user_profile(
        &self,
        id: Uuid,
        name: &str,
        surname: &str,
        avatar_url: Option<&str>,
        password_hash: &str,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_user_profile");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            UPDATE users
            SET name = $2, surname = $3, avatar_url = $4, password_hash = $5
            WHERE id = $1
            RETURNING id, name, surname, email, age, country, avatar_url, password_hash, created_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(surname)
        .bind(avatar_url)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Revokes every live session of the subject and opens a new one.
    pub async fn start_session(
        &self,
        session_id: Uuid,
        subject_id: Uuid,
        kind: SubjectKind,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("start_session");
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE sessions SET revoked_at = NOW() WHERE subject_id = $1 AND revoked_at IS NULL",
        )
        .bind(subject_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO sessions (id, subject_id, subject_kind, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(session_id)
        .bind(subject_id)
        .bind(SubjectKindDb::from(kind))
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(())
    }

    pub async fn is_session_active(
        &self,
        session_id: Uuid,
        subject_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("is_session_active");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM sessions
                WHERE id = $1 AND subject_id = $2
                  AND revoked_at IS NULL AND expires_at > NOW()
            )
            "#,
        )
        .bind(session_id)
        .bind(subject_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
