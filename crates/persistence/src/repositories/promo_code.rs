//! Promo code repository: codes, likes, comments and uses.

use chrono::NaiveDate;
use domain::models::{Comment, OwnerSort, PromoCode, Redeemer};
use domain::services::is_active;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{
    CommentWithAuthorEntity, CountersEntity, CountryCountEntity, PromoCodeColumns,
    PromoCodeEntity, ViewerFlagsEntity,
};
use crate::metrics::{consume_outcome, record_consume, QueryTimer};

const PROMO_COLUMNS: &str = "id, company_id, company_name, description, image_url, mode, \
     max_count, used_count, promo, available_promo, target_age_from, target_age_until, \
     target_country, target_categories, active_from, active_until, created_at";

/// Same predicate as `domain::services::is_active`, evaluated in SQL against `$today`.
fn active_expr(today: &str) -> String {
    format!(
        "((CASE WHEN mode = 'UNIQUE' THEN COALESCE(cardinality(available_promo), 0) > 0 \
         ELSE used_count < max_count END) \
         AND (active_from IS NULL OR active_from <= {today}) \
         AND (active_until IS NULL OR active_until >= {today}))"
    )
}

const OWNER_FILTER: &str = "company_id = $1 \
     AND (cardinality($2::text[]) = 0 OR target_country_lower IS NULL \
          OR target_country_lower = ANY($2::text[]))";

fn feed_filter() -> String {
    format!(
        "($1::text IS NULL OR $1::text = ANY(target_categories_lower)) \
         AND (target_age_from IS NULL OR target_age_from <= $2) \
         AND (target_age_until IS NULL OR target_age_until >= $2) \
         AND (target_country_lower IS NULL OR target_country_lower = $3) \
         AND ($4::bool IS NULL OR {} = $4::bool)",
        active_expr("$5::date")
    )
}

fn sort_key(sort: Option<OwnerSort>) -> Option<&'static str> {
    sort.map(|s| match s {
        OwnerSort::ActiveFrom => "active_from",
        OwnerSort::ActiveUntil => "active_until",
    })
}

/// Repository for promo-code database operations.
#[derive(Clone)]
pub struct PromoCodeRepository {
    pool: PgPool,
}

impl PromoCodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, code: &PromoCode) -> Result<(), sqlx::Error> {
        let cols = PromoCodeColumns::from(code);
        let timer = QueryTimer::new("insert_promo_code");
        let result = sqlx::query(
            r#"
            INSERT INTO promo_codes (
                id, company_id, company_name, description, image_url, mode,
                max_count, used_count, promo, available_promo,
                target_age_from, target_age_until, target_country, target_country_lower,
                target_categories, target_categories_lower,
                active_from, active_until, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(code.id)
        .bind(code.company_id)
        .bind(&code.company_name)
        .bind(&code.description)
        .bind(&code.image_url)
        .bind(cols.mode)
        .bind(cols.max_count)
        .bind(cols.used_count)
        .bind(&cols.promo)
        .bind(&cols.available_promo)
        .bind(code.target.age_from)
        .bind(code.target.age_until)
        .bind(&code.target.country)
        .bind(&cols.target_country_lower)
        .bind(&code.target.categories)
        .bind(&cols.target_categories_lower)
        .bind(code.active_from)
        .bind(code.active_until)
        .bind(code.created_at)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PromoCodeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_promo_code_by_id");
        let result = sqlx::query_as::<_, PromoCodeEntity>(&format!(
            "SELECT {PROMO_COLUMNS} FROM promo_codes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Writes the editable fields. Redemption state other than the COMMON
    /// quota is left alone so concurrent consumes are not overwritten.
    ///
    /// A COMMON quota below the current used_count matches no row, so the
    /// comparison is made against the locked row rather than a snapshot.
    pub async fn update(&self, code: &PromoCode) -> Result<u64, sqlx::Error> {
        let cols = PromoCodeColumns::from(code);
        let timer = QueryTimer::new("update_promo_code");
        let result = sqlx::query(
            r#"
            UPDATE promo_codes
            SET description = $2,
                image_url = $3,
                target_age_from = $4,
                target_age_until = $5,
                target_country = $6,
                target_country_lower = $7,
                target_categories = $8,
                target_categories_lower = $9,
                active_from = $10,
                active_until = $11,
                max_count = CASE WHEN mode = 'COMMON' THEN $12 ELSE max_count END
            WHERE id = $1 AND (mode = 'UNIQUE' OR $12 >= used_count)
            "#,
        )
        .bind(code.id)
        .bind(&code.description)
        .bind(&code.image_url)
        .bind(code.target.age_from)
        .bind(code.target.age_until)
        .bind(&code.target.country)
        .bind(&cols.target_country_lower)
        .bind(&code.target.categories)
        .bind(&cols.target_categories_lower)
        .bind(code.active_from)
        .bind(code.active_until)
        .bind(cols.max_count)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }

    pub async fn list_by_company(
        &self,
        company_id: Uuid,
        countries_lower: &[String],
        sort: Option<OwnerSort>,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<PromoCodeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_company_promo_codes");
        let result = sqlx::query_as::<_, PromoCodeEntity>(&format!(
            r#"
            SELECT {PROMO_COLUMNS} FROM promo_codes
            WHERE {OWNER_FILTER}
            ORDER BY
                CASE WHEN $3::text = 'active_from' THEN active_from END DESC NULLS LAST,
                CASE WHEN $3::text = 'active_until' THEN active_until END ASC NULLS LAST,
                created_at DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(company_id)
        .bind(countries_lower)
        .bind(sort_key(sort))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn count_by_company(
        &self,
        company_id: Uuid,
        countries_lower: &[String],
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_company_promo_codes");
        let result = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM promo_codes WHERE {OWNER_FILTER}"
        ))
        .bind(company_id)
        .bind(countries_lower)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn feed(
        &self,
        category_lower: Option<&str>,
        age: i32,
        country_lower: &str,
        active: Option<bool>,
        today: NaiveDate,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<PromoCodeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("promo_feed");
        let result = sqlx::query_as::<_, PromoCodeEntity>(&format!(
            r#"
            SELECT {PROMO_COLUMNS} FROM promo_codes
            WHERE {}
            ORDER BY created_at DESC
            LIMIT $6 OFFSET $7
            "#,
            feed_filter()
        ))
        .bind(category_lower)
        .bind(age)
        .bind(country_lower)
        .bind(active)
        .bind(today)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn count_feed(
        &self,
        category_lower: Option<&str>,
        age: i32,
        country_lower: &str,
        active: Option<bool>,
        today: NaiveDate,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_promo_feed");
        let result = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM promo_codes WHERE {}",
            feed_filter()
        ))
        .bind(category_lower)
        .bind(age)
        .bind(country_lower)
        .bind(active)
        .bind(today)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Takes one unit under a row lock and records the use.
    ///
    /// `Ok(None)` when the code is exhausted or outside its window;
    /// `Err(RowNotFound)` when it does not exist. Timing and the outcome
    /// counter are recorded on every exit, errors included.
    pub async fn consume(
        &self,
        promo_id: Uuid,
        redeemer: &Redeemer,
        today: NaiveDate,
    ) -> Result<Option<String>, sqlx::Error> {
        let timer = QueryTimer::new("consume_promo_code");
        let result = self.consume_locked(promo_id, redeemer, today).await;
        timer.record();
        record_consume(consume_outcome(&result));
        result
    }

    async fn consume_locked(
        &self,
        promo_id: Uuid,
        redeemer: &Redeemer,
        today: NaiveDate,
    ) -> Result<Option<String>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query_as::<_, PromoCodeEntity>(&format!(
            "SELECT {PROMO_COLUMNS} FROM promo_codes WHERE id = $1 FOR UPDATE"
        ))
        .bind(promo_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(entity) = locked else {
            return Err(sqlx::Error::RowNotFound);
        };
        let mut code = PromoCode::from(entity);

        if !is_active(&code, today) {
            return Ok(None);
        }
        let Some(value) = code.redemption.take_unit() else {
            return Ok(None);
        };

        let cols = PromoCodeColumns::from(&code);
        sqlx::query(
            "UPDATE promo_codes SET used_count = $2, available_promo = $3 WHERE id = $1",
        )
        .bind(promo_id)
        .bind(cols.used_count)
        .bind(&cols.available_promo)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO promo_uses (id, promo_id, user_id, value, country, country_lower)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(promo_id)
        .bind(redeemer.user_id)
        .bind(&value)
        .bind(&redeemer.country)
        .bind(redeemer.country.to_lowercase())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(value))
    }

    pub async fn counters(&self, promo_id: Uuid) -> Result<CountersEntity, sqlx::Error> {
        let timer = QueryTimer::new("promo_counters");
        let result = sqlx::query_as::<_, CountersEntity>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM promo_likes WHERE promo_id = $1) AS like_count,
                (SELECT COUNT(*) FROM promo_comments c
                    JOIN users u ON u.id = c.author_id
                    WHERE c.promo_id = $1) AS comment_count,
                (SELECT COUNT(*) FROM promo_uses WHERE promo_id = $1) AS use_count
            "#,
        )
        .bind(promo_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn viewer_flags(
        &self,
        promo_id: Uuid,
        user_id: Uuid,
    ) -> Result<ViewerFlagsEntity, sqlx::Error> {
        let timer = QueryTimer::new("promo_viewer_flags");
        let result = sqlx::query_as::<_, ViewerFlagsEntity>(
            r#"
            SELECT
                EXISTS(SELECT 1 FROM promo_likes WHERE promo_id = $1 AND user_id = $2) AS is_liked,
                EXISTS(SELECT 1 FROM promo_uses WHERE promo_id = $1 AND user_id = $2) AS is_activated
            "#,
        )
        .bind(promo_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn activations_by_country(
        &self,
        promo_id: Uuid,
    ) -> Result<Vec<CountryCountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("promo_activations_by_country");
        let result = sqlx::query_as::<_, CountryCountEntity>(
            r#"
            SELECT country_lower AS country, COUNT(*) AS activations_count
            FROM promo_uses
            WHERE promo_id = $1
            GROUP BY country_lower
            ORDER BY country_lower ASC
            "#,
        )
        .bind(promo_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// One row per use, newest use first.
    pub async fn use_history(
        &self,
        user_id: Uuid,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<PromoCodeEntity>, sqlx::Error> {
        let columns = PROMO_COLUMNS
            .split(", ")
            .map(|c| format!("p.{}", c.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        let timer = QueryTimer::new("promo_use_history");
        let result = sqlx::query_as::<_, PromoCodeEntity>(&format!(
            r#"
            SELECT {columns}
            FROM promo_uses u
            JOIN promo_codes p ON p.id = u.promo_id
            WHERE u.user_id = $1
            ORDER BY u.created_at DESC, u.id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn count_uses_by_user(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_uses_by_user");
        let result =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM promo_uses WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await;
        timer.record();
        result
    }

    /// Fails with a unique violation when the like exists and a foreign key
    /// violation when the code does not.
    pub async fn insert_like(&self, promo_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_promo_like");
        let result = sqlx::query("INSERT INTO promo_likes (promo_id, user_id) VALUES ($1, $2)")
            .bind(promo_id)
            .bind(user_id)
            .execute(&self.pool)
            .await;
        timer.record();
        result.map(|_| ())
    }

    pub async fn delete_like(&self, promo_id: Uuid, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_promo_like");
        let result = sqlx::query("DELETE FROM promo_likes WHERE promo_id = $1 AND user_id = $2")
            .bind(promo_id)
            .bind(user_id)
            .execute(&self.pool)
            .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }

    pub async fn insert_comment(&self, comment: &Comment) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_promo_comment");
        let result = sqlx::query(
            r#"
            INSERT INTO promo_comments (id, promo_id, author_id, text, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(comment.id)
        .bind(comment.promo_id)
        .bind(comment.author_id)
        .bind(&comment.text)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    pub async fn find_comment(
        &self,
        promo_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<CommentWithAuthorEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_promo_comment");
        let result = sqlx::query_as::<_, CommentWithAuthorEntity>(
            r#"
            SELECT c.id, c.text, c.created_at, u.id AS author_id,
                   u.name AS author_name, u.surname AS author_surname,
                   u.avatar_url AS author_avatar_url
            FROM promo_comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.promo_id = $1 AND c.id = $2
            "#,
        )
        .bind(promo_id)
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn list_comments(
        &self,
        promo_id: Uuid,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<CommentWithAuthorEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_promo_comments");
        let result = sqlx::query_as::<_, CommentWithAuthorEntity>(
            r#"
            SELECT c.id, c.text, c.created_at, u.id AS author_id,
                   u.name AS author_name, u.surname AS author_surname,
                   u.avatar_url AS author_avatar_url
            FROM promo_comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.promo_id = $1
            ORDER BY c.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(promo_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn count_comments(&self, promo_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_promo_comments");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM promo_comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.promo_id = $1
            "#,
        )
        .bind(promo_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update_comment_text(
        &self,
        promo_id: Uuid,
        comment_id: Uuid,
        text: &str,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("update_promo_comment");
        let result =
            sqlx::query("UPDATE promo_comments SET text = $3 WHERE promo_id = $1 AND id = $2")
                .bind(promo_id)
                .bind(comment_id)
                .bind(text)
                .execute(&self.pool)
                .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }

    pub async fn delete_comment(&self, promo_id: Uuid, comment_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_promo_comment");
        let result = sqlx::query("DELETE FROM promo_comments WHERE promo_id = $1 AND id = $2")
            .bind(promo_id)
            .bind(comment_id)
            .execute(&self.pool)
            .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }
}
