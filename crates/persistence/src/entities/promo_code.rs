//! Promo code entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{Mode, PromoCode, Redemption, Target};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for promo_mode that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "promo_mode", rename_all = "UPPERCASE")]
pub enum PromoModeDb {
    Common,
    Unique,
}

impl From<PromoModeDb> for Mode {
    fn from(db: PromoModeDb) -> Self {
        match db {
            PromoModeDb::Common => Mode::Common,
            PromoModeDb::Unique => Mode::Unique,
        }
    }
}

impl From<Mode> for PromoModeDb {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Common => PromoModeDb::Common,
            Mode::Unique => PromoModeDb::Unique,
        }
    }
}

/// Database row mapping for the promo_codes table.
#[derive(Debug, Clone, FromRow)]
pub struct PromoCodeEntity {
    pub id: Uuid,
    pub company_id: Uuid,
    pub company_name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub mode: PromoModeDb,
    pub max_count: i32,
    pub used_count: i32,
    pub promo: Vec<String>,
    pub available_promo: Option<Vec<String>>,
    pub target_age_from: Option<i32>,
    pub target_age_until: Option<i32>,
    pub target_country: Option<String>,
    pub target_categories: Vec<String>,
    pub active_from: Option<NaiveDate>,
    pub active_until: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<PromoCodeEntity> for PromoCode {
    fn from(entity: PromoCodeEntity) -> Self {
        let redemption = match entity.mode {
            PromoModeDb::Common => Redemption::Common {
                value: entity.promo.into_iter().next().unwrap_or_default(),
                max_count: entity.max_count,
                used_count: entity.used_count,
            },
            PromoModeDb::Unique => Redemption::Unique {
                pool: entity.promo,
                available: entity.available_promo.unwrap_or_default(),
            },
        };

        Self {
            id: entity.id,
            company_id: entity.company_id,
            company_name: entity.company_name,
            description: entity.description,
            image_url: entity.image_url,
            target: Target {
                age_from: entity.target_age_from,
                age_until: entity.target_age_until,
                country: entity.target_country,
                categories: entity.target_categories,
            },
            redemption,
            active_from: entity.active_from,
            active_until: entity.active_until,
            created_at: entity.created_at,
        }
    }
}

/// Column values derived from a domain promo code for inserts and updates.
#[derive(Debug, Clone)]
pub struct PromoCodeColumns {
    pub mode: PromoModeDb,
    pub max_count: i32,
    pub used_count: i32,
    pub promo: Vec<String>,
    /// `None` for COMMON codes and for exhausted UNIQUE pools.
    pub available_promo: Option<Vec<String>>,
    pub target_country_lower: Option<String>,
    pub target_categories_lower: Vec<String>,
}

impl From<&PromoCode> for PromoCodeColumns {
    fn from(code: &PromoCode) -> Self {
        let (max_count, used_count, promo, available_promo) = match &code.redemption {
            Redemption::Common {
                value,
                max_count,
                used_count,
            } => (*max_count, *used_count, vec![value.clone()], None),
            Redemption::Unique { pool, available } => (
                1,
                0,
                pool.clone(),
                Some(available.clone()).filter(|a| !a.is_empty()),
            ),
        };

        Self {
            mode: code.mode().into(),
            max_count,
            used_count,
            promo,
            available_promo,
            target_country_lower: code.target.country_lower(),
            target_categories_lower: code.target.categories_lower(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(mode: PromoModeDb) -> PromoCodeEntity {
        PromoCodeEntity {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            company_name: "Coffee House".into(),
            description: "Free cappuccino on Fridays".into(),
            image_url: None,
            mode,
            max_count: 5,
            used_count: 2,
            promo: vec!["AAA".into(), "BBB".into()],
            available_promo: None,
            target_age_from: Some(18),
            target_age_until: None,
            target_country: Some("RU".into()),
            target_categories: vec!["Food".into()],
            active_from: None,
            active_until: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_common_entity_to_domain() {
        let code = PromoCode::from(entity(PromoModeDb::Common));
        assert_eq!(
            code.redemption,
            Redemption::Common {
                value: "AAA".into(),
                max_count: 5,
                used_count: 2
            }
        );
        assert_eq!(code.target.age_from, Some(18));
    }

    #[test]
    fn test_unique_entity_with_null_pool_is_exhausted() {
        let code = PromoCode::from(entity(PromoModeDb::Unique));
        assert!(!code.redemption.has_capacity());
        assert_eq!(code.mode(), Mode::Unique);
    }

    #[test]
    fn test_columns_from_domain() {
        let mut code = PromoCode::from(entity(PromoModeDb::Unique));
        code.redemption = Redemption::unique(vec!["AAA".into()]);
        let cols = PromoCodeColumns::from(&code);

        assert_eq!(cols.mode, PromoModeDb::Unique);
        assert_eq!(cols.max_count, 1);
        assert_eq!(cols.available_promo, Some(vec!["AAA".to_string()]));
        assert_eq!(cols.target_country_lower.as_deref(), Some("ru"));
        assert_eq!(cols.target_categories_lower, vec!["food".to_string()]);

        code.redemption.take_unit();
        assert_eq!(PromoCodeColumns::from(&code).available_promo, None);
    }
}
