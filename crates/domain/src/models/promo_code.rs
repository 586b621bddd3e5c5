//! Promo code domain models and request DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::{
    validate_categories, validate_country, validate_http_url, validate_promo_unique,
};
use uuid::Uuid;
use validator::Validate;

/// Redemption mode of a promo code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    Common,
    Unique,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Common => "COMMON",
            Mode::Unique => "UNIQUE",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COMMON" => Ok(Mode::Common),
            "UNIQUE" => Ok(Mode::Unique),
            other => Err(format!("Unknown promo mode: {}", other)),
        }
    }
}

/// Audience filter. Every constraint is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub age_from: Option<i32>,
    pub age_until: Option<i32>,
    pub country: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl Target {
    pub fn country_lower(&self) -> Option<String> {
        self.country.as_ref().map(|c| c.to_lowercase())
    }

    pub fn categories_lower(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.to_lowercase()).collect()
    }

    /// Overwrites every field present in the patch and keeps the rest.
    pub fn merge(&mut self, patch: TargetRequest) {
        if patch.age_from.is_some() {
            self.age_from = patch.age_from;
        }
        if patch.age_until.is_some() {
            self.age_until = patch.age_until;
        }
        if patch.country.is_some() {
            self.country = patch.country;
        }
        if let Some(categories) = patch.categories {
            self.categories = categories;
        }
    }
}

impl From<TargetRequest> for Target {
    fn from(req: TargetRequest) -> Self {
        Self {
            age_from: req.age_from,
            age_until: req.age_until,
            country: req.country,
            categories: req.categories.unwrap_or_default(),
        }
    }
}

/// Mode-specific quota state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "UPPERCASE")]
pub enum Redemption {
    /// One shared value handed out up to `max_count` times.
    Common {
        value: String,
        max_count: i32,
        used_count: i32,
    },
    /// A pool of single-use values; `available` shrinks from the front.
    Unique {
        pool: Vec<String>,
        available: Vec<String>,
    },
}

impl Redemption {
    pub fn common(value: String, max_count: i32) -> Self {
        Redemption::Common {
            value,
            max_count,
            used_count: 0,
        }
    }

    pub fn unique(pool: Vec<String>) -> Self {
        Redemption::Unique {
            available: pool.clone(),
            pool,
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Redemption::Common { .. } => Mode::Common,
            Redemption::Unique { .. } => Mode::Unique,
        }
    }

    pub fn has_capacity(&self) -> bool {
        match self {
            Redemption::Common {
                max_count,
                used_count,
                ..
            } => used_count < max_count,
            Redemption::Unique { available, .. } => !available.is_empty(),
        }
    }

    /// Consumes one unit of capacity and returns the value handed out.
    pub fn take_unit(&mut self) -> Option<String> {
        match self {
            Redemption::Common {
                value,
                max_count,
                used_count,
            } => {
                if *used_count >= *max_count {
                    return None;
                }
                *used_count += 1;
                Some(value.clone())
            }
            Redemption::Unique { available, .. } => {
                if available.is_empty() {
                    None
                } else {
                    Some(available.remove(0))
                }
            }
        }
    }

    /// Quota shown to owners. UNIQUE codes always report 1.
    pub fn display_max_count(&self) -> i32 {
        match self {
            Redemption::Common { max_count, .. } => *max_count,
            Redemption::Unique { .. } => 1,
        }
    }
}

/// A promo code issued by a business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoCode {
    pub id: Uuid,
    pub company_id: Uuid,
    pub company_name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub target: Target,
    pub redemption: Redemption,
    pub active_from: Option<NaiveDate>,
    pub active_until: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl PromoCode {
    pub fn mode(&self) -> Mode {
        self.redemption.mode()
    }
}

/// Target block of create and edit requests.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TargetRequest {
    #[validate(range(min = 0, max = 100, message = "age_from must be between 0 and 100"))]
    pub age_from: Option<i32>,

    #[validate(range(min = 0, max = 100, message = "age_until must be between 0 and 100"))]
    pub age_until: Option<i32>,

    #[validate(custom(function = "validate_country"))]
    pub country: Option<String>,

    #[validate(custom(function = "validate_categories"))]
    pub categories: Option<Vec<String>>,
}

/// Request to create a promo code.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePromoCodeRequest {
    #[validate(length(min = 10, max = 300, message = "description must be 10-300 characters"))]
    pub description: String,

    #[validate(custom(function = "validate_http_url"))]
    pub image_url: Option<String>,

    #[validate(nested)]
    pub target: TargetRequest,

    #[validate(range(min = 0, max = 100000000, message = "max_count must be between 0 and 100000000"))]
    pub max_count: i32,

    pub active_from: Option<NaiveDate>,
    pub active_until: Option<NaiveDate>,

    pub mode: Mode,

    #[validate(length(min = 5, max = 30, message = "promo_common must be 5-30 characters"))]
    pub promo_common: Option<String>,

    #[validate(custom(function = "validate_promo_unique"))]
    pub promo_unique: Option<Vec<String>>,
}

/// Partial update of a promo code. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct EditPromoCodeRequest {
    #[validate(length(min = 10, max = 300, message = "description must be 10-300 characters"))]
    pub description: Option<String>,

    #[validate(custom(function = "validate_http_url"))]
    pub image_url: Option<String>,

    #[validate(nested)]
    pub target: Option<TargetRequest>,

    #[validate(range(min = 0, max = 100000000, message = "max_count must be between 0 and 100000000"))]
    pub max_count: Option<i32>,

    pub active_from: Option<NaiveDate>,
    pub active_until: Option<NaiveDate>,
}

/// Response after creating a promo code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePromoCodeResponse {
    pub id: Uuid,
}

/// Response after a successful redemption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivatePromoResponse {
    pub promo: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_take_unit_until_exhausted() {
        let mut r = Redemption::common("SPRING25".into(), 2);
        assert_eq!(r.take_unit().as_deref(), Some("SPRING25"));
        assert_eq!(r.take_unit().as_deref(), Some("SPRING25"));
        assert_eq!(r.take_unit(), None);
        assert!(matches!(r, Redemption::Common { used_count: 2, .. }));
        assert!(!r.has_capacity());
    }

    #[test]
    fn test_unique_take_unit_is_fifo() {
        let mut r = Redemption::unique(vec!["AAA".into(), "BBB".into()]);
        assert_eq!(r.take_unit().as_deref(), Some("AAA"));
        assert_eq!(r.take_unit().as_deref(), Some("BBB"));
        assert_eq!(r.take_unit(), None);

        match r {
            Redemption::Unique { pool, available } => {
                assert_eq!(pool.len(), 2);
                assert!(available.is_empty());
            }
            _ => panic!("expected unique"),
        }
    }

    #[test]
    fn test_zero_max_count_has_no_capacity() {
        assert!(!Redemption::common("NONE0".into(), 0).has_capacity());
    }

    #[test]
    fn test_display_max_count() {
        assert_eq!(Redemption::common("X".into(), 7).display_max_count(), 7);
        assert_eq!(
            Redemption::unique(vec!["a".into(), "b".into()]).display_max_count(),
            1
        );
    }

    #[test]
    fn test_mode_serialization() {
        assert_eq!(serde_json::to_string(&Mode::Common).unwrap(), "\"COMMON\"");
        assert_eq!(
            serde_json::from_str::<Mode>("\"UNIQUE\"").unwrap(),
            Mode::Unique
        );
        assert!(serde_json::from_str::<Mode>("\"unique\"").is_err());
        assert_eq!("COMMON".parse::<Mode>().unwrap(), Mode::Common);
    }

    #[test]
    fn test_target_merge_keeps_absent_fields() {
        let mut target = Target {
            age_from: Some(18),
            age_until: Some(30),
            country: Some("RU".into()),
            categories: vec!["food".into()],
        };

        target.merge(TargetRequest {
            age_until: Some(40),
            categories: Some(vec![]),
            ..Default::default()
        });

        assert_eq!(target.age_from, Some(18));
        assert_eq!(target.age_until, Some(40));
        assert_eq!(target.country.as_deref(), Some("RU"));
        assert!(target.categories.is_empty());
    }

    #[test]
    fn test_target_lower_shadows() {
        let target = Target {
            country: Some("Ru".into()),
            categories: vec!["Food".into(), "TRAVEL".into()],
            ..Default::default()
        };
        assert_eq!(target.country_lower().as_deref(), Some("ru"));
        assert_eq!(target.categories_lower(), vec!["food", "travel"]);
    }

    #[test]
    fn test_create_request_validation() {
        let json = serde_json::json!({
            "description": "Spring sale for everyone",
            "target": {"age_from": 10, "country": "us", "categories": ["food"]},
            "max_count": 10,
            "mode": "COMMON",
            "promo_common": "SPRING25",
            "active_from": "2025-01-01"
        });
        let req: CreatePromoCodeRequest = serde_json::from_value(json).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(
            req.active_from,
            Some(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
        );
    }

    #[test]
    fn test_create_request_rejects_bad_fields() {
        let json = serde_json::json!({
            "description": "short",
            "image_url": "not-a-url",
            "target": {"age_from": 101, "country": "usa"},
            "max_count": -1,
            "mode": "COMMON",
            "promo_common": "abc"
        });
        let req: CreatePromoCodeRequest = serde_json::from_value(json).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.errors();
        assert!(fields.contains_key("description"));
        assert!(fields.contains_key("image_url"));
        assert!(fields.contains_key("target"));
        assert!(fields.contains_key("max_count"));
        assert!(fields.contains_key("promo_common"));
    }

    #[test]
    fn test_edit_request_empty_is_valid() {
        let req: EditPromoCodeRequest = serde_json::from_str("{}").unwrap();
        assert!(req.validate().is_ok());
        assert!(req.target.is_none());
    }
}
