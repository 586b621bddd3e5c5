//! Client-facing projections of promo codes.
//!
//! Optional fields that are absent, empty strings, or empty containers are
//! omitted from the JSON. `target` is the only object allowed to serialize
//! as `{}`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::promo_code::{Mode, PromoCode, Redemption, Target};

/// Aggregate counters of a promo code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromoCounters {
    pub like_count: i64,
    pub comment_count: i64,
    pub use_count: i64,
}

/// Per-caller flags shown in the user view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewerFlags {
    pub is_liked: bool,
    pub is_activated: bool,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_from: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_until: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

impl From<&Target> for TargetView {
    fn from(t: &Target) -> Self {
        Self {
            age_from: t.age_from,
            age_until: t.age_until,
            country: non_empty(&t.country),
            categories: t.categories.clone(),
        }
    }
}

/// View of a promo code for its owning business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerView {
    pub promo_id: Uuid,
    pub company_id: Uuid,
    pub company_name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub target: TargetView,
    pub max_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_until: Option<NaiveDate>,
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_common: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_unique: Option<Vec<String>>,
    pub like_count: i64,
    pub used_count: i64,
    pub active: bool,
}

impl OwnerView {
    pub fn project(code: &PromoCode, counters: PromoCounters, active: bool) -> Self {
        let (promo_common, promo_unique) = match &code.redemption {
            Redemption::Common { value, .. } => (Some(value.clone()).filter(|v| !v.is_empty()), None),
            Redemption::Unique { pool, .. } => {
                (None, Some(pool.clone()).filter(|p| !p.is_empty()))
            }
        };

        Self {
            promo_id: code.id,
            company_id: code.company_id,
            company_name: code.company_name.clone(),
            description: code.description.clone(),
            image_url: non_empty(&code.image_url),
            target: TargetView::from(&code.target),
            max_count: code.redemption.display_max_count(),
            active_from: code.active_from,
            active_until: code.active_until,
            mode: code.mode(),
            promo_common,
            promo_unique,
            like_count: counters.like_count,
            used_count: counters.use_count,
            active,
        }
    }
}

/// View of a promo code for an end user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub promo_id: Uuid,
    pub company_id: Uuid,
    pub company_name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub active: bool,
    pub is_activated_by_user: bool,
    pub like_count: i64,
    pub is_liked_by_user: bool,
    pub comment_count: i64,
}

impl UserView {
    pub fn project(
        code: &PromoCode,
        counters: PromoCounters,
        flags: ViewerFlags,
        active: bool,
    ) -> Self {
        Self {
            promo_id: code.id,
            company_id: code.company_id,
            company_name: code.company_name.clone(),
            description: code.description.clone(),
            image_url: non_empty(&code.image_url),
            active,
            is_activated_by_user: flags.is_activated,
            like_count: counters.like_count,
            is_liked_by_user: flags.is_liked,
            comment_count: counters.comment_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn code(redemption: Redemption) -> PromoCode {
        PromoCode {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            company_name: "Coffee House".into(),
            description: "Free cappuccino on Fridays".into(),
            image_url: Some(String::new()),
            target: Target::default(),
            redemption,
            active_from: None,
            active_until: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_view_omits_empty_fields() {
        let view = OwnerView::project(
            &code(Redemption::common("COFFEE".into(), 5)),
            PromoCounters::default(),
            true,
        );
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["target"], serde_json::json!({}));
        assert!(json.get("image_url").is_none());
        assert!(json.get("active_from").is_none());
        assert!(json.get("active_until").is_none());
        assert!(json.get("promo_unique").is_none());
        assert_eq!(json["promo_common"], "COFFEE");
        assert_eq!(json["mode"], "COMMON");
        assert_eq!(json["max_count"], 5);
    }

    #[test]
    fn test_owner_view_unique_reports_full_pool() {
        let mut redemption = Redemption::unique(vec!["AAA".into(), "BBB".into()]);
        redemption.take_unit();

        let view = OwnerView::project(
            &code(redemption),
            PromoCounters {
                use_count: 1,
                ..Default::default()
            },
            true,
        );
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["max_count"], 1);
        assert_eq!(json["promo_unique"], serde_json::json!(["AAA", "BBB"]));
        assert_eq!(json["used_count"], 1);
        assert!(json.get("promo_common").is_none());
    }

    #[test]
    fn test_owner_view_serializes_dates() {
        let mut c = code(Redemption::common("COFFEE".into(), 5));
        c.active_until = NaiveDate::from_ymd_opt(2025, 3, 1);
        c.target.categories = vec!["food".into()];
        let json = serde_json::to_value(OwnerView::project(&c, Default::default(), false)).unwrap();
        assert_eq!(json["active_until"], "2025-03-01");
        assert_eq!(json["target"]["categories"], serde_json::json!(["food"]));
    }

    #[test]
    fn test_user_view_fields() {
        let c = code(Redemption::common("COFFEE".into(), 5));
        let view = UserView::project(
            &c,
            PromoCounters {
                like_count: 3,
                comment_count: 2,
                use_count: 9,
            },
            ViewerFlags {
                is_liked: true,
                is_activated: false,
            },
            true,
        );
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["like_count"], 3);
        assert_eq!(json["comment_count"], 2);
        assert_eq!(json["is_liked_by_user"], true);
        assert_eq!(json["is_activated_by_user"], false);
        assert!(json.get("image_url").is_none());
        assert!(json.get("used_count").is_none());
    }
}
