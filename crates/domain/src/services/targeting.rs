//! Audience targeting.
//!
//! Redemption checks age and country only. Categories are matched by the
//! feed alone.

use crate::models::Target;

/// Whether a user of the given age and country is in the code's audience.
pub fn eligible(target: &Target, age: i32, country: &str) -> bool {
    if let Some(from) = target.age_from {
        if age < from {
            return false;
        }
    }
    if let Some(until) = target.age_until {
        if age > until {
            return false;
        }
    }
    match &target.country {
        Some(c) => c.eq_ignore_ascii_case(country),
        None => true,
    }
}

/// Whether the code is tagged with `category`, case-insensitively.
pub fn in_category(target: &Target, category: &str) -> bool {
    let wanted = category.to_lowercase();
    target.categories_lower().iter().any(|c| *c == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(age_from: Option<i32>, age_until: Option<i32>, country: Option<&str>) -> Target {
        Target {
            age_from,
            age_until,
            country: country.map(str::to_string),
            categories: vec![],
        }
    }

    #[test]
    fn test_empty_target_matches_everyone() {
        assert!(eligible(&Target::default(), 0, "zz"));
        assert!(eligible(&Target::default(), 100, "ru"));
    }

    #[test]
    fn test_age_bounds_inclusive() {
        let t = target(Some(18), Some(30), None);
        assert!(!eligible(&t, 17, "ru"));
        assert!(eligible(&t, 18, "ru"));
        assert!(eligible(&t, 30, "ru"));
        assert!(!eligible(&t, 31, "ru"));
    }

    #[test]
    fn test_single_age_bound() {
        assert!(eligible(&target(Some(18), None, None), 99, "ru"));
        assert!(!eligible(&target(None, Some(10), None), 11, "ru"));
    }

    #[test]
    fn test_country_case_insensitive() {
        let t = target(None, None, Some("RU"));
        assert!(eligible(&t, 20, "ru"));
        assert!(eligible(&t, 20, "Ru"));
        assert!(!eligible(&t, 20, "us"));
    }

    #[test]
    fn test_category_matching() {
        let t = Target {
            categories: vec!["Food".into(), "travel".into()],
            ..Default::default()
        };
        assert!(in_category(&t, "food"));
        assert!(in_category(&t, "TRAVEL"));
        assert!(!in_category(&t, "cars"));
        assert!(!in_category(&Target::default(), "food"));
    }

    #[test]
    fn test_categories_do_not_affect_redemption_eligibility() {
        let t = Target {
            categories: vec!["food".into()],
            ..Default::default()
        };
        assert!(eligible(&t, 25, "us"));
    }
}
