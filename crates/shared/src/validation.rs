//! Common validation utilities.
//!
//! Stateless functions plugged into `#[validate(custom(function = ..))]`.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

use crate::password::meets_policy;

/// Maximum length of avatar and image urls.
pub const MAX_URL_LEN: usize = 350;

const MAX_CATEGORIES: usize = 20;
const CATEGORY_LEN: std::ops::RangeInclusive<usize> = 2..=20;

const MAX_UNIQUE_VALUES: usize = 5000;
const UNIQUE_VALUE_LEN: std::ops::RangeInclusive<usize> = 3..=30;

lazy_static! {
    static ref HTTP_URL: Regex = Regex::new(r"^(http|https)://\S+$").expect("valid url regex");
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validates an ISO-3166 alpha-2 shaped country code (two ASCII letters).
pub fn validate_country(country: &str) -> Result<(), ValidationError> {
    if country.len() == 2 && country.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(error("country", "Country must be a two-letter code"))
    }
}

/// Validates an absolute http(s) url no longer than 350 characters.
pub fn validate_http_url(url: &str) -> Result<(), ValidationError> {
    if url.chars().count() > MAX_URL_LEN {
        return Err(error("url_length", "Url must be at most 350 characters"));
    }
    if HTTP_URL.is_match(url) {
        Ok(())
    } else {
        Err(error("url", "Url must start with http:// or https://"))
    }
}

/// Validates the password policy.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if meets_policy(password) {
        Ok(())
    } else {
        Err(error(
            "password_policy",
            "Password must be 8-60 characters with lower, upper, digit and one of @$!%*?&",
        ))
    }
}

/// Validates a category list: at most 20 entries, each 2 to 20 characters.
pub fn validate_categories(categories: &[String]) -> Result<(), ValidationError> {
    if categories.len() > MAX_CATEGORIES {
        return Err(error("categories_count", "At most 20 categories are allowed"));
    }
    if categories
        .iter()
        .any(|c| !CATEGORY_LEN.contains(&c.chars().count()))
    {
        return Err(error(
            "category_length",
            "Each category must be 2-20 characters",
        ));
    }
    Ok(())
}

/// Validates a UNIQUE pool: 1 to 5000 values, each 3 to 30 characters.
pub fn validate_promo_unique(values: &[String]) -> Result<(), ValidationError> {
    if values.is_empty() || values.len() > MAX_UNIQUE_VALUES {
        return Err(error(
            "promo_unique_count",
            "Unique pool must hold between 1 and 5000 values",
        ));
    }
    if values
        .iter()
        .any(|v| !UNIQUE_VALUE_LEN.contains(&v.chars().count()))
    {
        return Err(error(
            "promo_unique_length",
            "Each unique value must be 3-30 characters",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_country() {
        assert!(validate_country("ru").is_ok());
        assert!(validate_country("US").is_ok());
        assert!(validate_country("USA").is_err());
        assert!(validate_country("u1").is_err());
        assert!(validate_country("").is_err());
    }

    #[test]
    fn test_validate_http_url() {
        assert!(validate_http_url("https://cdn.example.com/a.png").is_ok());
        assert!(validate_http_url("http://x.io").is_ok());
        assert!(validate_http_url("ftp://x.io").is_err());
        assert!(validate_http_url("example.com").is_err());
        assert!(validate_http_url("https://has space").is_err());
    }

    #[test]
    fn test_validate_http_url_length() {
        let long = format!("https://{}", "a".repeat(MAX_URL_LEN));
        let err = validate_http_url(&long).unwrap_err();
        assert_eq!(err.code, "url_length");
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("HardPass1!").is_ok());
        let err = validate_password("weak").unwrap_err();
        assert_eq!(err.code, "password_policy");
    }

    #[test]
    fn test_validate_categories() {
        assert!(validate_categories(&[]).is_ok());
        assert!(validate_categories(&["food".into(), "ru".into()]).is_ok());
        assert!(validate_categories(&["a".into()]).is_err());
        assert!(validate_categories(&["x".repeat(21)]).is_err());

        let too_many: Vec<String> = (0..21).map(|i| format!("cat{}", i)).collect();
        assert_eq!(
            validate_categories(&too_many).unwrap_err().code,
            "categories_count"
        );
    }

    #[test]
    fn test_validate_promo_unique() {
        assert!(validate_promo_unique(&["abc".into()]).is_ok());
        assert!(validate_promo_unique(&[]).is_err());
        assert!(validate_promo_unique(&["ab".into()]).is_err());
        assert!(validate_promo_unique(&["x".repeat(31)]).is_err());
    }

    #[test]
    fn test_error_messages_are_set() {
        let err = validate_country("zzz").unwrap_err();
        assert!(err.message.is_some());
    }
}
