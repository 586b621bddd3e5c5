//! Business and user account models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::{validate_country, validate_http_url, validate_password};
use uuid::Uuid;
use validator::Validate;

/// A registered business.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Identity of the business issuing a code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
}

/// A registered end user as seen by targeting and comment projections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub age: i32,
    pub country: String,
    pub avatar_url: Option<String>,
}

impl UserProfile {
    pub fn redeemer(&self) -> Redeemer {
        Redeemer {
            user_id: self.id,
            email: self.email.clone(),
            age: self.age,
            country: self.country.clone(),
        }
    }
}

/// The caller of a redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redeemer {
    pub user_id: Uuid,
    pub email: String,
    pub age: i32,
    pub country: String,
}

/// Age and country block of user sign-up and profile responses.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserOther {
    #[validate(range(min = 0, max = 100, message = "age must be between 0 and 100"))]
    pub age: i32,

    #[validate(custom(function = "validate_country"))]
    pub country: String,
}

/// Profile returned by `GET /api/user/profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
    pub name: String,
    pub surname: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub other: UserOther,
}

impl From<UserProfile> for ProfileView {
    fn from(p: UserProfile) -> Self {
        Self {
            name: p.name,
            surname: p.surname,
            email: p.email,
            avatar_url: p.avatar_url.filter(|u| !u.is_empty()),
            other: UserOther {
                age: p.age,
                country: p.country,
            },
        }
    }
}

/// Request to register a business.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BusinessSignUpRequest {
    #[validate(length(min = 5, max = 50, message = "name must be 5-50 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    #[validate(length(max = 120, message = "email must be at most 120 characters"))]
    pub email: String,

    #[validate(custom(function = "validate_password"))]
    pub password: String,
}

/// Request to register an end user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserSignUpRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 120, message = "surname must be 1-120 characters"))]
    pub surname: String,

    #[validate(email(message = "Invalid email format"))]
    #[validate(length(max = 120, message = "email must be at most 120 characters"))]
    pub email: String,

    #[validate(custom(function = "validate_http_url"))]
    pub avatar_url: Option<String>,

    #[validate(nested)]
    pub other: UserOther,

    #[validate(custom(function = "validate_password"))]
    pub password: String,
}

/// Sign-in request shared by businesses and users.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Partial profile update.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct EditProfileRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 120, message = "surname must be 1-120 characters"))]
    pub surname: Option<String>,

    #[validate(custom(function = "validate_http_url"))]
    pub avatar_url: Option<String>,

    #[validate(custom(function = "validate_password"))]
    pub password: Option<String>,
}

/// Token returned by sign-in and user sign-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Token returned by business sign-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessTokenResponse {
    pub token: String,
    pub company_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            name: "Ivan".into(),
            surname: "Petrov".into(),
            email: "ivan@example.com".into(),
            age: 23,
            country: "ru".into(),
            avatar_url: None,
        }
    }

    #[test]
    fn test_profile_view_omits_missing_avatar() {
        let json = serde_json::to_value(ProfileView::from(profile())).unwrap();
        assert!(json.get("avatar_url").is_none());
        assert_eq!(json["other"]["age"], 23);
        assert_eq!(json["other"]["country"], "ru");
    }

    #[test]
    fn test_redeemer_from_profile() {
        let p = profile();
        let r = p.redeemer();
        assert_eq!(r.user_id, p.id);
        assert_eq!(r.email, "ivan@example.com");
        assert_eq!(r.age, 23);
    }

    #[test]
    fn test_user_sign_up_validation() {
        let req: UserSignUpRequest = serde_json::from_value(serde_json::json!({
            "name": "Ivan",
            "surname": "Petrov",
            "email": "ivan@example.com",
            "other": {"age": 23, "country": "ru"},
            "password": "HardPass1!"
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        let bad: UserSignUpRequest = serde_json::from_value(serde_json::json!({
            "name": "",
            "surname": "Petrov",
            "email": "not-an-email",
            "avatar_url": "ftp://x",
            "other": {"age": 200, "country": "rus"},
            "password": "weak"
        }))
        .unwrap();
        let errors = bad.validate().unwrap_err();
        let fields = errors.errors();
        for field in ["name", "email", "avatar_url", "other", "password"] {
            assert!(fields.contains_key(field), "missing error for {}", field);
        }
    }

    #[test]
    fn test_business_sign_up_name_bounds() {
        let req = BusinessSignUpRequest {
            name: "Shop".into(),
            email: "shop@example.com".into(),
            password: "HardPass1!".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_business_password_hash_not_serialized() {
        let b = Business {
            id: Uuid::new_v4(),
            name: "Coffee House".into(),
            email: "c@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&b).unwrap();
        assert!(!json.contains("argon2id"));
    }
}
