//! Sign-up, sign-in and bearer token authentication for businesses and users.

use domain::models::account::{
    Business, BusinessSignUpRequest, BusinessTokenResponse, EditProfileRequest, SignInRequest,
    TokenResponse, UserSignUpRequest,
};
use domain::models::UserProfile;
use persistence::repositories::{AccountRepository, NewUser};
use shared::jwt::{extract_session_id, extract_subject_id, JwtConfig, JwtError, SubjectKind};
use shared::password::{hash_password, verify_password, PasswordError};
use thiserror::Error;
use uuid::Uuid;

use crate::config::JwtAuthConfig;
use crate::error::ApiError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Session is not active")]
    SessionInactive,

    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailAlreadyExists => ApiError::Conflict(err.to_string()),
            AuthError::InvalidCredentials | AuthError::SessionInactive => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::Token(e) => e.into(),
            AuthError::Password(e) => ApiError::Internal(e.to_string()),
            AuthError::Database(e) => e.into(),
        }
    }
}

/// Identity resolved from a valid bearer token with a live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject_id: Uuid,
    pub email: String,
    pub session_id: Uuid,
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    accounts: AccountRepository,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(accounts: AccountRepository, jwt: JwtConfig) -> Self {
        Self { accounts, jwt }
    }

    /// Builds the signing config from PEM keys that may carry literal `\n`
    /// sequences (common when keys come from env files).
    pub fn jwt_from_config(config: &JwtAuthConfig) -> Result<JwtConfig, JwtError> {
        JwtConfig::with_leeway(
            &normalize_pem_key(&config.private_key),
            &normalize_pem_key(&config.public_key),
            config.access_token_expiry_secs,
            config.leeway_secs,
        )
    }

    pub async fn business_sign_up(
        &self,
        req: &BusinessSignUpRequest,
    ) -> Result<BusinessTokenResponse, AuthError> {
        let email = req.email.to_lowercase();
        let password_hash = hash_password(&req.password)?;

        let business: Business = match self
            .accounts
            .create_business(&req.name, &email, &password_hash)
            .await
        {
            Ok(entity) => entity.into(),
            Err(e) if is_unique_violation(&e) => return Err(AuthError::EmailAlreadyExists),
            Err(e) => return Err(e.into()),
        };

        let token = self
            .open_session(business.id, &email, SubjectKind::Business)
            .await?;
        tracing::info!(company_id = %business.id, "Business registered");

        Ok(BusinessTokenResponse {
            token,
            company_id: business.id,
        })
    }

    pub async fn business_sign_in(&self, req: &SignInRequest) -> Result<TokenResponse, AuthError> {
        let email = req.email.to_lowercase();
        let business = self
            .accounts
            .find_business_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&req.password, &business.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self
            .open_session(business.id, &email, SubjectKind::Business)
            .await?;
        Ok(TokenResponse { token })
    }

    pub async fn user_sign_up(&self, req: &UserSignUpRequest) -> Result<TokenResponse, AuthError> {
        let email = req.email.to_lowercase();
        let password_hash = hash_password(&req.password)?;

        let created = self
            .accounts
            .create_user(NewUser {
                name: &req.name,
                surname: &req.surname,
                email: &email,
                age: req.other.age,
                country: &req.other.country,
                avatar_url: req.avatar_url.as_deref().filter(|u| !u.is_empty()),
                password_hash: &password_hash,
            })
            .await;
        let user = match created {
            Ok(user) => user,
            Err(e) if is_unique_violation(&e) => return Err(AuthError::EmailAlreadyExists),
            Err(e) => return Err(e.into()),
        };

        let token = self.open_session(user.id, &email, SubjectKind::User).await?;
        tracing::info!(user_id = %user.id, "User registered");
        Ok(TokenResponse { token })
    }

    pub async fn user_sign_in(&self, req: &SignInRequest) -> Result<TokenResponse, AuthError> {
        let email = req.email.to_lowercase();
        let user = self
            .accounts
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&req.password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.open_session(user.id, &email, SubjectKind::User).await?;
        Ok(TokenResponse { token })
    }

    /// Validates the token for the expected subject kind and checks that its
    /// session is still the subject's live one.
    pub async fn authenticate(
        &self,
        token: &str,
        kind: SubjectKind,
    ) -> Result<Principal, AuthError> {
        let claims = self.jwt.validate_for(token, kind)?;
        let subject_id = extract_subject_id(&claims)?;
        let session_id = extract_session_id(&claims)?;

        if !self
            .accounts
            .is_session_active(session_id, subject_id)
            .await?
        {
            return Err(AuthError::SessionInactive);
        }

        Ok(Principal {
            subject_id,
            email: claims.email,
            session_id,
        })
    }

    /// Applies a partial profile update. Omitted fields keep their value.
    pub async fn edit_profile(
        &self,
        user_id: Uuid,
        req: EditProfileRequest,
    ) -> Result<UserProfile, AuthError> {
        let current = self
            .accounts
            .find_user_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let password_hash = match &req.password {
            Some(password) => hash_password(password)?,
            None => current.password_hash.clone(),
        };
        let avatar_url = req.avatar_url.as_deref().or(current.avatar_url.as_deref());

        let updated = self
            .accounts
            .update_user_profile(
                user_id,
                req.name.as_deref().unwrap_or(&current.name),
                req.surname.as_deref().unwrap_or(&current.surname),
                avatar_url,
                &password_hash,
            )
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(updated.into())
    }

    async fn open_session(
        &self,
        subject_id: Uuid,
        email: &str,
        kind: SubjectKind,
    ) -> Result<String, AuthError> {
        let issued = self.jwt.issue(subject_id, email, kind)?;
        self.accounts
            .start_session(issued.session_id, subject_id, kind, issued.expires_at)
            .await?;
        Ok(issued.token)
    }
}

/// Normalizes a PEM key: strips surrounding quotes and turns literal `\n`
/// sequences into newlines.
fn normalize_pem_key(key: &str) -> String {
    key.trim()
        .trim_matches('"')
        .trim_matches('\'')
        .replace("\\n", "\n")
}
