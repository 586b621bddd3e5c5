//! Sign-up and sign-in routes for businesses and users.

use axum::{extract::State, Json};
use domain::models::account::{
    BusinessSignUpRequest, BusinessTokenResponse, SignInRequest, TokenResponse, UserSignUpRequest,
};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::ApiJson;

/// `POST /api/business/auth/sign-up`
pub async fn business_sign_up(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BusinessSignUpRequest>,
) -> Result<Json<BusinessTokenResponse>, ApiError> {
    req.validate()?;
    Ok(Json(state.auth.business_sign_up(&req).await?))
}

/// `POST /api/business/auth/sign-in`
pub async fn business_sign_in(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignInRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    req.validate()?;
    Ok(Json(state.auth.business_sign_in(&req).await?))
}

/// `POST /api/user/auth/sign-up`
pub async fn user_sign_up(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<UserSignUpRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    req.validate()?;
    Ok(Json(state.auth.user_sign_up(&req).await?))
}

/// `POST /api/user/auth/sign-in`
pub async fn user_sign_in(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignInRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    req.validate()?;
    Ok(Json(state.auth.user_sign_in(&req).await?))
}
