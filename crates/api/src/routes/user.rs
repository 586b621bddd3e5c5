//! User-side routes: profile, feed, social features and redemption.

use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    Json,
};
use domain::models::account::{EditProfileRequest, ProfileView};
use domain::models::promo_code::ActivatePromoResponse;
use domain::models::social::CommentRequest;
use domain::models::{CommentView, UserView};
use serde::{Deserialize, Serialize};
use shared::pagination::DEFAULT_LIMIT;
use uuid::Uuid;
use validator::Validate;

use super::{listed, today, PageParams};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, ApiPath, ApiQuery, UserAuth};

#[derive(Debug, Default, Deserialize)]
pub struct FeedParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub category: Option<String>,
    pub active: Option<bool>,
}

/// Acknowledgement body for like, unlike and comment deletion.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

const OK: StatusResponse = StatusResponse { status: "ok" };

/// `GET /api/user/profile`
pub async fn get_profile(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<ProfileView>, ApiError> {
    let profile = state.store.user_profile(auth.user_id).await?;
    Ok(Json(profile.into()))
}

/// `PATCH /api/user/profile`
pub async fn edit_profile(
    State(state): State<AppState>,
    auth: UserAuth,
    ApiJson(req): ApiJson<EditProfileRequest>,
) -> Result<Json<ProfileView>, ApiError> {
    req.validate()?;
    let profile = state.auth.edit_profile(auth.user_id, req).await?;
    Ok(Json(profile.into()))
}

/// `GET /api/user/feed`
pub async fn feed(
    State(state): State<AppState>,
    auth: UserAuth,
    ApiQuery(params): ApiQuery<FeedParams>,
) -> Result<Response, ApiError> {
    let page = PageParams {
        limit: params.limit,
        offset: params.offset,
    }
    .into_page(None)?;

    let user = state.store.user_profile(auth.user_id).await?;
    let listing = state
        .feed
        .user_feed(&user, page, params.category, params.active, today())
        .await?;
    Ok(listed(listing))
}

/// `GET /api/user/promo/history`
pub async fn history(
    State(state): State<AppState>,
    auth: UserAuth,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Response, ApiError> {
    let page = params.into_page(Some(DEFAULT_LIMIT))?;
    let listing = state.feed.history(auth.user_id, page, today()).await?;
    Ok(listed(listing))
}

/// `GET /api/user/promo/:id`
pub async fn get_promo(
    State(state): State<AppState>,
    auth: UserAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<UserView>, ApiError> {
    Ok(Json(state.feed.user_get(auth.user_id, id, today()).await?))
}

/// `POST /api/user/promo/:id/like`
pub async fn like(
    State(state): State<AppState>,
    auth: UserAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<StatusResponse>, ApiError> {
    state.social.like(auth.user_id, id).await?;
    Ok(Json(OK))
}

/// `DELETE /api/user/promo/:id/like`
pub async fn unlike(
    State(state): State<AppState>,
    auth: UserAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<StatusResponse>, ApiError> {
    state.social.unlike(auth.user_id, id).await?;
    Ok(Json(OK))
}

/// `POST /api/user/promo/:id/comments`
pub async fn add_comment(
    State(state): State<AppState>,
    auth: UserAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CommentRequest>,
) -> Result<(StatusCode, Json<CommentView>), ApiError> {
    req.validate()?;
    let comment = state.social.add_comment(auth.user_id, id, req.text).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// `GET /api/user/promo/:id/comments`
pub async fn list_comments(
    State(state): State<AppState>,
    _auth: UserAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Response, ApiError> {
    let page = params.into_page(Some(DEFAULT_LIMIT))?;
    Ok(listed(state.social.comments(id, page).await?))
}

/// `GET /api/user/promo/:id/comments/:comment_id`
pub async fn get_comment(
    State(state): State<AppState>,
    _auth: UserAuth,
    ApiPath((id, comment_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<CommentView>, ApiError> {
    Ok(Json(state.social.comment(id, comment_id).await?))
}

/// `PUT /api/user/promo/:id/comments/:comment_id`
pub async fn edit_comment(
    State(state): State<AppState>,
    auth: UserAuth,
    ApiPath((id, comment_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(req): ApiJson<CommentRequest>,
) -> Result<Json<CommentView>, ApiError> {
    req.validate()?;
    Ok(Json(
        state
            .social
            .edit_comment(auth.user_id, id, comment_id, req.text)
            .await?,
    ))
}

/// `DELETE /api/user/promo/:id/comments/:comment_id`
pub async fn delete_comment(
    State(state): State<AppState>,
    auth: UserAuth,
    ApiPath((id, comment_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<StatusResponse>, ApiError> {
    state
        .social
        .delete_comment(auth.user_id, id, comment_id)
        .await?;
    Ok(Json(OK))
}

/// `POST /api/user/promo/:id/activate`
///
/// Runs the anti-fraud gate and hands out one unit of the code.
pub async fn activate(
    State(state): State<AppState>,
    auth: UserAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ActivatePromoResponse>, ApiError> {
    let user = state.store.user_profile(auth.user_id).await?;
    let promo = state
        .redemption
        .redeem(&user.redeemer(), id, today())
        .await?;
    Ok(Json(ActivatePromoResponse { promo }))
}
