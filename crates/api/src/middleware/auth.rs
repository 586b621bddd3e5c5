//! Bearer token authentication middleware.
//!
//! Each route group requires one subject kind. The resolved identity is
//! stored in request extensions for the `BusinessAuth` and `UserAuth`
//! extractors.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::jwt::SubjectKind;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{BusinessAuth, UserAuth};
use crate::services::{AuthError, Principal};

fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// The token is extracted before the async block so the returned future does
// not capture `&Request<Body>` (which is not `Sync`) and stays `Send`.
fn authenticate<'a>(
    state: &'a AppState,
    req: &Request<Body>,
    kind: SubjectKind,
) -> impl std::future::Future<Output = Result<Principal, ApiError>> + Send + 'a {
    let token = bearer_token(req).map(str::to_owned);
    async move {
        let token = token.ok_or_else(|| {
            ApiError::Unauthorized("Missing or invalid Authorization header".into())
        })?;

        state.auth.authenticate(&token, kind).await.map_err(|e| {
            if !matches!(e, AuthError::Database(_)) {
                tracing::debug!(error = %e, kind = kind.as_str(), "Token rejected");
            }
            ApiError::from(e)
        })
    }
}

/// Requires a live business session.
pub async fn require_business(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&state, &req, SubjectKind::Business).await {
        Ok(principal) => {
            req.extensions_mut().insert(BusinessAuth {
                company_id: principal.subject_id,
                email: principal.email,
            });
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}

/// Requires a live user session.
pub async fn require_user(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&state, &req, SubjectKind::User).await {
        Ok(principal) => {
            req.extensions_mut().insert(UserAuth {
                user_id: principal.subject_id,
                email: principal.email,
            });
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}
