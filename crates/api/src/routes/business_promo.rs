//! Business-side promo code routes.

use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    Json,
};
use domain::models::promo_code::{
    CreatePromoCodeRequest, CreatePromoCodeResponse, EditPromoCodeRequest,
};
use domain::models::{OwnerListQuery, OwnerSort, OwnerView, UsageStatistics};
use persistence::repositories::AccountRepository;
use serde::Deserialize;
use shared::validation::validate_country;
use uuid::Uuid;
use validator::Validate;

use super::{listed, today, PageParams};
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, ApiPath, ApiQuery, BusinessAuth};

/// Query of `GET /api/business/promo`. `country` may repeat and each value
/// may hold a comma-separated list.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub sort_by: Option<OwnerSort>,
    #[serde(default)]
    pub country: Vec<String>,
}

impl ListParams {
    fn into_query(self) -> Result<OwnerListQuery, ApiError> {
        let countries: Vec<String> = self
            .country
            .iter()
            .flat_map(|c| c.split(','))
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        if let Some(bad) = countries.iter().find(|c| validate_country(c).is_err()) {
            return Err(ApiError::BadRequest(format!("Invalid country: {bad}")));
        }

        let page = PageParams {
            limit: self.limit,
            offset: self.offset,
        }
        .into_page(None)?;

        Ok(OwnerListQuery {
            page,
            sort_by: self.sort_by,
            countries,
        })
    }
}

/// `POST /api/business/promo`
pub async fn create_promo(
    State(state): State<AppState>,
    auth: BusinessAuth,
    ApiJson(req): ApiJson<CreatePromoCodeRequest>,
) -> Result<(StatusCode, Json<CreatePromoCodeResponse>), ApiError> {
    req.validate()?;

    let business = AccountRepository::new(state.pool.clone())
        .find_business_by_id(auth.company_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Business account not found".into()))?;

    let id = state
        .catalog
        .create(&auth.company(business.name), req)
        .await?;
    Ok((StatusCode::CREATED, Json(CreatePromoCodeResponse { id })))
}

/// `GET /api/business/promo`
pub async fn list_promos(
    State(state): State<AppState>,
    auth: BusinessAuth,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Response, ApiError> {
    let query = params.into_query()?;
    let listing = state
        .feed
        .owner_list(auth.company_id, &query, today())
        .await?;
    Ok(listed(listing))
}

/// `GET /api/business/promo/:id`
pub async fn get_promo(
    State(state): State<AppState>,
    auth: BusinessAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<OwnerView>, ApiError> {
    Ok(Json(
        state.feed.owner_get(auth.company_id, id, today()).await?,
    ))
}

/// `PATCH /api/business/promo/:id`
pub async fn edit_promo(
    State(state): State<AppState>,
    auth: BusinessAuth,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<EditPromoCodeRequest>,
) -> Result<Json<OwnerView>, ApiError> {
    req.validate()?;
    Ok(Json(
        state
            .catalog
            .edit(auth.company_id, id, req, today())
            .await?,
    ))
}

/// `GET /api/business/promo/:id/stat`
pub async fn promo_stat(
    State(state): State<AppState>,
    auth: BusinessAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<UsageStatistics>, ApiError> {
    Ok(Json(
        state.feed.usage_statistics(auth.company_id, id).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_list_split_and_repeat() {
        let params = ListParams {
            country: vec!["ru,US".into(), "fr".into()],
            ..Default::default()
        };
        let query = params.into_query().unwrap();
        assert_eq!(query.countries, vec!["ru", "US", "fr"]);
        assert_eq!(query.page.limit, None);
    }

    #[test]
    fn test_invalid_country_rejected() {
        let params = ListParams {
            country: vec!["Russia".into()],
            ..Default::default()
        };
        assert!(params.into_query().is_err());
    }
}
