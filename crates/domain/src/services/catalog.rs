//! Creation and editing of promo codes by their owning business.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::activity::is_active;
use super::store::PromoCodeStore;
use crate::error::{DomainError, StoreError};
use crate::models::promo_code::{CreatePromoCodeRequest, EditPromoCodeRequest};
use crate::models::{Company, Mode, OwnerView, PromoCode, Redemption, Target};

pub struct Catalog {
    store: Arc<dyn PromoCodeStore>,
}

fn bad_request(msg: &str) -> DomainError {
    DomainError::BadRequest(msg.to_string())
}

fn check_ranges(
    target: &Target,
    active_from: Option<NaiveDate>,
    active_until: Option<NaiveDate>,
) -> Result<(), DomainError> {
    if let (Some(from), Some(until)) = (target.age_from, target.age_until) {
        if from > until {
            return Err(bad_request("age_from must not exceed age_until"));
        }
    }
    if let (Some(from), Some(until)) = (active_from, active_until) {
        if from > until {
            return Err(bad_request("active_from must not be after active_until"));
        }
    }
    Ok(())
}

/// Builds the redemption state from a create request, enforcing the
/// per-mode field rules.
fn redemption_for(req: &CreatePromoCodeRequest) -> Result<Redemption, DomainError> {
    match req.mode {
        Mode::Common => {
            if req.promo_unique.is_some() {
                return Err(bad_request("promo_unique is not allowed in COMMON mode"));
            }
            let value = req
                .promo_common
                .clone()
                .ok_or_else(|| bad_request("promo_common is required in COMMON mode"))?;
            Ok(Redemption::common(value, req.max_count))
        }
        Mode::Unique => {
            if req.promo_common.is_some() {
                return Err(bad_request("promo_common is not allowed in UNIQUE mode"));
            }
            if req.max_count != 1 {
                return Err(bad_request("max_count must be 1 in UNIQUE mode"));
            }
            match &req.promo_unique {
                Some(pool) if !pool.is_empty() => Ok(Redemption::unique(pool.clone())),
                _ => Err(bad_request("promo_unique is required in UNIQUE mode")),
            }
        }
    }
}

impl Catalog {
    pub fn new(store: Arc<dyn PromoCodeStore>) -> Self {
        Self { store }
    }

    /// Validates the cross-field rules of a request and stores the new code.
    pub async fn create(
        &self,
        company: &Company,
        req: CreatePromoCodeRequest,
    ) -> Result<Uuid, DomainError> {
        let redemption = redemption_for(&req)?;
        let target = Target::from(req.target);
        check_ranges(&target, req.active_from, req.active_until)?;

        let code = PromoCode {
            id: Uuid::new_v4(),
            company_id: company.id,
            company_name: company.name.clone(),
            description: req.description,
            image_url: req.image_url,
            target,
            redemption,
            active_from: req.active_from,
            active_until: req.active_until,
            created_at: Utc::now(),
        };
        self.store.insert(&code).await?;

        tracing::info!(
            promo_id = %code.id,
            company_id = %company.id,
            mode = %code.mode(),
            "Promo code created"
        );
        Ok(code.id)
    }

    /// Applies a partial edit. A quota change on a UNIQUE code is rejected
    /// before ownership is checked.
    pub async fn edit(
        &self,
        company_id: Uuid,
        promo_id: Uuid,
        req: EditPromoCodeRequest,
        today: NaiveDate,
    ) -> Result<OwnerView, DomainError> {
        let mut code = self.store.get(promo_id).await.map_err(|e| match e {
            StoreError::NotFound => DomainError::NotFound("Promo code not found".to_string()),
            other => other.into(),
        })?;

        if code.mode() == Mode::Unique && req.max_count.is_some() {
            return Err(bad_request("max_count cannot be changed in UNIQUE mode"));
        }
        if code.company_id != company_id {
            return Err(DomainError::Forbidden(
                "Promo code belongs to another company".to_string(),
            ));
        }

        if let Some(description) = req.description {
            code.description = description;
        }
        if let Some(image_url) = req.image_url {
            code.image_url = Some(image_url);
        }
        if let Some(patch) = req.target {
            code.target.merge(patch);
        }
        if req.active_from.is_some() {
            code.active_from = req.active_from;
        }
        if req.active_until.is_some() {
            code.active_until = req.active_until;
        }
        if let (Some(new_max), Redemption::Common { max_count, used_count, .. }) =
            (req.max_count, &mut code.redemption)
        {
            // Checked against a snapshot here; the store repeats it under lock.
            if new_max < *used_count {
                return Err(bad_request("max_count cannot be lower than used_count"));
            }
            *max_count = new_max;
        }
        check_ranges(&code.target, code.active_from, code.active_until)?;

        self.store.update(&code).await?;
        tracing::info!(promo_id = %promo_id, "Promo code edited");

        let code = self.store.get(promo_id).await?;
        let counters = self.store.counters(promo_id).await?;
        Ok(OwnerView::project(&code, counters, is_active(&code, today)))
    }
}
