//! Redemption engine.

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use super::activity::is_active;
use super::antifraud::AntifraudGate;
use super::store::PromoCodeStore;
use super::targeting::eligible;
use crate::error::{DomainError, StoreError};
use crate::models::Redeemer;

pub struct RedemptionEngine {
    store: Arc<dyn PromoCodeStore>,
    gate: Arc<AntifraudGate>,
}

impl RedemptionEngine {
    pub fn new(store: Arc<dyn PromoCodeStore>, gate: Arc<AntifraudGate>) -> Self {
        Self { store, gate }
    }

    /// Hands out one unit of the code to the redeemer.
    ///
    /// The anti-fraud gate runs first, keyed by email and promo id. Then
    /// existence, activity and audience are checked, and finally the locked
    /// consume re-checks capacity.
    pub async fn redeem(
        &self,
        redeemer: &Redeemer,
        promo_id: Uuid,
        today: NaiveDate,
    ) -> Result<String, DomainError> {
        self.gate.check(&redeemer.email, promo_id).await?;

        let code = self.store.get(promo_id).await.map_err(|e| match e {
            StoreError::NotFound => DomainError::NotFound("Promo code not found".to_string()),
            other => other.into(),
        })?;

        if !is_active(&code, today) {
            return Err(DomainError::Forbidden("Promo code is not active".to_string()));
        }
        if !eligible(&code.target, redeemer.age, &redeemer.country) {
            return Err(DomainError::Forbidden(
                "Promo code is not available for this user".to_string(),
            ));
        }

        match self.store.consume(promo_id, redeemer, today).await? {
            Some(value) => {
                tracing::info!(
                    promo_id = %promo_id,
                    user_id = %redeemer.user_id,
                    mode = %code.mode(),
                    "Promo code redeemed"
                );
                Ok(value)
            }
            None => Err(DomainError::Forbidden(
                "Promo code has no redemptions left".to_string(),
            )),
        }
    }
}
