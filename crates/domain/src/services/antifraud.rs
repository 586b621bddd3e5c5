//! Anti-fraud gate consulted before a promo code is redeemed.
//!
//! The gate first looks for a cached allow entry for the caller's email and
//! otherwise asks the external decision service. Every failure path denies.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::DomainError;

/// Answer of the decision service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudVerdict {
    pub ok: bool,
    /// Instant until which the allow decision may be reused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_until: Option<DateTime<Utc>>,
}

impl FraudVerdict {
    pub fn allow() -> Self {
        Self {
            ok: true,
            cache_until: None,
        }
    }

    pub fn allow_until(until: DateTime<Utc>) -> Self {
        Self {
            ok: true,
            cache_until: Some(until),
        }
    }

    pub fn deny() -> Self {
        Self {
            ok: false,
            cache_until: None,
        }
    }
}

/// A failed attempt to reach the decision service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecisionError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decision service timed out")]
    Timeout,

    #[error("Decision service returned status {0}")]
    Status(u16),

    #[error("Malformed decision response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Anti-fraud cache error: {0}")]
pub struct CacheError(pub String);

/// External fraud decision service.
#[async_trait::async_trait]
pub trait FraudDecisionService: Send + Sync {
    async fn decide(&self, email: &str, promo_id: Uuid) -> Result<FraudVerdict, DecisionError>;
}

/// Short-lived store of allow decisions keyed by email.
#[async_trait::async_trait]
pub trait AntifraudCache: Send + Sync {
    /// Whether an unexpired allow entry exists for the email.
    async fn is_allowed(&self, email: &str) -> Result<bool, CacheError>;

    async fn allow_until(&self, email: &str, until: DateTime<Utc>) -> Result<(), CacheError>;
}

pub struct AntifraudGate {
    cache: Arc<dyn AntifraudCache>,
    decisions: Arc<dyn FraudDecisionService>,
}

impl AntifraudGate {
    pub fn new(cache: Arc<dyn AntifraudCache>, decisions: Arc<dyn FraudDecisionService>) -> Self {
        Self { cache, decisions }
    }

    /// Allows or denies a redemption attempt by `email` on `promo_id`.
    pub async fn check(&self, email: &str, promo_id: Uuid) -> Result<(), DomainError> {
        match self.cache.is_allowed(email).await {
            Ok(true) => {
                tracing::debug!(promo_id = %promo_id, "Anti-fraud allow served from cache");
                return Ok(());
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Anti-fraud cache lookup failed, treating as miss");
            }
        }

        let verdict = match self.decisions.decide(email, promo_id).await {
            Ok(verdict) => verdict,
            Err(first) => {
                tracing::warn!(error = %first, promo_id = %promo_id, "Anti-fraud call failed, retrying once");
                match self.decisions.decide(email, promo_id).await {
                    Ok(verdict) => verdict,
                    Err(second) => {
                        tracing::error!(
                            error = %second,
                            promo_id = %promo_id,
                            "Anti-fraud service unavailable, denying redemption"
                        );
                        return Err(DomainError::Forbidden(
                            "Anti-fraud check could not be completed".to_string(),
                        ));
                    }
                }
            }
        };

        if !verdict.ok {
            tracing::info!(promo_id = %promo_id, "Redemption rejected by anti-fraud service");
            return Err(DomainError::Forbidden(
                "Redemption rejected by anti-fraud check".to_string(),
            ));
        }

        if let Some(until) = verdict.cache_until {
            if until > Utc::now() {
                if let Err(e) = self.cache.allow_until(email, until).await {
                    tracing::warn!(error = %e, "Failed to cache anti-fraud allow decision");
                }
            }
        }

        Ok(())
    }
}

/// Process-local [`AntifraudCache`].
#[derive(Debug, Default)]
pub struct InMemoryAntifraudCache {
    entries: Mutex<HashMap<String, DateTime<Utc>>>,
    /// Fail every operation, for exercising the degraded path.
    pub simulate_failure: bool,
}

impl InMemoryAntifraudCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            entries: Mutex::default(),
            simulate_failure: true,
        }
    }

    pub async fn expiry_of(&self, email: &str) -> Option<DateTime<Utc>> {
        self.entries.lock().await.get(email).copied()
    }
}

#[async_trait::async_trait]
impl AntifraudCache for InMemoryAntifraudCache {
    async fn is_allowed(&self, email: &str) -> Result<bool, CacheError> {
        if self.simulate_failure {
            return Err(CacheError("simulated failure".to_string()));
        }
        Ok(self
            .entries
            .lock()
            .await
            .get(email)
            .is_some_and(|until| *until > Utc::now()))
    }

    async fn allow_until(&self, email: &str, until: DateTime<Utc>) -> Result<(), CacheError> {
        if self.simulate_failure {
            return Err(CacheError("simulated failure".to_string()));
        }
        self.entries.lock().await.insert(email.to_string(), until);
        Ok(())
    }
}

/// Scripted [`FraudDecisionService`] that counts its calls.
///
/// Scripted responses are returned in order; once exhausted every call gets
/// the fallback.
#[derive(Debug)]
pub struct StaticDecisionService {
    scripted: Mutex<VecDeque<Result<FraudVerdict, DecisionError>>>,
    fallback: Result<FraudVerdict, DecisionError>,
    calls: AtomicUsize,
}

impl StaticDecisionService {
    pub fn new(fallback: Result<FraudVerdict, DecisionError>) -> Self {
        Self {
            scripted: Mutex::default(),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn allowing() -> Self {
        Self::new(Ok(FraudVerdict::allow()))
    }

    pub fn denying() -> Self {
        Self::new(Ok(FraudVerdict::deny()))
    }

    pub fn unreachable() -> Self {
        Self::new(Err(DecisionError::Transport("connection refused".to_string())))
    }

    pub fn scripted(
        responses: Vec<Result<FraudVerdict, DecisionError>>,
        fallback: Result<FraudVerdict, DecisionError>,
    ) -> Self {
        Self {
            scripted: Mutex::new(responses.into()),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl FraudDecisionService for StaticDecisionService {
    async fn decide(&self, _email: &str, _promo_id: Uuid) -> Result<FraudVerdict, DecisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.scripted.lock().await.pop_front() {
            Some(response) => response,
            None => self.fallback.clone(),
        }
    }
}
