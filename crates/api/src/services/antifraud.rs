//! HTTP client for the external anti-fraud decision service.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::services::antifraud::{DecisionError, FraudDecisionService, FraudVerdict};
use metrics::counter;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::AntifraudConfig;

#[derive(Debug, Serialize)]
struct ValidateRequest<'a> {
    user_email: &'a str,
    promo_id: Uuid,
}

/// Wire form of the verdict. `cache_until` is parsed leniently.
#[derive(Debug, Deserialize)]
struct ValidateResponse {
    ok: bool,
    #[serde(default)]
    cache_until: Option<String>,
}

impl From<ValidateResponse> for FraudVerdict {
    fn from(resp: ValidateResponse) -> Self {
        // An unparseable instant only disables caching for this decision.
        let cache_until = resp
            .cache_until
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc));
        FraudVerdict {
            ok: resp.ok,
            cache_until,
        }
    }
}

/// Base url with `http://` added when no scheme is given.
fn base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

pub struct HttpFraudDecisionClient {
    client: Client,
    endpoint: String,
}

impl HttpFraudDecisionClient {
    pub fn new(config: &AntifraudConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/validate", base_url(&config.url)),
        })
    }
}

#[async_trait]
impl FraudDecisionService for HttpFraudDecisionClient {
    async fn decide(&self, email: &str, promo_id: Uuid) -> Result<FraudVerdict, DecisionError> {
        debug!(promo_id = %promo_id, "Calling anti-fraud service");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ValidateRequest {
                user_email: email,
                promo_id,
            })
            .send()
            .await
            .map_err(|e| {
                counter!("promo_antifraud_decisions_total", "outcome" => "error").increment(1);
                if e.is_timeout() {
                    DecisionError::Timeout
                } else {
                    DecisionError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            counter!("promo_antifraud_decisions_total", "outcome" => "error").increment(1);
            return Err(DecisionError::Status(status.as_u16()));
        }

        let body: ValidateResponse = response.json().await.map_err(|e| {
            counter!("promo_antifraud_decisions_total", "outcome" => "error").increment(1);
            DecisionError::Malformed(e.to_string())
        })?;

        let verdict = FraudVerdict::from(body);
        let outcome = if verdict.ok { "allow" } else { "deny" };
        counter!("promo_antifraud_decisions_total", "outcome" => outcome).increment(1);
        Ok(verdict)
    }
}
