//! Redemption records and their aggregates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One successful redemption. Append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Use {
    pub id: Uuid,
    pub promo_id: Uuid,
    pub user_id: Uuid,
    pub value: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
}

impl Use {
    pub fn country_lower(&self) -> String {
        self.country.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryActivations {
    pub country: String,
    pub activations_count: i64,
}

/// Usage statistics of one promo code, countries sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStatistics {
    pub activations_count: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub countries: Vec<CountryActivations>,
}

impl UsageStatistics {
    /// Aggregates uses by lower-cased country.
    pub fn from_uses<'a>(uses: impl IntoIterator<Item = &'a Use>) -> Self {
        let mut by_country: std::collections::BTreeMap<String, i64> = Default::default();
        let mut total = 0;
        for u in uses {
            total += 1;
            *by_country.entry(u.country_lower()).or_default() += 1;
        }
        Self {
            activations_count: total,
            countries: by_country
                .into_iter()
                .map(|(country, activations_count)| CountryActivations {
                    country,
                    activations_count,
                })
                .collect(),
        }
    }
}
