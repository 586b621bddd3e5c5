//! Database metrics.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

pub fn record_query_duration(query_name: &'static str, duration_secs: f64) {
    histogram!("promo_db_query_duration_seconds", "query" => query_name).record(duration_secs);
}

/// Counts consume attempts by outcome: `taken`, `exhausted`, `missing` or
/// `failed`.
pub fn record_consume(outcome: &'static str) {
    counter!("promo_consume_total", "outcome" => outcome).increment(1);
}

/// Labels a finished consume attempt for [`record_consume`].
pub fn consume_outcome(result: &Result<Option<String>, sqlx::Error>) -> &'static str {
    match result {
        Ok(Some(_)) => "taken",
        Ok(None) => "exhausted",
        Err(sqlx::Error::RowNotFound) => "missing",
        Err(_) => "failed",
    }
}

/// Snapshot of pool usage. Called from the metrics endpoint.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("promo_db_connections_active").set(size.saturating_sub(idle) as f64);
    gauge!("promo_db_connections_idle").set(idle as f64);
    gauge!("promo_db_connections_total").set(size as f64);
}

/// Times one query and records it on `record`.
///
/// ```ignore
/// let timer = QueryTimer::new("get_promo_code");
/// let row = sqlx::query_as::<_, PromoCodeEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        record_query_duration(self.query_name, self.start.elapsed().as_secs_f64());
    }
}
