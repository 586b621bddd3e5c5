//! Redis-backed anti-fraud allow cache.
//!
//! Key format: `{prefix}{email}`, expiring at the service's `cache_until`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::services::antifraud::{AntifraudCache, CacheError};
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use tokio::sync::OnceCell;
use tracing::info;

/// Connects on first use so the server starts while Redis is down; every
/// failure surfaces as a `CacheError`, which the gate treats as a miss.
pub struct RedisAntifraudCache {
    client: Client,
    conn: OnceCell<ConnectionManager>,
    key_prefix: String,
}

impl RedisAntifraudCache {
    pub fn new(url: &str, key_prefix: &str) -> Result<Self, redis::RedisError> {
        Ok(Self {
            client: Client::open(url)?,
            conn: OnceCell::new(),
            key_prefix: key_prefix.to_string(),
        })
    }

    fn key(&self, email: &str) -> String {
        format!("{}{}", self.key_prefix, email.to_lowercase())
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let conn = ConnectionManager::new(self.client.clone()).await?;
                info!("Connected to Redis for anti-fraud cache");
                Ok::<_, redis::RedisError>(conn)
            })
            .await
            .map_err(|e| CacheError(e.to_string()))?;
        Ok(conn.clone())
    }
}

#[async_trait]
impl AntifraudCache for RedisAntifraudCache {
    async fn is_allowed(&self, email: &str) -> Result<bool, CacheError> {
        let mut conn = self.connection().await?;
        conn.exists(self.key(email))
            .await
            .map_err(|e| CacheError(e.to_string()))
    }

    async fn allow_until(&self, email: &str, until: DateTime<Utc>) -> Result<(), CacheError> {
        let ttl_ms = (until - Utc::now()).num_milliseconds();
        if ttl_ms <= 0 {
            return Ok(());
        }
        let mut conn = self.connection().await?;
        conn.pset_ex::<_, _, ()>(self.key(email), 1u8, ttl_ms as u64)
            .await
            .map_err(|e| CacheError(e.to_string()))
    }
}
