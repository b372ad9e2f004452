use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use skyfare_core::cache::{CacheError, SearchCache};

/// Redis-backed search cache. Stores opaque byte payloads under derived
/// keys with an expiry; any backend failure surfaces as [`CacheError`]
/// and the orchestrator degrades it to a miss.
#[derive(Clone)]
pub struct RedisCache {
    client: redis::Client,
}

impl RedisCache {
    pub fn new(connection_string: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(connection_string)
            .map_err(|e| CacheError(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SearchCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError(e.to_string()))?;
        let raw: Option<Vec<u8>> = conn.get(key).await.map_err(|e| CacheError(e.to_string()))?;
        Ok(raw)
    }

    async fn set(&self, key: &str, value: &[u8], ttl_seconds: u64) -> Result<(), CacheError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError(e.to_string()))?;
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds)
            .await
            .map_err(|e| CacheError(e.to_string()))?;
        debug!("Cached search result under {} for {}s", key, ttl_seconds);
        Ok(())
    }
}
