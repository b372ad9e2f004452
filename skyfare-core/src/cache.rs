use async_trait::async_trait;

/// A cache backend failure. The orchestrator treats these as a cache
/// miss and degrades to the upstream call; they never fail a search.
#[derive(Debug, thiserror::Error)]
#[error("cache backend failure: {0}")]
pub struct CacheError(pub String);

/// Opaque key-value boundary with expiring writes. The core serializes
/// and deserializes its own payloads; the store sees only bytes.
#[async_trait]
pub trait SearchCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    async fn set(&self, key: &str, value: &[u8], ttl_seconds: u64) -> Result<(), CacheError>;
}
