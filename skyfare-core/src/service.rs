use std::sync::Arc;

use tracing::{debug, warn};

use skyfare_domain::DomainError;

use crate::cache::SearchCache;
use crate::cache_key;
use crate::clock::Clock;
use crate::dates::DateError;
use crate::provider::{FlightProvider, UpstreamError};
use crate::reconstruct;
use crate::request::SearchRequest;
use crate::views::FlightOption;

pub const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Date(#[from] DateError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Answers a search with at most one upstream call per distinct cached
/// request: derive the key, try the cache, and only on a miss hit the
/// provider, reconstruct the trip views and persist them with a TTL.
/// Cache failures on either side degrade to a miss; they never fail the
/// search. Concurrent misses for the same key may both call upstream.
pub struct SearchService<P, C> {
    provider: P,
    cache: C,
    clock: Arc<dyn Clock>,
    ttl_seconds: u64,
}

impl<P, C> SearchService<P, C>
where
    P: FlightProvider,
    C: SearchCache,
{
    pub fn new(provider: P, cache: C, clock: Arc<dyn Clock>, ttl_seconds: u64) -> Self {
        Self {
            provider,
            cache,
            clock,
            ttl_seconds,
        }
    }

    pub async fn search(&self, req: &SearchRequest) -> Result<Vec<FlightOption>, SearchError> {
        let key = cache_key::make_key(self.provider.name(), req);

        match self.cache.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_slice::<Vec<FlightOption>>(&raw) {
                Ok(options) => {
                    debug!("Cache hit for {}", key);
                    return Ok(options);
                }
                Err(e) => warn!("Stale cache payload under {}: {}", key, e),
            },
            Ok(None) => debug!("Cache miss for {}", key),
            Err(e) => warn!("Cache read failed for {}, treating as miss: {}", key, e),
        }

        let today = self.clock.today();
        let query = req.to_query(today)?;
        let limit = req.max.unwrap_or(DEFAULT_LIMIT);

        let itineraries = self.provider.search(&query, limit).await?;
        let options = reconstruct::to_trip_options(&itineraries);

        match serde_json::to_vec(&options) {
            Ok(bytes) => {
                if let Err(e) = self.cache.set(&key, &bytes, self.ttl_seconds).await {
                    warn!("Cache write failed for {}: {}", key, e);
                }
            }
            Err(e) => warn!("Could not serialize cache payload for {}: {}", key, e),
        }

        Ok(options)
    }
}
