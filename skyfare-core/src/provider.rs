use async_trait::async_trait;
use skyfare_domain::{FlightQuery, Itinerary};

/// A whole-call upstream failure. Adapters never return partial results
/// when the call itself fails; individual bad rows are skipped during
/// mapping instead.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("unexpected upstream status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed upstream payload: {0}")]
    Decode(String),
}

/// Uniform contract every upstream travel-data provider satisfies.
/// One outbound request per `search` call; raw provider rows are mapped
/// into domain entities with row-level tolerance.
#[async_trait]
pub trait FlightProvider: Send + Sync {
    /// Lowercase provider tag, embedded in derived cache keys.
    fn name(&self) -> &str;

    async fn search(
        &self,
        query: &FlightQuery,
        limit: usize,
    ) -> Result<Vec<Itinerary>, UpstreamError>;
}
