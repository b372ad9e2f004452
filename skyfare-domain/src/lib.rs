pub mod entities;

pub use entities::{AirportCode, FlightQuery, Itinerary, Money, Segment};

/// Domain-level validation failures. Every entity constructor fails with
/// one of these; no entity can exist in an invalid state.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("invalid airport code: {0}")]
    InvalidAirportCode(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("invalid money: {0}")]
    InvalidMoney(String),

    #[error("invalid segment: {0}")]
    InvalidSegment(String),

    #[error("invalid itinerary: {0}")]
    InvalidItinerary(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
