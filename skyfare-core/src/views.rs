//! Output projections rebuilt from an itinerary on every
//! reconstruction. These are the cache payload format, so every field
//! set is fixed and round-trips through serde.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentView {
    pub origin: String,
    pub destination: String,
    pub depart_utc: String,
    pub arrive_utc: String,
    pub carrier: String,
    pub flight_number: String,
    pub duration_min: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoverView {
    pub at: String,
    pub duration_min: i64,
}

/// One directional portion of a journey (outbound or return).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    pub origin: String,
    pub destination: String,
    pub depart_utc: String,
    pub arrive_utc: String,
    pub duration_min: i64,
    pub stops: usize,
    pub segments: Vec<SegmentView>,
    pub layovers: Vec<LayoverView>,
}

/// A reconstructed trip option: outbound leg plus an optional return
/// leg (absent for one-way journeys).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightOption {
    pub price: Price,
    pub deeplink: Option<String>,
    pub carriers: Vec<String>,
    pub outbound: Leg,
    #[serde(rename = "return")]
    pub return_leg: Option<Leg>,
}
