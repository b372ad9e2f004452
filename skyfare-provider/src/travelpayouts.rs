use std::time::Duration;

use async_trait::async_trait;
use chrono::Duration as ChronoDuration;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use skyfare_core::provider::{FlightProvider, UpstreamError};
use skyfare_domain::{AirportCode, FlightQuery, Itinerary, Money, Segment};

use crate::iso;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const DEEPLINK_BASE: &str = "https://www.aviasales.com";

/// The endpoint ignores its limit parameter, so results are clamped
/// client-side to at most this many rows.
const MAX_ROWS: usize = 10;

#[derive(Debug, Clone)]
pub struct TravelpayoutsConfig {
    pub token: String,
    pub partner_id: String,
    pub base_url: String,
    pub currency: String,
}

/// Travelpayouts / Aviasales `prices_for_dates` adapter. Rows carry one
/// synthetic segment per direction (departure plus a duration, no
/// arrival), so arrivals are derived before entity construction.
pub struct TravelpayoutsAdapter {
    http: reqwest::Client,
    config: TravelpayoutsConfig,
}

#[derive(Debug, Deserialize)]
struct PricesResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Vec<PriceRow>,
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    price: Option<i64>,
    origin_airport: Option<String>,
    destination_airport: Option<String>,
    departure_at: Option<String>,
    return_at: Option<String>,
    #[serde(default)]
    duration_to: i64,
    #[serde(default)]
    duration_back: i64,
    airline: Option<String>,
    // arrives as a number in practice, occasionally a string
    flight_number: Option<Value>,
    transfers: Option<u32>,
    return_transfers: Option<u32>,
    link: Option<String>,
}

impl TravelpayoutsAdapter {
    pub fn new(config: TravelpayoutsConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn build_params(&self, query: &FlightQuery, limit: usize) -> Vec<(String, String)> {
        let return_at = query.return_date().unwrap_or_else(|| query.date_to());
        vec![
            ("origin".into(), query.origin().to_string()),
            ("destination".into(), query.destination().to_string()),
            (
                "departure_at".into(),
                query.date_from().format("%Y-%m-%d").to_string(),
            ),
            ("return_at".into(), return_at.format("%Y-%m-%d").to_string()),
            ("currency".into(), self.config.currency.clone()),
            ("token".into(), self.config.token.clone()),
            ("direct".into(), "false".into()),
            ("limit".into(), limit.to_string()),
        ]
    }
}

#[async_trait]
impl FlightProvider for TravelpayoutsAdapter {
    fn name(&self) -> &str {
        "travelpayouts"
    }

    async fn search(
        &self,
        query: &FlightQuery,
        limit: usize,
    ) -> Result<Vec<Itinerary>, UpstreamError> {
        let params = self.build_params(query, limit);
        debug!(
            "Calling Aviasales prices_for_dates {} -> {}",
            query.origin(),
            query.destination()
        );

        let response = self
            .http
            .get(&self.config.base_url)
            .query(&params)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let payload: PricesResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;
        if !payload.success {
            return Ok(vec![]);
        }

        let mut results: Vec<Itinerary> = payload
            .data
            .iter()
            .filter_map(|row| map_row(row, &self.config.currency, &self.config.partner_id))
            .collect();

        if let Some(max_price) = query.max_price() {
            results.retain(|it| it.price().amount() <= max_price);
        }
        results.truncate(limit.clamp(1, MAX_ROWS));
        Ok(results)
    }
}

/// Aviasales returns a relative path in `link`; attach the host and the
/// partner tracking marker, respecting any query string already there.
fn build_deeplink(path: &str, partner_id: &str) -> String {
    let joiner = if path.contains('?') || path.contains('&') {
        '&'
    } else {
        '?'
    };
    format!("{}{}{}marker={}", DEEPLINK_BASE, path, joiner, partner_id)
}

fn value_to_string(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Map one price row into a domain itinerary, synthesizing arrivals
/// from the row durations. Rows that cannot satisfy the entity rules
/// are skipped and logged; the batch survives.
fn map_row(row: &PriceRow, currency: &str, partner_id: &str) -> Option<Itinerary> {
    match try_map_row(row, currency, partner_id) {
        Ok(itinerary) => itinerary,
        Err(reason) => {
            info!("Skip row due to mapping error: {}", reason);
            None
        }
    }
}

fn try_map_row(
    row: &PriceRow,
    currency: &str,
    partner_id: &str,
) -> Result<Option<Itinerary>, String> {
    let price_val = match row.price {
        Some(p) => p,
        None => return Ok(None),
    };

    let departure = row
        .departure_at
        .as_deref()
        .and_then(iso::parse_datetime_utc)
        .ok_or("missing or malformed departure_at")?;
    if row.duration_to <= 0 {
        // cannot satisfy "arrival after departure"
        return Ok(None);
    }
    let arrival = departure + ChronoDuration::minutes(row.duration_to);

    let origin = AirportCode::new(row.origin_airport.as_deref().unwrap_or_default())
        .map_err(|e| e.to_string())?;
    let destination = AirportCode::new(row.destination_airport.as_deref().unwrap_or_default())
        .map_err(|e| e.to_string())?;
    let carrier = row
        .airline
        .as_deref()
        .unwrap_or_default()
        .to_ascii_uppercase();
    let flight_number = value_to_string(row.flight_number.as_ref());

    let outbound = Segment::new(
        origin.clone(),
        destination.clone(),
        departure,
        arrival,
        &carrier,
        &flight_number,
        row.transfers,
    )
    .map_err(|e| e.to_string())?;

    let mut segments = vec![outbound];
    let mut total_minutes = row.duration_to;

    if let Some(return_at) = row.return_at.as_deref() {
        if row.duration_back > 0 {
            let return_departure =
                iso::parse_datetime_utc(return_at).ok_or("malformed return_at")?;
            let return_arrival = return_departure + ChronoDuration::minutes(row.duration_back);
            // the endpoint gives no return flight number; reuse the
            // outbound one so the row survives entity validation
            let inbound = Segment::new(
                destination,
                origin,
                return_departure,
                return_arrival,
                &carrier,
                &flight_number,
                row.return_transfers,
            )
            .map_err(|e| e.to_string())?;
            segments.push(inbound);
            total_minutes += row.duration_back;
        }
    }

    let price = Money::new(price_val, currency).map_err(|e| e.to_string())?;
    let deeplink = row
        .link
        .as_deref()
        .map(|path| build_deeplink(path, partner_id));

    Itinerary::new(segments, price, total_minutes, false, deeplink)
        .map(Some)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_json() -> PriceRow {
        serde_json::from_str(
            r#"{
                "price": 250,
                "origin_airport": "TLV",
                "destination_airport": "BCN",
                "departure_at": "2030-05-01T06:00:00+03:00",
                "return_at": "2030-05-08T09:00:00+02:00",
                "duration_to": 300,
                "duration_back": 310,
                "airline": "ly",
                "flight_number": 393,
                "transfers": 0,
                "return_transfers": 1,
                "link": "/search/TLV0105BCN0805?t=abc"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn maps_row_with_synthesized_arrivals() {
        let it = map_row(&row_json(), "USD", "p123").unwrap();
        assert_eq!(it.segments().len(), 2);
        assert_eq!(it.total_duration_min(), 610);
        assert_eq!(it.segments()[0].carrier(), "LY");
        assert_eq!(it.segments()[0].flight_number(), "393");
        assert_eq!(it.segments()[0].stops(), Some(0));
        assert_eq!(it.segments()[1].stops(), Some(1));

        let arrival = it.segments()[0].arrival_utc() - it.segments()[0].departure_utc();
        assert_eq!(arrival.num_minutes(), 300);

        let link = it.deeplink().unwrap();
        assert!(link.starts_with("https://www.aviasales.com/search/"));
        assert!(link.ends_with("&marker=p123"));
    }

    #[test]
    fn row_without_price_is_skipped() {
        let mut row = row_json();
        row.price = None;
        assert!(map_row(&row, "USD", "p123").is_none());
    }

    #[test]
    fn row_without_positive_duration_is_skipped() {
        let mut row = row_json();
        row.duration_to = 0;
        assert!(map_row(&row, "USD", "p123").is_none());
    }

    #[test]
    fn row_with_bad_airport_code_is_skipped() {
        let mut row = row_json();
        row.origin_airport = Some("T1".into());
        assert!(map_row(&row, "USD", "p123").is_none());
    }

    #[test]
    fn one_way_row_maps_to_single_segment() {
        let mut row = row_json();
        row.return_at = None;
        let it = map_row(&row, "USD", "p123").unwrap();
        assert_eq!(it.segments().len(), 1);
        assert_eq!(it.total_duration_min(), 300);
    }

    #[test]
    fn deeplink_joiner_respects_existing_query_string() {
        assert_eq!(
            build_deeplink("/search/x", "m1"),
            "https://www.aviasales.com/search/x?marker=m1"
        );
        assert_eq!(
            build_deeplink("/search/x?t=1", "m1"),
            "https://www.aviasales.com/search/x?t=1&marker=m1"
        );
    }
}
