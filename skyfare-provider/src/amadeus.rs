use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use skyfare_core::provider::{FlightProvider, UpstreamError};
use skyfare_domain::{AirportCode, FlightQuery, Itinerary, Money, Segment};

use crate::iso;
use crate::token::TokenCache;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct AmadeusConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub flights_url: String,
    pub currency: String,
}

/// Amadeus Flight Offers adapter: OAuth2 client-credentials auth with a
/// single-slot token memo, one offers request per search, and mapping
/// of just the fields the domain needs.
pub struct AmadeusAdapter {
    http: reqwest::Client,
    config: AmadeusConfig,
    tokens: Arc<TokenCache>,
}

// ============================================================================
// Wire format (Flight Offers Search)
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct OffersResponse {
    #[serde(default)]
    data: Vec<RawOffer>,
}

#[derive(Debug, Deserialize)]
struct RawOffer {
    price: Option<RawPrice>,
    #[serde(default)]
    itineraries: Vec<RawItinerary>,
}

#[derive(Debug, Deserialize)]
struct RawPrice {
    #[serde(rename = "grandTotal")]
    grand_total: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawItinerary {
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    segments: Vec<RawSegment>,
}

#[derive(Debug, Deserialize)]
struct RawSegment {
    departure: RawEndpoint,
    arrival: RawEndpoint,
    #[serde(rename = "carrierCode", default)]
    carrier_code: String,
    #[serde(default)]
    number: String,
}

#[derive(Debug, Deserialize)]
struct RawEndpoint {
    #[serde(rename = "iataCode")]
    iata_code: String,
    at: String,
}

impl AmadeusAdapter {
    pub fn new(config: AmadeusConfig, tokens: Arc<TokenCache>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            tokens,
        }
    }

    /// Reuse the memoized token while it is fresh, otherwise run the
    /// client-credentials exchange and refill the slot.
    async fn access_token(&self) -> Result<String, UpstreamError> {
        if let Some(token) = self.tokens.get_unexpired() {
            return Ok(token);
        }

        debug!("Requesting fresh Amadeus access token");
        let response = self
            .http
            .post(&self.config.auth_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(UpstreamError::Auth(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;
        self.tokens
            .store(body.access_token.clone(), body.expires_in);
        Ok(body.access_token)
    }

    fn build_params(&self, query: &FlightQuery, limit: usize) -> Vec<(String, String)> {
        let mut params = vec![
            ("originLocationCode".into(), query.origin().to_string()),
            (
                "destinationLocationCode".into(),
                query.destination().to_string(),
            ),
            (
                "departureDate".into(),
                query.date_from().format("%Y-%m-%d").to_string(),
            ),
            ("adults".into(), "1".into()),
            ("currencyCode".into(), self.config.currency.clone()),
            ("max".into(), limit.to_string()),
            (
                "nonStop".into(),
                if query.nonstop() { "true" } else { "false" }.into(),
            ),
        ];
        if let Some(ret) = query.return_date() {
            params.push(("returnDate".into(), ret.format("%Y-%m-%d").to_string()));
        }
        params
    }
}

#[async_trait]
impl FlightProvider for AmadeusAdapter {
    fn name(&self) -> &str {
        "amadeus"
    }

    async fn search(
        &self,
        query: &FlightQuery,
        limit: usize,
    ) -> Result<Vec<Itinerary>, UpstreamError> {
        let token = self.access_token().await?;
        let params = self.build_params(query, limit);
        debug!(
            "Calling Amadeus flight offers {} -> {}",
            query.origin(),
            query.destination()
        );

        let response = self
            .http
            .get(&self.config.flights_url)
            .bearer_auth(token)
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

        let payload: OffersResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;

        let mut results: Vec<Itinerary> = payload
            .data
            .iter()
            .filter_map(|offer| map_offer(offer, &self.config.currency))
            .collect();

        // the offers endpoint has no price ceiling parameter
        if let Some(max_price) = query.max_price() {
            results.retain(|it| it.price().amount() <= max_price);
        }
        Ok(results)
    }
}

/// Map one raw offer into a domain itinerary. Offers missing a price,
/// segments or a positive duration are dropped, not escalated; a bad
/// row must never fail the whole batch.
fn map_offer(offer: &RawOffer, currency: &str) -> Option<Itinerary> {
    let price_total = offer.price.as_ref()?.grand_total.as_deref()?;
    let amount = price_total.parse::<f64>().ok()? as i64;

    let outbound = offer.itineraries.first()?;
    let (mut segments, outbound_min) = map_segments(outbound)?;
    if segments.is_empty() || outbound_min <= 0 {
        return None;
    }
    let mut total_minutes = outbound_min;

    if let Some(inbound) = offer.itineraries.get(1) {
        if let Some((inbound_segs, inbound_min)) = map_segments(inbound) {
            if !inbound_segs.is_empty() && inbound_min > 0 {
                segments.extend(inbound_segs);
                total_minutes += inbound_min;
            }
        }
    }

    let price = match Money::new(amount, currency) {
        Ok(price) => price,
        Err(e) => {
            warn!("Skipping Amadeus offer, bad price: {}", e);
            return None;
        }
    };
    match Itinerary::new(segments, price, total_minutes, false, None) {
        Ok(itinerary) => Some(itinerary),
        Err(e) => {
            warn!("Skipping Amadeus offer: {}", e);
            None
        }
    }
}

fn map_segments(itin: &RawItinerary) -> Option<(Vec<Segment>, i64)> {
    if itin.segments.is_empty() {
        return None;
    }

    let mut segments = Vec::with_capacity(itin.segments.len());
    for raw in &itin.segments {
        let departure = iso::parse_datetime_utc(&raw.departure.at)?;
        let arrival = iso::parse_datetime_utc(&raw.arrival.at)?;
        let segment = Segment::new(
            AirportCode::new(&raw.departure.iata_code).ok()?,
            AirportCode::new(&raw.arrival.iata_code).ok()?,
            departure,
            arrival,
            &raw.carrier_code,
            &raw.number,
            None,
        );
        match segment {
            Ok(segment) => segments.push(segment),
            Err(e) => {
                warn!("Skipping Amadeus itinerary, bad segment: {}", e);
                return None;
            }
        }
    }

    let minutes = iso::duration_to_minutes(itin.duration.as_deref().unwrap_or("PT0M"));
    Some((segments, minutes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer_json(price: &str) -> RawOffer {
        serde_json::from_str(&format!(
            r#"{{
                "price": {{"grandTotal": "{price}"}},
                "itineraries": [
                    {{
                        "duration": "PT5H0M",
                        "segments": [
                            {{
                                "departure": {{"iataCode": "TLV", "at": "2030-05-01T06:00:00"}},
                                "arrival": {{"iataCode": "BCN", "at": "2030-05-01T11:00:00"}},
                                "carrierCode": "LY",
                                "number": "393"
                            }}
                        ]
                    }},
                    {{
                        "duration": "PT5H0M",
                        "segments": [
                            {{
                                "departure": {{"iataCode": "BCN", "at": "2030-05-08T09:00:00"}},
                                "arrival": {{"iataCode": "TLV", "at": "2030-05-08T14:00:00"}},
                                "carrierCode": "LY",
                                "number": "394"
                            }}
                        ]
                    }}
                ]
            }}"#
        ))
        .unwrap()
    }

    #[test]
    fn maps_round_trip_offer_into_four_fields_we_need() {
        let it = map_offer(&offer_json("253.40"), "USD").unwrap();
        assert_eq!(it.segments().len(), 2);
        assert_eq!(it.price().amount(), 253);
        assert_eq!(it.total_duration_min(), 600);
        assert_eq!(it.segments()[0].flight_number(), "393");
    }

    #[test]
    fn offer_without_price_is_skipped() {
        let offer: RawOffer =
            serde_json::from_str(r#"{"price": null, "itineraries": []}"#).unwrap();
        assert!(map_offer(&offer, "USD").is_none());
    }

    #[test]
    fn offer_with_unparseable_price_is_skipped() {
        assert!(map_offer(&offer_json("free"), "USD").is_none());
    }

    #[test]
    fn offer_without_segments_is_skipped() {
        let offer: RawOffer = serde_json::from_str(
            r#"{"price": {"grandTotal": "100.00"}, "itineraries": [{"duration": "PT2H", "segments": []}]}"#,
        )
        .unwrap();
        assert!(map_offer(&offer, "USD").is_none());
    }

    #[test]
    fn offer_with_zero_duration_is_skipped() {
        let mut offer = offer_json("100.00");
        offer.itineraries[0].duration = Some("PT0M".into());
        offer.itineraries.truncate(1);
        assert!(map_offer(&offer, "USD").is_none());
    }
}
