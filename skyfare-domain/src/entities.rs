use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::{DomainError, DomainResult};

/// IATA airport code, e.g. "TLV" or "BCN". Normalized to uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AirportCode(String);

impl AirportCode {
    pub fn new(code: &str) -> DomainResult<Self> {
        let code = code.trim().to_ascii_uppercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidAirportCode(format!(
                "IATA code must be 3 letters (got '{}')",
                code
            )));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AirportCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Price container in whole currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Money {
    amount: i64,
    currency: String,
}

impl Money {
    pub fn new(amount: i64, currency: &str) -> DomainResult<Self> {
        if amount < 0 {
            return Err(DomainError::InvalidMoney(format!(
                "amount must be >= 0 (got {})",
                amount
            )));
        }
        if currency.len() != 3 {
            return Err(DomainError::InvalidMoney(format!(
                "currency must be a 3-letter code (got '{}')",
                currency
            )));
        }
        Ok(Self {
            amount,
            currency: currency.to_ascii_uppercase(),
        })
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}

/// A structured flight search request, validated at construction.
#[derive(Debug, Clone, Serialize)]
pub struct FlightQuery {
    origin: AirportCode,
    destination: AirportCode,
    date_from: NaiveDate,
    date_to: NaiveDate,
    return_date: Option<NaiveDate>,
    nonstop: bool,
    max_price: Option<i64>,
}

impl FlightQuery {
    pub fn new(
        origin: AirportCode,
        destination: AirportCode,
        date_from: NaiveDate,
        date_to: NaiveDate,
        return_date: Option<NaiveDate>,
        nonstop: bool,
        max_price: Option<i64>,
    ) -> DomainResult<Self> {
        if origin == destination {
            return Err(DomainError::InvalidQuery(
                "origin and destination must differ".into(),
            ));
        }
        if date_to < date_from {
            return Err(DomainError::InvalidQuery(
                "date_to must be on or after date_from".into(),
            ));
        }
        if let Some(ret) = return_date {
            if ret < date_from {
                return Err(DomainError::InvalidQuery(
                    "return_date must be after departure date".into(),
                ));
            }
        }
        if let Some(price) = max_price {
            if price <= 0 {
                return Err(DomainError::InvalidQuery("max_price must be > 0".into()));
            }
        }
        Ok(Self {
            origin,
            destination,
            date_from,
            date_to,
            return_date,
            nonstop,
            max_price,
        })
    }

    pub fn origin(&self) -> &AirportCode {
        &self.origin
    }

    pub fn destination(&self) -> &AirportCode {
        &self.destination
    }

    pub fn date_from(&self) -> NaiveDate {
        self.date_from
    }

    pub fn date_to(&self) -> NaiveDate {
        self.date_to
    }

    pub fn return_date(&self) -> Option<NaiveDate> {
        self.return_date
    }

    pub fn nonstop(&self) -> bool {
        self.nonstop
    }

    pub fn max_price(&self) -> Option<i64> {
        self.max_price
    }
}

/// One flown hop between two airports on a single flight number.
#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    origin: AirportCode,
    destination: AirportCode,
    departure_utc: DateTime<Utc>,
    arrival_utc: DateTime<Utc>,
    carrier: String,
    flight_number: String,
    stops: Option<u32>,
}

impl Segment {
    pub fn new(
        origin: AirportCode,
        destination: AirportCode,
        departure_utc: DateTime<Utc>,
        arrival_utc: DateTime<Utc>,
        carrier: &str,
        flight_number: &str,
        stops: Option<u32>,
    ) -> DomainResult<Self> {
        if arrival_utc <= departure_utc {
            return Err(DomainError::InvalidSegment(
                "arrival must be after departure".into(),
            ));
        }
        if carrier.is_empty() || flight_number.is_empty() {
            return Err(DomainError::InvalidSegment(
                "carrier and flight_number are required".into(),
            ));
        }
        Ok(Self {
            origin,
            destination,
            departure_utc,
            arrival_utc,
            carrier: carrier.to_string(),
            flight_number: flight_number.to_string(),
            stops,
        })
    }

    pub fn origin(&self) -> &AirportCode {
        &self.origin
    }

    pub fn destination(&self) -> &AirportCode {
        &self.destination
    }

    pub fn departure_utc(&self) -> DateTime<Utc> {
        self.departure_utc
    }

    pub fn arrival_utc(&self) -> DateTime<Utc> {
        self.arrival_utc
    }

    pub fn carrier(&self) -> &str {
        &self.carrier
    }

    pub fn flight_number(&self) -> &str {
        &self.flight_number
    }

    pub fn stops(&self) -> Option<u32> {
        self.stops
    }
}

/// A priced trip: one or more chronologically ordered segments.
#[derive(Debug, Clone, Serialize)]
pub struct Itinerary {
    segments: Vec<Segment>,
    price: Money,
    total_duration_min: i64,
    bags_included: bool,
    deeplink: Option<String>,
}

impl Itinerary {
    pub fn new(
        segments: Vec<Segment>,
        price: Money,
        total_duration_min: i64,
        bags_included: bool,
        deeplink: Option<String>,
    ) -> DomainResult<Self> {
        if segments.is_empty() {
            return Err(DomainError::InvalidItinerary(
                "itinerary must include at least one segment".into(),
            ));
        }
        if total_duration_min <= 0 {
            return Err(DomainError::InvalidItinerary(
                "total_duration_min must be > 0".into(),
            ));
        }
        Ok(Self {
            segments,
            price,
            total_duration_min,
            bags_included,
            deeplink,
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn price(&self) -> &Money {
        &self.price
    }

    pub fn total_duration_min(&self) -> i64 {
        self.total_duration_min
    }

    pub fn bags_included(&self) -> bool {
        self.bags_included
    }

    pub fn deeplink(&self) -> Option<&str> {
        self.deeplink.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn airport_code_uppercases_valid_input() {
        let code = AirportCode::new("tlv").unwrap();
        assert_eq!(code.as_str(), "TLV");
        assert_eq!(AirportCode::new(" bcn ").unwrap().as_str(), "BCN");
    }

    #[test]
    fn airport_code_rejects_bad_shapes() {
        assert!(AirportCode::new("TL").is_err());
        assert!(AirportCode::new("TLVX").is_err());
        assert!(AirportCode::new("T1V").is_err());
        assert!(AirportCode::new("").is_err());
    }

    #[test]
    fn money_rejects_negative_amount_and_bad_currency() {
        assert!(Money::new(-1, "USD").is_err());
        assert!(Money::new(100, "US").is_err());
        let m = Money::new(100, "usd").unwrap();
        assert_eq!(m.currency(), "USD");
        assert_eq!(m.amount(), 100);
    }

    #[test]
    fn query_rejects_same_origin_and_destination() {
        let tlv = AirportCode::new("TLV").unwrap();
        let result = FlightQuery::new(
            tlv.clone(),
            tlv.clone(),
            date(2030, 1, 1),
            date(2030, 1, 1),
            None,
            true,
            None,
        );
        assert!(result.is_err());

        // changing only the destination makes it succeed
        let bcn = AirportCode::new("BCN").unwrap();
        let result = FlightQuery::new(
            tlv,
            bcn,
            date(2030, 1, 1),
            date(2030, 1, 1),
            None,
            true,
            None,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn query_rejects_inverted_date_window_and_bad_price() {
        let tlv = AirportCode::new("TLV").unwrap();
        let bcn = AirportCode::new("BCN").unwrap();
        assert!(FlightQuery::new(
            tlv.clone(),
            bcn.clone(),
            date(2030, 2, 1),
            date(2030, 1, 1),
            None,
            false,
            None,
        )
        .is_err());
        assert!(FlightQuery::new(
            tlv.clone(),
            bcn.clone(),
            date(2030, 1, 1),
            date(2030, 1, 1),
            Some(date(2029, 12, 1)),
            false,
            None,
        )
        .is_err());
        assert!(FlightQuery::new(
            tlv,
            bcn,
            date(2030, 1, 1),
            date(2030, 1, 1),
            None,
            false,
            Some(0),
        )
        .is_err());
    }

    #[test]
    fn segment_requires_forward_time_and_identifiers() {
        let tlv = AirportCode::new("TLV").unwrap();
        let bcn = AirportCode::new("BCN").unwrap();
        let dep = ts(2030, 1, 1, 10, 0);
        let arr = ts(2030, 1, 1, 14, 0);
        assert!(Segment::new(tlv.clone(), bcn.clone(), arr, dep, "LY", "LY393", None).is_err());
        assert!(Segment::new(tlv.clone(), bcn.clone(), dep, arr, "", "LY393", None).is_err());
        assert!(Segment::new(tlv.clone(), bcn.clone(), dep, arr, "LY", "", None).is_err());
        assert!(Segment::new(tlv, bcn, dep, arr, "LY", "LY393", Some(0)).is_ok());
    }

    #[test]
    fn itinerary_requires_segments_and_positive_duration() {
        let price = Money::new(120, "USD").unwrap();
        assert!(Itinerary::new(vec![], price.clone(), 240, false, None).is_err());

        let tlv = AirportCode::new("TLV").unwrap();
        let bcn = AirportCode::new("BCN").unwrap();
        let seg = Segment::new(
            tlv,
            bcn,
            ts(2030, 1, 1, 10, 0),
            ts(2030, 1, 1, 14, 0),
            "LY",
            "LY393",
            None,
        )
        .unwrap();
        assert!(Itinerary::new(vec![seg.clone()], price.clone(), 0, false, None).is_err());
        assert!(Itinerary::new(vec![seg], price, 240, false, None).is_ok());
    }
}
