use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use skyfare_domain::{AirportCode, FlightQuery};

use crate::dates;
use crate::service::SearchError;

/// Inbound search request as received from the caller. Dates are loose
/// text ("april", "2025-9-5"); [`SearchRequest::to_query`] normalizes
/// them and builds a validated [`FlightQuery`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    #[serde(default)]
    pub return_date: Option<String>,
    #[serde(default)]
    pub max_price: Option<i64>,
    #[serde(default, rename = "nonStop")]
    pub nonstop: bool,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub max: Option<usize>,
}

impl SearchRequest {
    /// Normalize dates (month words resolved, past dates rolled forward)
    /// and construct the validated query. Validation failures propagate;
    /// they are never silently corrected.
    pub fn to_query(&self, today: NaiveDate) -> Result<FlightQuery, SearchError> {
        let departure = self.coerce_future(&self.departure_date, today)?;
        let return_date = match self.return_date.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Some(self.coerce_future(raw, today)?),
            _ => None,
        };

        let query = FlightQuery::new(
            AirportCode::new(&self.origin)?,
            AirportCode::new(&self.destination)?,
            departure,
            departure,
            return_date,
            self.nonstop,
            self.max_price,
        )?;
        Ok(query)
    }

    fn coerce_future(&self, raw: &str, today: NaiveDate) -> Result<NaiveDate, SearchError> {
        let iso = dates::normalize_departure(raw, today)?;
        let parsed = dates::parse_iso(&iso)?;
        Ok(dates::ensure_future(parsed, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyfare_domain::DomainError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(departure: &str) -> SearchRequest {
        SearchRequest {
            origin: "tlv".into(),
            destination: "bcn".into(),
            departure_date: departure.into(),
            return_date: None,
            max_price: None,
            nonstop: true,
            currency: None,
            max: None,
        }
    }

    #[test]
    fn past_departure_rolls_forward_keeping_month_and_day() {
        let today = date(2025, 6, 1);
        let query = request("2024-01-01").to_query(today).unwrap();
        assert_eq!(query.date_from(), date(2026, 1, 1));
        assert!(query.date_from() >= today);
        assert!(query.nonstop());
    }

    #[test]
    fn month_word_departure_is_resolved() {
        let query = request("april").to_query(date(2025, 6, 1)).unwrap();
        assert_eq!(query.date_from(), date(2026, 4, 15));
        assert_eq!(query.origin().as_str(), "TLV");
    }

    #[test]
    fn return_date_is_normalized_too() {
        let mut req = request("2030-5-1");
        req.return_date = Some("2030-5-9".into());
        let query = req.to_query(date(2025, 6, 1)).unwrap();
        assert_eq!(query.return_date(), Some(date(2030, 5, 9)));
    }

    #[test]
    fn same_origin_and_destination_is_rejected() {
        let mut req = request("2030-05-01");
        req.destination = "TLV".into();
        let err = req.to_query(date(2025, 6, 1)).unwrap_err();
        assert!(matches!(
            err,
            SearchError::Domain(DomainError::InvalidQuery(_))
        ));
    }

    #[test]
    fn malformed_departure_is_rejected() {
        let err = request("soonish ok").to_query(date(2025, 6, 1)).unwrap_err();
        assert!(matches!(err, SearchError::Date(_)));
    }

    #[test]
    fn camel_case_wire_format() {
        let req: SearchRequest = serde_json::from_str(
            r#"{"origin":"TLV","destination":"BCN","departureDate":"2030-05-01","nonStop":true,"maxPrice":400}"#,
        )
        .unwrap();
        assert!(req.nonstop);
        assert_eq!(req.max_price, Some(400));
        assert!(req.return_date.is_none());
    }
}
