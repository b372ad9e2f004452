use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::request::SearchRequest;

/// Fixed prefix for every derived key.
pub const NAMESPACE: &str = "flights";

/// Version salt embedded in the key; bump it to invalidate every entry
/// after a payload format change.
pub const VERSION: &str = "v1";

const HASH_PREFIX_LEN: usize = 32;
const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_MAX: usize = 10;

/// Derive the deterministic cache key for a normalized request. The
/// payload has a fixed field set, absent optionals become empty-string
/// sentinels, and keys are serialized in lexicographic order, so two
/// logically identical requests always hash the same regardless of
/// insertion order or incidental formatting.
pub fn make_key(provider: &str, req: &SearchRequest) -> String {
    let mut payload = Map::new();
    let mut put = |k: &str, v: String| {
        payload.insert(k.to_string(), Value::String(v));
    };

    put("origin", req.origin.to_ascii_uppercase());
    put("destination", req.destination.to_ascii_uppercase());
    put("departureDate", req.departure_date.clone());
    put("returnDate", req.return_date.clone().unwrap_or_default());
    put(
        "maxPrice",
        req.max_price.map(|p| p.to_string()).unwrap_or_default(),
    );
    put("nonStop", if req.nonstop { "1" } else { "0" }.to_string());
    put(
        "currency",
        req.currency
            .as_deref()
            .unwrap_or(DEFAULT_CURRENCY)
            .to_ascii_uppercase(),
    );
    put("max", req.max.unwrap_or(DEFAULT_MAX).to_string());
    put("provider", provider.to_ascii_lowercase());

    // serde_json's Map is a BTreeMap, so Display emits sorted keys
    let canonical = Value::Object(payload).to_string();
    let digest = hex::encode(Sha256::digest(canonical.as_bytes()));
    format!("{}:{}:{}", NAMESPACE, VERSION, &digest[..HASH_PREFIX_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SearchRequest {
        SearchRequest {
            origin: "tlv".into(),
            destination: "BCN".into(),
            departure_date: "2030-05-01".into(),
            return_date: None,
            max_price: None,
            nonstop: true,
            currency: None,
            max: None,
        }
    }

    #[test]
    fn identical_requests_produce_identical_keys() {
        assert_eq!(make_key("amadeus", &request()), make_key("amadeus", &request()));
    }

    #[test]
    fn key_carries_namespace_and_version() {
        let key = make_key("amadeus", &request());
        let parts: Vec<&str> = key.split(':').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], NAMESPACE);
        assert_eq!(parts[1], VERSION);
        assert_eq!(parts[2].len(), HASH_PREFIX_LEN);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn incidental_formatting_does_not_change_the_key() {
        let mut shouty = request();
        shouty.origin = "TLV".into();
        shouty.currency = Some("usd".into());
        shouty.max = Some(10);
        assert_eq!(make_key("amadeus", &request()), make_key("AMADEUS", &shouty));
    }

    #[test]
    fn changing_any_single_field_changes_the_key() {
        let base = make_key("amadeus", &request());

        let mut changed = request();
        changed.nonstop = false;
        assert_ne!(base, make_key("amadeus", &changed));

        let mut changed = request();
        changed.return_date = Some("2030-05-10".into());
        assert_ne!(base, make_key("amadeus", &changed));

        let mut changed = request();
        changed.max_price = Some(300);
        assert_ne!(base, make_key("amadeus", &changed));

        assert_ne!(base, make_key("travelpayouts", &request()));
    }
}
