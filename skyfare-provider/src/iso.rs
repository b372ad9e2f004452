use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse an upstream timestamp into an aware UTC datetime. Accepts full
/// offsets ("2025-12-20T11:10:00+02:00"), a trailing "Z", or a naive
/// local timestamp, which is taken as UTC.
pub fn parse_datetime_utc(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Parse an ISO-8601 duration like "PT5H10M", "PT3H" or "PT45M" into
/// minutes. Unparseable components count as zero, matching the lenient
/// handling the upstream feeds require.
pub fn duration_to_minutes(s: &str) -> i64 {
    let s = s.trim().to_ascii_uppercase();
    let body = s.strip_prefix("PT").unwrap_or(&s);

    let mut hours = 0i64;
    let mut mins = 0i64;
    let mut rest = body;
    if let Some(pos) = rest.find('H') {
        hours = rest[..pos].parse().unwrap_or(0);
        rest = &rest[pos + 1..];
    }
    if let Some(pos) = rest.find('M') {
        mins = rest[..pos].parse().unwrap_or(0);
    }
    hours * 60 + mins
}
