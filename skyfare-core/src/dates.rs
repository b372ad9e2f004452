use chrono::{Datelike, NaiveDate};

/// Failures while interpreting loosely specified date input.
#[derive(Debug, thiserror::Error)]
pub enum DateError {
    #[error("bad date format: {0}")]
    MalformedDate(String),

    #[error("unknown month: {0}")]
    UnknownMonth(String),

    #[error("{0}")]
    PastDate(String),
}

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Middle-of-month day used when only a month word is given.
pub const DEFAULT_DAY: u32 = 15;

fn month_from_name(name: &str) -> Option<u32> {
    if name.len() < 3 {
        return None;
    }
    let prefix = name[..3].to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| m.starts_with(&prefix))
        .map(|i| i as u32 + 1)
}

/// Accepts "april" or "2025-09-15" (also "2025-9-5") and returns
/// canonical `YYYY-MM-DD`. A bare month resolves to its next occurrence
/// at-or-after the current month, so the result is never in the past.
pub fn normalize_departure(value: &str, today: NaiveDate) -> Result<String, DateError> {
    normalize_departure_with_day(value, today, DEFAULT_DAY)
}

pub fn normalize_departure_with_day(
    value: &str,
    today: NaiveDate,
    default_day: u32,
) -> Result<String, DateError> {
    let v = value.trim();

    // month-only (e.g., "april")
    if !v.is_empty() && v.chars().all(|c| c.is_ascii_alphabetic()) {
        let month = month_from_name(v).ok_or_else(|| DateError::UnknownMonth(v.to_string()))?;
        let year = if month >= today.month() {
            today.year()
        } else {
            today.year() + 1
        };
        // safe day (handles Feb)
        let day = if month == 2 {
            default_day.min(28)
        } else {
            default_day.min(30)
        };
        return Ok(format!("{:04}-{:02}-{:02}", year, month, day));
    }

    // ISO-ish date, possibly with non-zero-padded components
    let parts: Vec<&str> = v.split('-').collect();
    if parts.len() == 3 {
        let nums: Result<Vec<i64>, _> = parts.iter().map(|p| p.parse::<i64>()).collect();
        if let Ok(nums) = nums {
            return Ok(format!("{:04}-{:02}-{:02}", nums[0], nums[1], nums[2]));
        }
    }
    Err(DateError::MalformedDate(v.to_string()))
}

/// Parse a canonical `YYYY-MM-DD` string.
pub fn parse_iso(value: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| DateError::MalformedDate(value.to_string()))
}

/// If `d` is in the past, roll it forward by whole years until it is
/// today or later, clamping the day when the target month is shorter
/// (Feb 29 of a leap year rolls to Feb 28). Idempotent for dates that
/// are already in the future.
pub fn roll_to_future(mut d: NaiveDate, today: NaiveDate) -> NaiveDate {
    while d < today {
        let year = d.year() + 1;
        let day = d.day().min(days_in_month(year, d.month()));
        match NaiveDate::from_ymd_opt(year, d.month(), day) {
            Some(next) => d = next,
            None => break,
        }
    }
    d
}

/// Permissive auto-correct policy: past dates are rolled forward rather
/// than rejected. The strict inverse is [`validate_dates_in_text`].
pub fn ensure_future(d: NaiveDate, today: NaiveDate) -> NaiveDate {
    if d < today {
        roll_to_future(d, today)
    } else {
        d
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

/// Scan free text for `YYYY-MM-DD` dates and reject past dates outright.
/// When two dates appear they are treated as departure + return, and the
/// return must be strictly after the departure. This is the strict
/// counterpart of the rolling policy above; the two coexist by design.
pub fn validate_dates_in_text(text: &str, today: NaiveDate) -> Result<(), DateError> {
    let dates = extract_iso_dates(text);
    if dates.is_empty() {
        return Ok(());
    }

    for d in &dates {
        if *d < today {
            return Err(DateError::PastDate(format!(
                "date {} is in the past (today is {})",
                d, today
            )));
        }
    }

    if dates.len() >= 2 {
        let (depart, ret) = (dates[0], dates[1]);
        if ret <= depart {
            return Err(DateError::PastDate(format!(
                "return date {} must be after departure {}",
                ret, depart
            )));
        }
    }
    Ok(())
}

fn extract_iso_dates(text: &str) -> Vec<NaiveDate> {
    let bytes = text.as_bytes();
    let mut dates = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if let Some((date, consumed)) = match_iso_date(&bytes[i..]) {
            if let Some(d) = date {
                dates.push(d);
            }
            i += consumed;
        } else {
            i += 1;
        }
    }
    dates
}

/// Match `\d{4}-\d{1,2}-\d{1,2}` at the start of `bytes`. Returns the
/// parsed date (None for calendar-invalid matches, which are skipped)
/// and the number of bytes consumed.
fn match_iso_date(bytes: &[u8]) -> Option<(Option<NaiveDate>, usize)> {
    let digits = |b: &[u8], max: usize| -> usize {
        b.iter().take(max).take_while(|c| c.is_ascii_digit()).count()
    };

    let y = digits(bytes, 4);
    if y != 4 || bytes.get(4) != Some(&b'-') {
        return None;
    }
    let rest = &bytes[5..];
    let m = digits(rest, 2);
    if m == 0 || rest.get(m) != Some(&b'-') {
        return None;
    }
    let rest2 = &rest[m + 1..];
    let d = digits(rest2, 2);
    if d == 0 {
        return None;
    }

    let consumed = 4 + 1 + m + 1 + d;
    let text = std::str::from_utf8(&bytes[..consumed]).ok()?;
    let parts: Vec<u32> = text.split('-').filter_map(|p| p.parse().ok()).collect();
    let date = if parts.len() == 3 {
        NaiveDate::from_ymd_opt(parts[0] as i32, parts[1], parts[2])
    } else {
        None
    };
    Some((date, consumed))
}
