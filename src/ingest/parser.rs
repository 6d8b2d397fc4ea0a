//! Row parser
//!
//! Field-level validation for uploaded rows.

use chrono::{DateTime, FixedOffset};
use csv::StringRecord;

use crate::error::FieldError;
use crate::record::Promotion;

/// Columns per row: identifier, price, expiration
pub const COLUMN_COUNT: usize = 3;

/// Layout of the expiration column, minus the trailing zone abbreviation
pub const EXPIRATION_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f %z";

/// Parse one CSV row into a promotion
pub fn parse_row(row: &StringRecord) -> Result<Promotion, FieldError> {
    if row.len() != COLUMN_COUNT {
        return Err(FieldError::ColumnCount {
            expected: COLUMN_COUNT,
            found: row.len(),
        });
    }

    let id = &row[0];
    let price = parse_price(&row[1])?;
    let expiration = parse_expiration(&row[2])?;

    Ok(Promotion::new(id, price, expiration))
}

/// Parse a non-negative, finite decimal price
pub fn parse_price(value: &str) -> Result<f64, FieldError> {
    let invalid = |reason: &str| FieldError::InvalidPrice {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let price: f64 = value
        .parse()
        .map_err(|e: std::num::ParseFloatError| invalid(&e.to_string()))?;

    if !price.is_finite() {
        return Err(invalid("price must be finite"));
    }
    if price < 0.0 {
        return Err(invalid("price must not be negative"));
    }

    // Fold -0 into 0 so it never renders as "-0.00"
    Ok(if price == 0.0 { 0.0 } else { price })
}

/// Parse `YYYY-MM-DD HH:MM:SS ±HHMM ZONE`
///
/// Every field is zero padded and separated by exactly one space. Seconds
/// may carry a fraction (`05.250`). The numeric offset is authoritative; the
/// zone abbreviation must be well formed but is not resolved against a
/// timezone database.
pub fn parse_expiration(value: &str) -> Result<DateTime<FixedOffset>, FieldError> {
    let invalid = |reason: String| FieldError::InvalidExpiration {
        value: value.to_string(),
        reason,
    };

    let parts: Vec<&str> = value.split(' ').collect();
    let &[date, time, offset, zone] = parts.as_slice() else {
        return Err(invalid(format!(
            "expected 4 space-separated fields, found {}",
            parts.len()
        )));
    };

    if !has_shape(date, "dddd-dd-dd") {
        return Err(invalid(format!("bad date {:?}", date)));
    }
    if !is_clock_time(time) {
        return Err(invalid(format!("bad time {:?}", time)));
    }
    if !has_shape(offset, "sdddd") {
        return Err(invalid(format!("bad offset {:?}", offset)));
    }
    if !is_zone_abbreviation(zone) {
        return Err(invalid(format!("bad zone abbreviation {:?}", zone)));
    }

    let timestamp = &value[..value.len() - zone.len() - 1];
    DateTime::parse_from_str(timestamp, EXPIRATION_FORMAT).map_err(|e| invalid(e.to_string()))
}

/// Match `value` against a pattern where `d` is a digit, `s` a sign and
/// anything else a literal byte
fn has_shape(value: &str, pattern: &str) -> bool {
    value.len() == pattern.len()
        && value.bytes().zip(pattern.bytes()).all(|(b, p)| match p {
            b'd' => b.is_ascii_digit(),
            b's' => b == b'+' || b == b'-',
            _ => b == p,
        })
}

/// `HH:MM:SS` with an optional `.fraction`
fn is_clock_time(value: &str) -> bool {
    match value.split_once('.') {
        Some((clock, fraction)) => {
            has_shape(clock, "dd:dd:dd")
                && !fraction.is_empty()
                && fraction.bytes().all(|b| b.is_ascii_digit())
        }
        None => has_shape(value, "dd:dd:dd"),
    }
}

/// Zone abbreviations: `UTC`, three upper-case letters, four or five ending
/// in `T`, `GMT` with an hour offset, or a bare `±hh`
fn is_zone_abbreviation(zone: &str) -> bool {
    if matches!(zone, "UTC" | "GMT" | "ChST" | "MeST" | "WITA") {
        return true;
    }
    if let Some(hours) = zone.strip_prefix("GMT") {
        return is_gmt_hours(hours);
    }
    if zone.starts_with(|c: char| c == '+' || c == '-') {
        return has_shape(zone, "sdd");
    }

    let bytes = zone.as_bytes();
    if !bytes.iter().all(u8::is_ascii_uppercase) {
        return false;
    }
    match bytes.len() {
        3 => true,
        4 | 5 => bytes[bytes.len() - 1] == b'T',
        _ => false,
    }
}

/// `+h`, `-hh`, ... up to 23 hours
fn is_gmt_hours(value: &str) -> bool {
    let Some(digits) = value.strip_prefix(|c: char| c == '+' || c == '-') else {
        return false;
    };
    (1..=2).contains(&digits.len())
        && digits.bytes().all(|b| b.is_ascii_digit())
        && digits.parse::<u8>().map_or(false, |h| h <= 23)
}
