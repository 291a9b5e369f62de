//! # Date-Time Codec
//!
//! Contact instants are UTC with minute precision. On the wire they are
//! twelve digits, `yyyyMMddHHmm`, with no timezone suffix.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};

use super::errors::CardError;

/// chrono format of the card date-time field.
pub const HAM_DATE_FORMAT: &str = "%Y%m%d%H%M";

const HAM_DATE_LEN: usize = 12;

/// Parse a `yyyyMMddHHmm` UTC date-time.
///
/// # Errors
/// * `CardError::MalformedDateTime` - wrong length, non-digits, or no such instant
pub fn from_ham_date(s: &str) -> Result<DateTime<Utc>, CardError> {
    if s.len() != HAM_DATE_LEN || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CardError::MalformedDateTime);
    }
    NaiveDateTime::parse_from_str(s, HAM_DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| CardError::MalformedDateTime)
}

/// Format an instant as `yyyyMMddHHmm`. Seconds are dropped.
pub fn to_ham_date(when: &DateTime<Utc>) -> String {
    when.format(HAM_DATE_FORMAT).to_string()
}

/// Format an instant for display, `yyyy-MM-dd HH:mm`.
pub fn display_ham_date(when: &DateTime<Utc>) -> String {
    when.format("%Y-%m-%d %H:%M").to_string()
}

/// ADIF `QSO_DATE` value, `yyyyMMdd`.
pub fn adif_date(when: &DateTime<Utc>) -> String {
    when.format("%Y%m%d").to_string()
}

/// ADIF `TIME_ON` value, `HHmm`.
pub fn adif_time(when: &DateTime<Utc>) -> String {
    when.format("%H%M").to_string()
}

/// Drop seconds and sub-second precision.
pub fn truncate_to_minute(when: DateTime<Utc>) -> DateTime<Utc> {
    when.with_second(0)
        .and_then(|w| w.with_nanosecond(0))
        .unwrap_or(when)
}
