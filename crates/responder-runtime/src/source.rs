//! Communication sources and Apple timestamp conversion.

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::types::ValueRef;

use responder_models::{CommunicationEvent, SourceKind};

use crate::error::SourceError;

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z.
pub const APPLE_EPOCH_OFFSET: i64 = 978_307_200;

/// Message `date` values above this are nanoseconds, below it seconds.
const NANOSECOND_THRESHOLD: i64 = 100_000_000_000;

/// A local history database producing missed-communication entries.
///
/// Implementations are blocking; the watcher calls them on the blocking pool.
pub trait CommunicationSource: Send + Sync {
    /// Which marker this source advances.
    fn kind(&self) -> SourceKind;

    /// Highest row id currently in the source, `None` when it is empty.
    fn latest_key(&self) -> Result<Option<i64>, SourceError>;

    /// Missed entries with `key > marker`, ascending by key, at most `limit`.
    fn fetch_after(&self, marker: i64, limit: usize)
        -> Result<Vec<CommunicationEvent>, SourceError>;
}

/// 2001-01-01T00:00:00Z, used for timestamps that cannot be decoded.
pub fn apple_epoch() -> DateTime<Utc> {
    Utc.timestamp_opt(APPLE_EPOCH_OFFSET, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Converts Core Data seconds since 2001 to UTC.
pub fn apple_seconds_to_utc(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.trunc() as i64;
    let nanos = ((seconds - seconds.trunc()) * 1e9).round() as u32;
    Utc.timestamp_opt(whole.checked_add(APPLE_EPOCH_OFFSET)?, nanos.min(999_999_999))
        .single()
}

/// Converts a Messages `date` column to UTC.
///
/// Newer databases store nanoseconds since 2001, older ones seconds.
pub fn apple_message_date_to_utc(raw: i64) -> Option<DateTime<Utc>> {
    if raw.unsigned_abs() > NANOSECOND_THRESHOLD as u64 {
        let seconds = raw.div_euclid(1_000_000_000);
        let nanos = raw.rem_euclid(1_000_000_000) as u32;
        Utc.timestamp_opt(seconds.checked_add(APPLE_EPOCH_OFFSET)?, nanos)
            .single()
    } else {
        Utc.timestamp_opt(raw.checked_add(APPLE_EPOCH_OFFSET)?, 0)
            .single()
    }
}

/// Reads a column that may be stored as text, blob, or null.
pub(crate) fn text_value(value: ValueRef<'_>) -> Option<String> {
    let text = match value {
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Integer(n) => n.to_string(),
        ValueRef::Real(_) | ValueRef::Null => return None,
    };
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Reads a numeric column as `f64`.
pub(crate) fn real_value(value: ValueRef<'_>) -> Option<f64> {
    match value {
        ValueRef::Real(r) => Some(r),
        ValueRef::Integer(n) => Some(n as f64),
        _ => None,
    }
}

/// Reads a numeric column as `i64`.
pub(crate) fn integer_value(value: ValueRef<'_>) -> Option<i64> {
    match value {
        ValueRef::Integer(n) => Some(n),
        ValueRef::Real(r) if r.is_finite() => Some(r as i64),
        _ => None,
    }
}
