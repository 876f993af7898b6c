/// Per-document decode for stored sensor readings.
///
/// Stored documents are schema-flexible JSON: `valor` may be a number or a
/// numeric string, and `timestamp` is either the native RFC 3339 string
/// written at ingest or the legacy nested encoding carried over from the
/// old MongoDB deployment (`{"$date": {"$numberLong": "<epoch-ms>"}}`).
/// Both forms are normalized here, once, into a `DecodedReading` with an
/// absolute UTC instant.
///
/// Decode failures are per-document: `decode_document` returns a
/// `SkipReason` and the aggregation paths filter-map over it, so one bad
/// document never aborts a whole series.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::model::DecodedReading;

// ---------------------------------------------------------------------------
// Skip reasons
// ---------------------------------------------------------------------------

/// Why a single stored document was excluded from aggregation output.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// `sensor` is absent or not a string.
    MissingSensor,
    /// `valor` is absent.
    MissingValue,
    /// `valor` is present but cannot be coerced to a float.
    NonNumericValue(String),
    /// `timestamp` is absent.
    MissingTimestamp,
    /// `timestamp` is present but not decodable in any supported form.
    BadTimestamp(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingSensor => write!(f, "missing 'sensor' field"),
            SkipReason::MissingValue => write!(f, "missing 'valor' field"),
            SkipReason::NonNumericValue(raw) => write!(f, "non-numeric 'valor': {}", raw),
            SkipReason::MissingTimestamp => write!(f, "missing 'timestamp' field"),
            SkipReason::BadTimestamp(raw) => write!(f, "undecodable 'timestamp': {}", raw),
        }
    }
}

// ---------------------------------------------------------------------------
// Field coercion
// ---------------------------------------------------------------------------

/// Coerces a stored `valor` field to f64. Accepts JSON numbers and strings
/// that parse as floats ("23.5"); everything else is rejected.
pub fn coerce_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Parses a textual date-time in any of the common forms the dashboard and
/// the store use:
///   - RFC 3339 with offset ("2024-01-01T00:00:00Z", "...-05:00")
///   - naive ISO date-time, assumed UTC ("2024-01-01T00:00:00.123")
///   - space-separated date-time, assumed UTC ("2024-01-01 00:00:00")
///   - bare date, midnight UTC ("2024-01-01")
pub fn parse_instant(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }

    None
}

/// Decodes a stored `timestamp` field into an absolute UTC instant.
///
/// Supported encodings:
///   - native: an RFC 3339 (or common ISO variant) string
///   - legacy: `{"$date": {"$numberLong": "<epoch-ms>"}}` where the long
///     may appear as a string or a number, and `{"$date": <epoch-ms>}`
pub fn decode_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_instant(s),
        Value::Object(map) => {
            let date = map.get("$date")?;
            match date {
                Value::Object(inner) => {
                    let long = inner.get("$numberLong")?;
                    let millis = match long {
                        Value::String(s) => s.trim().parse::<i64>().ok()?,
                        Value::Number(n) => n.as_i64()?,
                        _ => return None,
                    };
                    Utc.timestamp_millis_opt(millis).single()
                }
                Value::Number(n) => Utc.timestamp_millis_opt(n.as_i64()?).single(),
                Value::String(s) => parse_instant(s),
                _ => None,
            }
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Document decode
// ---------------------------------------------------------------------------

/// Decodes one stored document into a `DecodedReading`, or reports why it
/// must be skipped. Callers filter-map over this; a `SkipReason` never
/// becomes a request-level error.
pub fn decode_document(doc: &Value) -> Result<DecodedReading, SkipReason> {
    let sensor = doc
        .get("sensor")
        .and_then(Value::as_str)
        .ok_or(SkipReason::MissingSensor)?
        .to_string();

    let raw_value = doc.get("valor").ok_or(SkipReason::MissingValue)?;
    let value = coerce_value(raw_value)
        .ok_or_else(|| SkipReason::NonNumericValue(raw_value.to_string()))?;

    let raw_ts = doc.get("timestamp").ok_or(SkipReason::MissingTimestamp)?;
    let recorded_at = decode_timestamp(raw_ts)
        .ok_or_else(|| SkipReason::BadTimestamp(raw_ts.to_string()))?;

    Ok(DecodedReading {
        sensor,
        value,
        recorded_at,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
