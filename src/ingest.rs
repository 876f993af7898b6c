/// Ingest payload validation and document construction.
///
/// `POST /receive_sensor_data` carries `{sensor_type, value, unit?}`.
/// Validation is presence-only: `sensor_type` and `value` must exist and be
/// non-null, `unit` defaults to "N/A". The stored document keeps the
/// Spanish field names the collection has always used (`sensor`, `valor`,
/// `unidad`) and stamps the server's current time as an RFC 3339 UTC
/// string. Type flexibility is deliberate — `valor` is stored as received
/// and coerced to a float only at read time.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Value, json};

use crate::model::GatewayError;

/// Unit recorded when the ingest payload omits `unit`.
pub const DEFAULT_UNIT: &str = "N/A";

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validates an ingest payload and builds the document to persist.
///
/// # Errors
/// `GatewayError::Validation` when the body is absent, or `sensor_type` /
/// `value` are missing or null.
pub fn build_reading_document(
    body: Option<&Value>,
    now: DateTime<Utc>,
) -> Result<Value, GatewayError> {
    let data = body.ok_or_else(|| GatewayError::Validation("No JSON payload provided".into()))?;

    let sensor_type = require_field(data, "sensor_type")?;
    let value = require_field(data, "value")?;

    let unit = match data.get("unit") {
        Some(Value::Null) | None => json!(DEFAULT_UNIT),
        Some(u) => u.clone(),
    };

    Ok(json!({
        "sensor": sensor_type,
        "valor": value,
        "unidad": unit,
        "timestamp": format_ingest_timestamp(now),
    }))
}

fn require_field<'a>(data: &'a Value, field: &str) -> Result<&'a Value, GatewayError> {
    match data.get(field) {
        Some(Value::Null) | None => Err(GatewayError::Validation(format!(
            "Missing required fields: 'sensor_type' or 'value' ('{}' not provided)",
            field
        ))),
        Some(v) => Ok(v),
    }
}

/// Renders the ingest timestamp in the store's native form: RFC 3339 UTC
/// with millisecond precision.
pub fn format_ingest_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ---------------------------------------------------------------------------
// Fixed demo payloads
// ---------------------------------------------------------------------------

/// The `/enviar_dato` demo document. Matches the historical payload exactly,
/// including the absence of a timestamp, so it stays invisible to the
/// time-series read paths.
pub fn demo_document() -> Value {
    json!({
        "sensor": "temperatura_prueba",
        "valor": 30.1,
        "unidad": "C"
    })
}

/// The `/insert` demo reading: same fixed measurement, but stamped with the
/// current time so it shows up in `/query` and `/json_api_data`.
pub fn demo_reading(now: DateTime<Utc>) -> Value {
    json!({
        "sensor": "temperatura_prueba",
        "valor": 30.1,
        "unidad": "C",
        "timestamp": format_ingest_timestamp(now),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
