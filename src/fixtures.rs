/// Test fixtures: representative stored sensor documents.
///
/// These mirror what actually sits in the production collection:
///   - documents written by the current ingest path (RFC 3339 timestamps)
///   - legacy rows imported from the old MongoDB deployment, whose
///     timestamps kept the extended-JSON `{"$date": {"$numberLong"}}` form
///   - the timestamp-less `/enviar_dato` demo document
///
/// Used by the decode, query, export, and endpoint tests. The module is
/// compiled only under `cfg(test)` (see lib.rs).

use serde_json::{Value, json};

/// A well-formed Temperature reading with a native RFC 3339 timestamp.
pub(crate) fn temperature_doc(value: f64, rfc3339: &str) -> Value {
    json!({
        "sensor": "Temperature",
        "valor": value,
        "unidad": "C",
        "timestamp": rfc3339,
    })
}

/// A well-formed Humidity reading with a native RFC 3339 timestamp.
pub(crate) fn humidity_doc(value: f64, rfc3339: &str) -> Value {
    json!({
        "sensor": "Humidity",
        "valor": value,
        "unidad": "%",
        "timestamp": rfc3339,
    })
}

/// A legacy Humidity row: timestamp in the nested epoch-millisecond
/// encoding, value as a numeric string (both seen in imported data).
pub(crate) fn legacy_humidity_doc(value: f64, epoch_ms: i64) -> Value {
    json!({
        "sensor": "Humidity",
        "valor": value.to_string(),
        "unidad": "%",
        "timestamp": {"$date": {"$numberLong": epoch_ms.to_string()}},
    })
}

/// The `/enviar_dato` demo document as stored: no timestamp at all.
pub(crate) fn demo_doc_without_timestamp() -> Value {
    json!({
        "sensor": "temperatura_prueba",
        "valor": 30.1,
        "unidad": "C",
    })
}
