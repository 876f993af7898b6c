/// `/json_api_data` full-export transform: scan everything, group by sensor.
///
/// Unlike `/query`, this path has no range, no target list, and no fixed
/// catalog: the output keys are whatever distinct `sensor` values actually
/// exist in storage. Each sensor maps to its points sorted ascending by
/// time, with timestamps converted from UTC to Bogota local time and
/// rendered as ISO 8601 with the UTC offset (the dashboard deployment
/// displays Colombian local time).
///
/// Undecodable documents are skipped individually, same lossy-read policy
/// as `/query`.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::document::decode_document;
use crate::model::{DecodedReading, GatewayError};
use crate::store::DocumentStore;

/// America/Bogota is UTC-5 year-round (no DST since 1993), so a fixed
/// offset renders it exactly.
const BOGOTA_OFFSET_SECONDS: i32 = -5 * 3600;

/// One exported point: local-time ISO string plus the float value.
#[derive(Debug, Serialize, PartialEq)]
pub struct ExportPoint {
    pub time: String,
    pub value: f64,
}

/// Sensor name → ascending point series. BTreeMap keeps the JSON object
/// keys in a stable order across requests.
pub type ExportSeries = BTreeMap<String, Vec<ExportPoint>>;

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn bogota_offset() -> FixedOffset {
    // -5 * 3600 is a valid offset, so this cannot fail.
    FixedOffset::east_opt(BOGOTA_OFFSET_SECONDS).unwrap()
}

/// Renders a UTC instant as Bogota local time with explicit offset,
/// e.g. "2024-06-15T03:30:00-05:00".
pub fn render_local_time(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&bogota_offset())
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Groups decoded readings by sensor name, each series sorted ascending by
/// instant, and renders the local-time strings.
pub fn group_readings(mut readings: Vec<DecodedReading>) -> ExportSeries {
    readings.sort_by_key(|r| r.recorded_at);

    let mut grouped: ExportSeries = BTreeMap::new();
    for reading in readings {
        grouped.entry(reading.sensor).or_default().push(ExportPoint {
            time: render_local_time(reading.recorded_at),
            value: reading.value,
        });
    }

    grouped
}

/// Runs the full export: scan every document, skip the undecodable ones,
/// group the rest by sensor.
pub fn run_export(store: &mut dyn DocumentStore) -> Result<ExportSeries, GatewayError> {
    let docs = store
        .find_all()
        .map_err(|e| GatewayError::Storage(e.to_string()))?;

    let readings = docs
        .iter()
        .filter_map(|doc| decode_document(doc).ok())
        .collect();

    Ok(group_readings(readings))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_instant;
    use crate::fixtures::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn reading(sensor: &str, value: f64, rfc3339: &str) -> DecodedReading {
        DecodedReading {
            sensor: sensor.to_string(),
            value,
            recorded_at: parse_instant(rfc3339).expect("test instant should parse"),
        }
    }

    // --- Local-time rendering ------------------------------------------------

    #[test]
    fn test_render_local_time_shifts_to_minus_five() {
        let instant = parse_instant("2024-06-15T08:30:00Z").unwrap();
        assert_eq!(render_local_time(instant), "2024-06-15T03:30:00-05:00");
    }

    #[test]
    fn test_render_local_time_crosses_midnight() {
        // 02:00 UTC is still the previous day in Bogota.
        let instant = parse_instant("2024-06-15T02:00:00Z").unwrap();
        assert_eq!(render_local_time(instant), "2024-06-14T21:00:00-05:00");
    }

    #[test]
    fn test_render_local_time_never_uses_z_suffix() {
        let instant = parse_instant("2024-06-15T05:00:00Z").unwrap();
        let rendered = render_local_time(instant);
        assert!(!rendered.ends_with('Z'), "offset must be explicit: {}", rendered);
        assert!(rendered.ends_with("-05:00"), "got: {}", rendered);
    }

    // --- Grouping ------------------------------------------------------------

    #[test]
    fn test_group_readings_by_distinct_sensor() {
        let grouped = group_readings(vec![
            reading("Temperature", 23.5, "2024-06-15T08:00:00Z"),
            reading("Humidity", 55.0, "2024-06-15T08:00:00Z"),
            reading("Temperature", 24.0, "2024-06-15T09:00:00Z"),
        ]);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["Temperature"].len(), 2);
        assert_eq!(grouped["Humidity"].len(), 1);
    }

    #[test]
    fn test_group_readings_each_series_ascends_in_time() {
        let grouped = group_readings(vec![
            reading("Temperature", 3.0, "2024-06-15T12:00:00Z"),
            reading("Temperature", 1.0, "2024-06-15T08:00:00Z"),
            reading("Temperature", 2.0, "2024-06-15T10:00:00Z"),
        ]);

        let values: Vec<f64> = grouped["Temperature"].iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_group_readings_empty_input() {
        assert!(group_readings(vec![]).is_empty());
    }

    // --- Full export ---------------------------------------------------------

    #[test]
    fn test_run_export_uses_actual_sensor_names_not_the_catalog() {
        let mut store = MemoryStore::with_documents(vec![
            json!({"sensor": "Pressure", "valor": 1013.2,
                   "timestamp": "2024-06-15T08:00:00Z"}),
        ]);

        let grouped = run_export(&mut store).expect("export should succeed");
        assert!(grouped.contains_key("Pressure"));
        assert!(!grouped.contains_key("Temperature"), "no fixed catalog here");
    }

    #[test]
    fn test_run_export_skips_undecodable_documents() {
        let mut store = MemoryStore::with_documents(vec![
            temperature_doc(23.5, "2024-06-15T08:00:00Z"),
            json!({"sensor": "Temperature", "valor": "not-a-number",
                   "timestamp": "2024-06-15T09:00:00Z"}),
            json!({"valor": 1.0, "timestamp": "2024-06-15T09:00:00Z"}),
            demo_doc_without_timestamp(),
        ]);

        let grouped = run_export(&mut store).unwrap();
        assert_eq!(grouped.len(), 1, "only the decodable Temperature doc survives");
        assert_eq!(grouped["Temperature"].len(), 1);
        assert_eq!(grouped["Temperature"][0].value, 23.5);
    }

    #[test]
    fn test_run_export_decodes_legacy_timestamps_into_local_time() {
        // 1718440200000 ms = 2024-06-15T08:30:00Z = 03:30:00-05:00 local.
        let mut store =
            MemoryStore::with_documents(vec![legacy_humidity_doc(61.0, 1718440200000)]);

        let grouped = run_export(&mut store).unwrap();
        assert_eq!(
            grouped["Humidity"][0],
            ExportPoint {
                time: "2024-06-15T03:30:00-05:00".into(),
                value: 61.0
            }
        );
    }
}
