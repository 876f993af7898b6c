/// `/query` range transform: stored documents → per-target datapoint arrays.
///
/// The dashboard sends `{range: {from, to}, targets: [{target}, ...]}` and
/// expects one `{target, datapoints}` entry per requested target, in request
/// order, where each datapoint is a `[value, epoch_ms]` pair sorted
/// ascending by time. Documents that fail the per-document decode are
/// dropped individually — one bad reading never fails the request
/// (availability of the remaining series wins over strict completeness).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{decode_document, parse_instant};
use crate::model::GatewayError;
use crate::store::DocumentStore;

// ---------------------------------------------------------------------------
// Request / response shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub range: QueryRange,
    pub targets: Vec<QueryTarget>,
}

#[derive(Debug, Deserialize)]
pub struct QueryRange {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Deserialize)]
pub struct QueryTarget {
    pub target: String,
}

/// One response entry: `datapoints` serializes as `[[value, epoch_ms], ...]`.
#[derive(Debug, Serialize, PartialEq)]
pub struct TargetSeries {
    pub target: String,
    pub datapoints: Vec<(f64, i64)>,
}

/// A `QueryRequest` with its range parsed into absolute instants.
#[derive(Debug)]
pub struct ParsedQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub targets: Vec<String>,
}

// ---------------------------------------------------------------------------
// Request parsing
// ---------------------------------------------------------------------------

/// Parses and validates a `/query` body.
///
/// # Errors
/// `GatewayError::Validation` when the body is missing, lacks `range` or
/// `targets`, or when `range.from`/`range.to` cannot be parsed as instants.
pub fn parse_query_request(body: Option<&Value>) -> Result<ParsedQuery, GatewayError> {
    let body = body.ok_or_else(|| GatewayError::Validation("No JSON payload provided".into()))?;

    let request: QueryRequest = serde_json::from_value(body.clone()).map_err(|e| {
        GatewayError::Validation(format!("Invalid query body (need 'range' and 'targets'): {}", e))
    })?;

    let from = parse_instant(&request.range.from).ok_or_else(|| {
        GatewayError::Validation(format!("Unparsable 'range.from': {}", request.range.from))
    })?;
    let to = parse_instant(&request.range.to).ok_or_else(|| {
        GatewayError::Validation(format!("Unparsable 'range.to': {}", request.range.to))
    })?;

    Ok(ParsedQuery {
        from,
        to,
        targets: request.targets.into_iter().map(|t| t.target).collect(),
    })
}

// ---------------------------------------------------------------------------
// Series construction
// ---------------------------------------------------------------------------

/// Builds the datapoint series for one target from its raw documents:
/// decode each document, keep instants within `[from, to]` inclusive,
/// sort ascending by time, emit `(value, epoch_ms)` pairs.
pub fn build_target_series(
    target: &str,
    docs: &[Value],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> TargetSeries {
    let mut readings: Vec<_> = docs
        .iter()
        .filter_map(|doc| decode_document(doc).ok())
        .filter(|r| r.recorded_at >= from && r.recorded_at <= to)
        .collect();

    readings.sort_by_key(|r| r.recorded_at);

    TargetSeries {
        target: target.to_string(),
        datapoints: readings
            .into_iter()
            .map(|r| (r.value, r.recorded_at.timestamp_millis()))
            .collect(),
    }
}

/// Runs a parsed query against the store, one find per target, preserving
/// the request's target order in the output.
pub fn run_query(
    store: &mut dyn DocumentStore,
    query: &ParsedQuery,
) -> Result<Vec<TargetSeries>, GatewayError> {
    let mut series = Vec::with_capacity(query.targets.len());

    for target in &query.targets {
        let docs = store
            .find_by_sensor(target)
            .map_err(|e| GatewayError::Storage(e.to_string()))?;
        series.push(build_target_series(target, &docs, query.from, query.to));
    }

    Ok(series)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn day_range() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            parse_instant("2024-06-15T00:00:00Z").unwrap(),
            parse_instant("2024-06-16T00:00:00Z").unwrap(),
        )
    }

    // --- Request parsing -----------------------------------------------------

    #[test]
    fn test_parse_query_request_happy_path() {
        let body = json!({
            "range": {"from": "2024-01-01T00:00:00Z", "to": "2024-01-02T00:00:00Z"},
            "targets": [{"target": "Temperature"}, {"target": "Humidity"}]
        });
        let parsed = parse_query_request(Some(&body)).expect("should parse");
        assert_eq!(parsed.targets, vec!["Temperature", "Humidity"]);
        assert!(parsed.from < parsed.to);
    }

    #[test]
    fn test_parse_query_request_missing_range_is_400() {
        let body = json!({"targets": [{"target": "Temperature"}]});
        let err = parse_query_request(Some(&body)).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_parse_query_request_missing_targets_is_400() {
        let body = json!({"range": {"from": "2024-01-01", "to": "2024-01-02"}});
        let err = parse_query_request(Some(&body)).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_parse_query_request_bad_dates_are_400() {
        let body = json!({
            "range": {"from": "last tuesday", "to": "2024-01-02"},
            "targets": [{"target": "Temperature"}]
        });
        let err = parse_query_request(Some(&body)).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("range.from"), "got: {}", err);
    }

    #[test]
    fn test_parse_query_request_missing_body_is_400() {
        assert!(parse_query_request(None).is_err());
    }

    // --- Series construction -------------------------------------------------

    #[test]
    fn test_series_sorted_ascending_by_epoch_ms() {
        let docs = vec![
            temperature_doc(23.5, "2024-06-15T12:00:00Z"),
            temperature_doc(21.0, "2024-06-15T08:00:00Z"),
            temperature_doc(25.1, "2024-06-15T16:00:00Z"),
        ];
        let (from, to) = day_range();
        let series = build_target_series("Temperature", &docs, from, to);

        assert_eq!(series.datapoints.len(), 3);
        let times: Vec<i64> = series.datapoints.iter().map(|d| d.1).collect();
        let mut sorted = times.clone();
        sorted.sort();
        assert_eq!(times, sorted, "datapoints must ascend by epoch ms");
        assert_eq!(series.datapoints[0].0, 21.0);
    }

    #[test]
    fn test_series_range_is_inclusive_at_both_ends() {
        let docs = vec![
            temperature_doc(1.0, "2024-06-15T00:00:00Z"),
            temperature_doc(2.0, "2024-06-16T00:00:00Z"),
            temperature_doc(3.0, "2024-06-14T23:59:59Z"),
            temperature_doc(4.0, "2024-06-16T00:00:01Z"),
        ];
        let (from, to) = day_range();
        let series = build_target_series("Temperature", &docs, from, to);

        let values: Vec<f64> = series.datapoints.iter().map(|d| d.0).collect();
        assert_eq!(values, vec![1.0, 2.0], "boundary instants included, outside excluded");
    }

    #[test]
    fn test_series_skips_bad_documents_without_failing() {
        let docs = vec![
            temperature_doc(21.0, "2024-06-15T08:00:00Z"),
            json!({"sensor": "Temperature", "valor": "not-a-number",
                   "timestamp": "2024-06-15T09:00:00Z"}),
            json!({"sensor": "Temperature", "valor": 22.0}),
            json!({"sensor": "Temperature", "valor": 23.0, "timestamp": "whenever"}),
            temperature_doc(24.0, "2024-06-15T10:00:00Z"),
        ];
        let (from, to) = day_range();
        let series = build_target_series("Temperature", &docs, from, to);

        let values: Vec<f64> = series.datapoints.iter().map(|d| d.0).collect();
        assert_eq!(values, vec![21.0, 24.0], "only decodable in-range documents survive");
    }

    #[test]
    fn test_series_decodes_legacy_timestamps() {
        // 2024-06-15T08:30:00Z as legacy epoch millis.
        let docs = vec![legacy_humidity_doc(61.0, 1718440200000)];
        let (from, to) = day_range();
        let series = build_target_series("Humidity", &docs, from, to);

        assert_eq!(series.datapoints, vec![(61.0, 1718440200000)]);
    }

    #[test]
    fn test_run_query_preserves_target_order() {
        let mut store = MemoryStore::with_documents(vec![
            temperature_doc(23.5, "2024-06-15T08:00:00Z"),
            humidity_doc(55.0, "2024-06-15T08:00:00Z"),
        ]);
        let (from, to) = day_range();
        let query = ParsedQuery {
            from,
            to,
            targets: vec!["Humidity".into(), "Temperature".into(), "Pressure".into()],
        };

        let series = run_query(&mut store, &query).expect("query should succeed");
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].target, "Humidity");
        assert_eq!(series[1].target, "Temperature");
        assert_eq!(series[2].target, "Pressure");
        assert!(series[2].datapoints.is_empty(), "unknown target yields empty series");
    }

    #[test]
    fn test_run_query_filters_by_sensor_equality() {
        let mut store = MemoryStore::with_documents(vec![
            temperature_doc(23.5, "2024-06-15T08:00:00Z"),
            humidity_doc(55.0, "2024-06-15T09:00:00Z"),
        ]);
        let (from, to) = day_range();
        let query = ParsedQuery {
            from,
            to,
            targets: vec!["Temperature".into()],
        };

        let series = run_query(&mut store, &query).unwrap();
        assert_eq!(series[0].datapoints.len(), 1);
        assert_eq!(series[0].datapoints[0].0, 23.5);
    }

    #[test]
    fn test_datapoints_serialize_as_value_epoch_pairs() {
        let series = TargetSeries {
            target: "Temperature".into(),
            datapoints: vec![(23.5, 1718440200000)],
        };
        let rendered = serde_json::to_value(&series).unwrap();
        assert_eq!(
            rendered,
            json!({"target": "Temperature", "datapoints": [[23.5, 1718440200000i64]]})
        );
    }
}
