/// sengate_service: HTTP gateway between IoT sensors and a Grafana-style
/// JSON datasource consumer.
///
/// # Module structure
///
/// ```text
/// sengate_service
/// ├── model     — shared types (DecodedReading, GatewayError taxonomy)
/// ├── config    — environment-derived store configuration (.env aware)
/// ├── catalog   — static metric catalog advertised on /search
/// ├── document  — per-document decode: value coercion + timestamp
/// │               normalization (native RFC 3339 and legacy $date forms)
/// ├── ingest    — /receive_sensor_data validation + document construction
/// ├── query     — /query range transform (per-target datapoint arrays)
/// ├── export    — /json_api_data full-scan grouping (Bogota-local times)
/// ├── store
/// │   ├── postgres — JSONB-backed document store
/// │   └── memory   — in-memory backend (dev mode + test double)
/// ├── endpoint  — tiny_http server, routing, Gateway handler state
/// └── fixtures (test only) — representative stored documents
/// ```

pub mod catalog;
pub mod config;
pub mod document;
pub mod endpoint;
pub mod export;
pub mod ingest;
pub mod model;
pub mod query;
pub mod store;

#[cfg(test)]
pub(crate) mod fixtures;
