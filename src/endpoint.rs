/// HTTP surface of the sensor data gateway.
///
/// Routes:
/// - GET  /                    — liveness probe, plain "OK"
/// - GET  /index               — static HTML status page
/// - GET  /enviar_dato         — fixed demo insert (historical endpoint)
/// - GET  /insert              — fixed demo insert with current timestamp
/// - POST /receive_sensor_data — sensor reading ingest
/// - GET/POST /search          — static metric catalog for the dashboard
/// - POST /query               — time-range query, per-target datapoints
/// - GET/POST /json_api_data   — full export grouped by sensor
///
/// Requests are served sequentially on the accept loop; the only shared
/// state is the store handle owned by the `Gateway`. Store presence is
/// checked before every data-dependent operation so an unconnected store
/// yields a 503 rather than a generic 500.

use chrono::Utc;
use serde_json::Value;
use std::io::Cursor;

use crate::catalog;
use crate::ingest;
use crate::model::GatewayError;
use crate::query;
use crate::store::DocumentStore;

// ---------------------------------------------------------------------------
// Gateway state
// ---------------------------------------------------------------------------

/// Handler state: the (possibly absent) store connection.
///
/// `store` is `None` when the connection could not be established at
/// startup; the gateway still serves `/`, `/index`, and `/search`, and
/// answers 503 on everything that needs storage.
pub struct Gateway {
    store: Option<Box<dyn DocumentStore>>,
}

impl Gateway {
    pub fn new(store: Option<Box<dyn DocumentStore>>) -> Self {
        Self { store }
    }

    /// Whether a store connection was established at startup.
    pub fn is_connected(&self) -> bool {
        self.store.is_some()
    }

    fn store(&mut self) -> Result<&mut (dyn DocumentStore + 'static), GatewayError> {
        self.store
            .as_deref_mut()
            .ok_or(GatewayError::ServiceUnavailable)
    }

    // --- Handlers ------------------------------------------------------------

    /// GET /enviar_dato — inserts the fixed, timestamp-less demo document.
    /// Historical contract: answers 500 (not 503) when the store is absent.
    pub fn handle_enviar_dato(&mut self) -> Result<(u16, Value), GatewayError> {
        let store = self.store().map_err(|_| {
            GatewayError::Storage("la conexión a la base de datos no está establecida".into())
        })?;

        let doc = ingest::demo_document();
        let id = store
            .insert_one(&doc)
            .map_err(|e| GatewayError::Storage(e.to_string()))?;

        Ok((
            200,
            serde_json::json!({
                "mensaje": "Dato de prueba agregado exitosamente a 'sensor'",
                "id": id,
            }),
        ))
    }

    /// GET /insert — inserts the fixed demo reading stamped with now.
    pub fn handle_insert(&mut self) -> Result<(u16, Value), GatewayError> {
        let store = self.store()?;

        let doc = ingest::demo_reading(Utc::now());
        let id = store
            .insert_one(&doc)
            .map_err(|e| GatewayError::Storage(e.to_string()))?;

        Ok((
            201,
            serde_json::json!({
                "mensaje": "Dato de prueba agregado exitosamente a 'sensor'",
                "id": id,
            }),
        ))
    }

    /// POST /receive_sensor_data — validates and persists one reading.
    pub fn handle_receive_sensor_data(
        &mut self,
        body: Option<&Value>,
    ) -> Result<(u16, Value), GatewayError> {
        // Store presence first: an unconnected store is 503 regardless of
        // the payload (the dashboard probes this endpoint during setup).
        self.store()?;

        let doc = ingest::build_reading_document(body, Utc::now())?;

        let id = self
            .store()?
            .insert_one(&doc)
            .map_err(|e| GatewayError::Storage(e.to_string()))?;

        Ok((
            201,
            serde_json::json!({
                "status": "success",
                "message": "Dato de sensor recibido y guardado exitosamente.",
                "id_mongo": id,
                "data_received": doc,
            }),
        ))
    }

    /// GET/POST /search — static metric catalog; never touches the store.
    pub fn handle_search(&mut self) -> Result<(u16, Value), GatewayError> {
        Ok((200, serde_json::json!(catalog::advertised_metrics())))
    }

    /// POST /query — per-target time-range series.
    pub fn handle_query(&mut self, body: Option<&Value>) -> Result<(u16, Value), GatewayError> {
        self.store()?;
        let parsed = query::parse_query_request(body)?;
        let series = query::run_query(self.store()?, &parsed)?;
        Ok((200, serde_json::to_value(series).map_err(internal)?))
    }

    /// GET/POST /json_api_data — full export grouped by sensor.
    pub fn handle_json_api_data(&mut self) -> Result<(u16, Value), GatewayError> {
        self.store()?;
        let grouped = crate::export::run_export(self.store()?)?;
        Ok((200, serde_json::to_value(grouped).map_err(internal)?))
    }
}

fn internal(e: impl std::fmt::Display) -> GatewayError {
    GatewayError::Internal(e.to_string())
}

// ---------------------------------------------------------------------------
// Static pages
// ---------------------------------------------------------------------------

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="es">
<head>
  <meta charset="utf-8">
  <title>Sensor Data Gateway</title>
</head>
<body>
  <h1>Sensor Data Gateway</h1>
  <p>Endpoints: /search, /query, /json_api_data, /receive_sensor_data</p>
</body>
</html>
"#;

// ---------------------------------------------------------------------------
// HTTP server
// ---------------------------------------------------------------------------

type HttpResponse = tiny_http::Response<Cursor<Vec<u8>>>;

/// A bound-but-not-yet-running gateway server. Split from `run` so tests
/// can bind to port 0 and read back the assigned port.
pub struct GatewayServer {
    server: tiny_http::Server,
    gateway: Gateway,
}

impl GatewayServer {
    /// Binds the listener. Use port 0 to let the OS pick a free port.
    pub fn bind(addr: &str, gateway: Gateway) -> Result<Self, String> {
        let server = tiny_http::Server::http(addr)
            .map_err(|e| format!("Failed to start HTTP server on {}: {}", addr, e))?;
        Ok(Self { server, gateway })
    }

    /// The port the listener is actually bound to.
    pub fn port(&self) -> u16 {
        self.server
            .server_addr()
            .to_ip()
            .map(|a| a.port())
            .unwrap_or(0)
    }

    /// Serves requests until the process exits.
    pub fn run(mut self) {
        for mut request in self.server.incoming_requests() {
            let method = request.method().clone();
            let path = request
                .url()
                .split('?')
                .next()
                .unwrap_or_default()
                .to_string();

            let body = read_json_body(&mut request);
            let response = dispatch(&mut self.gateway, &method, &path, body.as_ref());

            if let Err(e) = request.respond(response) {
                eprintln!("Failed to send response for {}: {}", path, e);
            }
        }
    }
}

/// Starts the gateway server on `0.0.0.0:port` and serves forever.
pub fn start_gateway_server(port: u16, gateway: Gateway) -> Result<(), String> {
    let server = GatewayServer::bind(&format!("0.0.0.0:{}", port), gateway)?;

    println!("📡 Gateway listening on http://0.0.0.0:{}", port);
    println!("   GET  /                    - Health probe");
    println!("   POST /receive_sensor_data - Sensor ingest");
    println!("   GET/POST /search          - Metric catalog");
    println!("   POST /query               - Time-range query");
    println!("   GET/POST /json_api_data   - Full export\n");

    server.run();
    Ok(())
}

/// Reads and parses the request body. `None` for empty or invalid JSON —
/// the validation sites turn that into a 400 where a body is required.
fn read_json_body(request: &mut tiny_http::Request) -> Option<Value> {
    let mut raw = String::new();
    request.as_reader().read_to_string(&mut raw).ok()?;
    if raw.trim().is_empty() {
        return None;
    }
    serde_json::from_str(&raw).ok()
}

/// Routes one request to its handler and renders the response.
fn dispatch(
    gateway: &mut Gateway,
    method: &tiny_http::Method,
    path: &str,
    body: Option<&Value>,
) -> HttpResponse {
    use tiny_http::Method::{Get, Post};

    let result = match (method, path) {
        (Get, "/") => return text_response(200, "OK"),
        (Get, "/index") => return html_response(200, INDEX_HTML),
        (Get, "/enviar_dato") => gateway.handle_enviar_dato(),
        (Get, "/insert") => gateway.handle_insert(),
        (Post, "/receive_sensor_data") => gateway.handle_receive_sensor_data(body),
        (Get, "/search") | (Post, "/search") => gateway.handle_search(),
        (Post, "/query") => gateway.handle_query(body),
        (Get, "/json_api_data") | (Post, "/json_api_data") => gateway.handle_json_api_data(),
        _ => {
            return create_response(
                404,
                serde_json::json!({
                    "error": "Not found",
                    "available_endpoints": [
                        "/", "/index", "/enviar_dato", "/insert",
                        "/receive_sensor_data", "/search", "/query", "/json_api_data"
                    ]
                }),
            );
        }
    };

    match result {
        Ok((status, json)) => create_response(status, json),
        Err(err) => {
            let status = err.status_code();
            if status >= 500 {
                eprintln!("✗ {} {} failed: {}", method, path, err);
            }
            create_response(status, serde_json::json!({ "error": err.to_string() }))
        }
    }
}

/// Create HTTP response with JSON body.
fn create_response(status_code: u16, json: Value) -> HttpResponse {
    let body = serde_json::to_string_pretty(&json).unwrap_or_else(|_| "{}".to_string());
    bytes_response(status_code, body.into_bytes(), "application/json")
}

fn text_response(status_code: u16, body: &str) -> HttpResponse {
    bytes_response(status_code, body.as_bytes().to_vec(), "text/plain; charset=utf-8")
}

fn html_response(status_code: u16, body: &str) -> HttpResponse {
    bytes_response(status_code, body.as_bytes().to_vec(), "text/html; charset=utf-8")
}

fn bytes_response(status_code: u16, bytes: Vec<u8>, content_type: &str) -> HttpResponse {
    let header = tiny_http::Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes())
        .expect("static content-type header is valid");

    tiny_http::Response::from_data(bytes)
        .with_status_code(tiny_http::StatusCode::from(status_code))
        .with_header(header)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
