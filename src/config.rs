/// Environment-derived configuration for the gateway.
///
/// The store connection is configured by `STORE_URL`; when absent, the URL
/// is composed from individual components, each with a documented default:
///
///   STORE_HOST      (default "localhost")
///   STORE_PORT      (default "5432")
///   STORE_DB        (default "sensor_db")
///   STORE_USER      (default "sensor")
///   STORE_PASSWORD  (default "sensor")
///
/// An explicit `STORE_URL` always wins — the components are only consulted
/// for the fallback. `STORE_BACKEND=memory` selects the in-memory backend
/// for local development without Postgres. A `.env` file in the working
/// directory is loaded when present.

use std::env;

/// Which store backend to construct at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Resolved store configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Connection URL; meaningful only for the Postgres backend.
    pub url: String,
}

/// Loads `.env` (if present) and resolves the store configuration.
pub fn load_store_config() -> StoreConfig {
    dotenv::dotenv().ok();

    let backend = match env::var("STORE_BACKEND").as_deref() {
        Ok("memory") => StoreBackend::Memory,
        _ => StoreBackend::Postgres,
    };

    StoreConfig {
        backend,
        url: resolve_store_url(),
    }
}

/// `STORE_URL` when set and non-empty, otherwise the composed fallback.
fn resolve_store_url() -> String {
    if let Ok(url) = env::var("STORE_URL") {
        if !url.trim().is_empty() {
            return url;
        }
    }

    let host = env_or("STORE_HOST", "localhost");
    let port = env_or("STORE_PORT", "5432");
    let db = env_or("STORE_DB", "sensor_db");
    let user = env_or("STORE_USER", "sensor");
    let password = env_or("STORE_PASSWORD", "sensor");

    format!("postgresql://{}:{}@{}:{}/{}", user, password, host, port, db)
}

/// Listen port for the HTTP server: `GATEWAY_PORT`, default 5000.
pub fn gateway_port() -> u16 {
    env::var("GATEWAY_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5000)
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
