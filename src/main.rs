//! Sensor Data Gateway - Main Binary
//!
//! An HTTP gateway that ingests IoT sensor readings into a document store
//! and re-exposes them in the shape a Grafana-style JSON datasource
//! expects (/search, /query, /json_api_data, root health probe).
//!
//! Usage:
//!   cargo run --release                # listen on GATEWAY_PORT (default 5000)
//!   cargo run --release -- --port 8080 # override the listen port
//!
//! Environment:
//!   STORE_URL      - Postgres connection string (wins over components)
//!   STORE_HOST / STORE_PORT / STORE_DB / STORE_USER / STORE_PASSWORD
//!   STORE_BACKEND  - "memory" to run without Postgres
//!   GATEWAY_PORT   - HTTP listen port

use sengate_service::config::{self, StoreBackend};
use sengate_service::endpoint::{Gateway, start_gateway_server};
use sengate_service::store::{DocumentStore, MemoryStore, PostgresStore};
use std::env;

fn main() {
    println!("🌡️  Sensor Data Gateway");
    println!("========================\n");

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let mut port_override: Option<u16> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" => {
                if i + 1 < args.len() {
                    port_override = args[i + 1].parse().ok();
                    i += 2;
                } else {
                    eprintln!("Error: --port requires a port number");
                    std::process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                eprintln!("Usage: {} [--port PORT]", args[0]);
                std::process::exit(1);
            }
        }
    }

    // Resolve configuration (.env + environment)
    let store_config = config::load_store_config();
    let port = port_override.unwrap_or_else(config::gateway_port);

    // Connect the store. A failed connection is not fatal: the gateway
    // starts anyway and answers 503 on data-dependent endpoints, which is
    // what the dashboard's connectivity probe expects to see.
    println!("📊 Connecting document store...");
    let store: Option<Box<dyn DocumentStore>> = match store_config.backend {
        StoreBackend::Memory => {
            println!("✓ Using in-memory store (STORE_BACKEND=memory)\n");
            Some(Box::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => match PostgresStore::connect(&store_config.url) {
            Ok(store) => {
                println!("✓ Connected to Postgres\n");
                Some(Box::new(store))
            }
            Err(e) => {
                eprintln!("✗ Store connection failed: {}", e);
                None
            }
        },
    };

    let gateway = Gateway::new(store);
    if !gateway.is_connected() {
        eprintln!("⚠️  Running without a store; data endpoints will answer 503\n");
    }

    if let Err(e) = start_gateway_server(port, gateway) {
        eprintln!("\n❌ Gateway server error: {}", e);
        std::process::exit(1);
    }
}
