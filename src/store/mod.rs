/// Document store abstraction.
///
/// Handlers never talk to a database driver directly; they go through the
/// `DocumentStore` trait so the HTTP layer can be exercised against the
/// in-memory backend and the Postgres backend stays swappable. The store
/// contract is deliberately small — the gateway only ever appends documents
/// and reads them back in insertion order:
///
///   - `insert_one` appends a JSON document and returns its generated id
///   - `find_by_sensor` returns every document whose `sensor` field equals
///     the given name, in insertion order
///   - `find_all` returns every document, in insertion order
///
/// Time-range filtering and timestamp sorting happen after the per-document
/// decode step (see `document`), since stored timestamps may appear in
/// either the native or the legacy encoding.

use serde_json::Value;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Store operation failure.
#[derive(Debug)]
pub enum StoreError {
    /// Could not establish the connection or prepare the schema.
    Connection(String),
    /// An insert or find failed after the connection was established.
    Query(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Connection(msg) => write!(f, "store connection failed: {}", msg),
            StoreError::Query(msg) => write!(f, "store query failed: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Append-only document storage for sensor readings.
pub trait DocumentStore: Send {
    /// Appends one document and returns the store-generated id.
    fn insert_one(&mut self, doc: &Value) -> Result<String, StoreError>;

    /// Returns all documents whose `sensor` field equals `sensor`,
    /// in insertion order.
    fn find_by_sensor(&mut self, sensor: &str) -> Result<Vec<Value>, StoreError>;

    /// Returns all documents in insertion order.
    fn find_all(&mut self) -> Result<Vec<Value>, StoreError>;
}
