/// In-memory document store backend.
///
/// Used as the `STORE_BACKEND=memory` development backend (run the gateway
/// without a Postgres instance) and as the store double in handler and
/// end-to-end tests. Semantics mirror the Postgres backend: append-only,
/// insertion-ordered reads, string equality on the `sensor` field.

use serde_json::Value;

use super::{DocumentStore, StoreError};

/// Append-only in-memory store. Ids are sequential, starting at 1.
#[derive(Debug)]
pub struct MemoryStore {
    docs: Vec<Value>,
    next_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            docs: Vec::new(),
            next_id: 1,
        }
    }

    /// Seeds the store with pre-existing documents (test setup helper).
    pub fn with_documents(docs: Vec<Value>) -> Self {
        let next_id = docs.len() as u64 + 1;
        Self { docs, next_id }
    }
}

impl DocumentStore for MemoryStore {
    fn insert_one(&mut self, doc: &Value) -> Result<String, StoreError> {
        let id = self.next_id;
        self.next_id += 1;
        self.docs.push(doc.clone());
        Ok(id.to_string())
    }

    fn find_by_sensor(&mut self, sensor: &str) -> Result<Vec<Value>, StoreError> {
        Ok(self
            .docs
            .iter()
            .filter(|doc| doc.get("sensor").and_then(Value::as_str) == Some(sensor))
            .cloned()
            .collect())
    }

    fn find_all(&mut self) -> Result<Vec<Value>, StoreError> {
        Ok(self.docs.clone())
    }
}
