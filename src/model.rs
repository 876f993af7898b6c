/// Shared data types for the sensor data gateway.
///
/// `GatewayError` is the request-level error taxonomy: every handler maps
/// its failure modes onto one of these variants, and the HTTP layer turns
/// the variant into a status code. `DecodedReading` is the normalized form
/// of a stored document after the per-document decode step in `document`.

use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Request-level errors surfaced to HTTP clients.
#[derive(Debug)]
pub enum GatewayError {
    /// Client-supplied data malformed or incomplete (HTTP 400).
    Validation(String),
    /// The store connection was never established (HTTP 503).
    ServiceUnavailable,
    /// A store operation failed after startup (HTTP 500).
    Storage(String),
    /// Unexpected fault caught at the handler boundary (HTTP 500).
    Internal(String),
}

impl GatewayError {
    /// HTTP status code for this error variant.
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::Validation(_) => 400,
            GatewayError::ServiceUnavailable => 503,
            GatewayError::Storage(_) => 500,
            GatewayError::Internal(_) => 500,
        }
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::Validation(msg) => write!(f, "{}", msg),
            GatewayError::ServiceUnavailable => {
                write!(f, "The database connection is not established")
            }
            GatewayError::Storage(msg) => write!(f, "Database error: {}", msg),
            GatewayError::Internal(msg) => write!(f, "Internal server error: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

// ---------------------------------------------------------------------------
// Decoded readings
// ---------------------------------------------------------------------------

/// A stored sensor document after successful per-document decode:
/// value coerced to f64, timestamp normalized to an absolute UTC instant.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedReading {
    /// Metric name (the document's `sensor` field).
    pub sensor: String,
    /// Measurement coerced to a float (from number or numeric string).
    pub value: f64,
    /// Absolute instant, decoded from either the native RFC 3339 form
    /// or the legacy `$date`/`$numberLong` encoding.
    pub recorded_at: DateTime<Utc>,
}
