//! Event — the universal message type for sketchroom.
//!
//! ARCHITECTURE
//! ============
//! Every communication between server and client is an Event: a named
//! operation plus a flat JSON payload. Clients send request events over
//! WebSocket, the server dispatches by name, and derived events fan out
//! to the appropriate subset of a room's connections.
//!
//! DESIGN
//! ======
//! - Flat data: payload is always `Map<String, Value>`, never nested
//!   beyond what a single key carries.
//! - There is no request/response correlation; the server is
//!   authoritative and clients resynchronize from broadcasts.
//! - The WS handler routes on `name` and never inspects `data`.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// =============================================================================
// FIELD CONSTANTS
// =============================================================================

/// Event data key for error messages on `error` events.
pub const EVENT_ERROR: &str = "error";

// =============================================================================
// TYPES
// =============================================================================

/// Flat key-value payload. Alias to reduce noise in signatures.
pub type Data = HashMap<String, serde_json::Value>;

/// The universal message type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Operation name, e.g. `"chat-message"`.
    pub name: String,
    /// Milliseconds since Unix epoch. Set automatically at construction.
    #[serde(default)]
    pub ts: i64,
    /// Flat key-value payload specific to the event.
    #[serde(default)]
    pub data: Data,
}

// =============================================================================
// ERROR CODES
// =============================================================================

/// Grepable error code for structured logging of dropped or rejected events.
pub trait ErrorCode: std::fmt::Display {
    /// Short uppercase error code.
    fn error_code(&self) -> &'static str;
}

// =============================================================================
// CONSTRUCTORS
// =============================================================================

/// Current time as milliseconds since Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

impl Event {
    /// Create an event with an empty payload.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ts: now_ms(), data: Data::new() }
    }

    /// Create an `error` event carrying a message, sent to originators only.
    pub fn error(message: impl Into<String>) -> Self {
        Self::named("error").with_data(EVENT_ERROR, message.into())
    }

    /// Insert an arbitrary key-value pair into the event payload.
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Insert a pre-serialized value, falling back to `null` on failure.
    #[must_use]
    pub fn with_serialized(mut self, key: impl Into<String>, value: &impl Serialize) -> Self {
        self.data
            .insert(key.into(), serde_json::to_value(value).unwrap_or_default());
        self
    }
}

// =============================================================================
// ACCESSORS
// =============================================================================

impl Event {
    /// Read a string field from the payload.
    #[must_use]
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|v| v.as_str())
    }

    /// Read a UUID field from the payload (serialized as a string).
    #[must_use]
    pub fn uuid_field(&self, key: &str) -> Option<uuid::Uuid> {
        self.str_field(key).and_then(|s| s.parse().ok())
    }

    /// Read an integer field from the payload.
    #[must_use]
    pub fn u64_field(&self, key: &str) -> Option<u64> {
        self.data.get(key).and_then(serde_json::Value::as_u64)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[path = "event_test.rs"]
mod tests;
