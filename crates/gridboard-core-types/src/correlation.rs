//! Correlation identifiers for command/event matching
//!
//! Every command carries a correlation id; every event emitted while that
//! command is processed carries the same id. The id is also the handle used
//! for targeted cancellation of an in-flight command.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier correlating one command with the events it produces
///
/// Callers may supply their own opaque string; ids generated here use UUIDv7
/// so they sort roughly by creation time in traces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Generate a new random CorrelationId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from a caller-supplied string
    ///
    /// The caller is responsible for uniqueness per logical operation;
    /// duplicate ids make cancellation and event matching ambiguous.
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CorrelationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
