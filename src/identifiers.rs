//! Request identifiers and id generation.
//!
//! Every non-notification request carries a [`RequestId`] drawn from an
//! [`IdGenerator`]. The default generator is a single process-wide counter:
//!
//! - initialized to 1 at startup
//! - incremented once per request created
//! - never decremented or reset
//!
//! so two unrelated batches (or a batch and a lone call) in flight at the
//! same time never share an id.
//!
//! Ids are kept in one canonical form (`u64`). Servers are free to echo an
//! id back as a JSON number or as a decimal string; [`RequestId::from_value`]
//! accepts both so that correlation never depends on the wire type.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Global Counter
// ============================================================================

/// Next id handed out by [`GlobalIdGenerator`].
static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

// ============================================================================
// RequestId
// ============================================================================

/// Correlation id of a JSON-RPC request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    /// Wraps a raw id value.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Takes the next id from the process-wide counter.
    #[inline]
    #[must_use]
    pub fn next() -> Self {
        GlobalIdGenerator.next_id()
    }

    /// Returns the raw id value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Normalizes a wire id into a [`RequestId`].
    ///
    /// Accepts non-negative integers and decimal strings. Anything else
    /// (null, floats, negative numbers, objects) cannot correlate with a
    /// request this client sent and yields `None`.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => number.as_u64().map(Self),
            Value::String(text) => text.parse::<u64>().ok().map(Self),
            _ => None,
        }
    }

    /// Reads and normalizes the `id` member of a response object.
    #[inline]
    #[must_use]
    pub fn of_response(response: &Value) -> Option<Self> {
        response.get("id").and_then(Self::from_value)
    }
}

impl fmt::Display for RequestId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RequestId {
    #[inline]
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<RequestId> for Value {
    #[inline]
    fn from(id: RequestId) -> Self {
        Value::from(id.0)
    }
}

// ============================================================================
// IdGenerator
// ============================================================================

/// Source of request ids.
///
/// The client holds one generator and asks it for an id every time a
/// non-notification request is built. Implementations must return strictly
/// increasing values.
pub trait IdGenerator: Send + Sync {
    /// Returns the next id.
    fn next_id(&self) -> RequestId;
}

/// The process-wide counter.
///
/// All instances share the same underlying counter.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalIdGenerator;

impl IdGenerator for GlobalIdGenerator {
    #[inline]
    fn next_id(&self) -> RequestId {
        RequestId(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A private counter with a chosen starting point.
///
/// Useful in tests that need to know which ids will be issued.
#[derive(Debug)]
pub struct SequenceIdGenerator {
    next: AtomicU64,
}

impl SequenceIdGenerator {
    /// Creates a generator whose first id is `start`.
    #[inline]
    #[must_use]
    pub const fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }
}

impl Default for SequenceIdGenerator {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdGenerator for SequenceIdGenerator {
    #[inline]
    fn next_id(&self) -> RequestId {
        RequestId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

// ============================================================================
// Tests
// ============================================================================
