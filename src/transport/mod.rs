//! Transport layer.
//!
//! The engine never talks to the network itself. It hands a serialized
//! payload to a [`Transport`] and gets back exactly one
//! [`TransportResponse`]: an HTTP-like status code plus the body, already
//! parsed when it was JSON.
//!
//! ```text
//! ┌──────────────┐   payload (String)   ┌──────────────┐
//! │ Request /    │ ───────────────────► │  Transport   │ ──► server
//! │ Batch        │ ◄─────────────────── │              │
//! └──────────────┘   status + Body      └──────────────┘
//! ```
//!
//! Transports never fail with `Err`: a failure is a status code. Retries,
//! timeouts, headers and credentials are all the transport's business.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `http` | HTTP POST transport (reqwest) |
//! | `scripted` | In-memory transport replaying canned responses |

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

// ============================================================================
// Submodules
// ============================================================================

/// HTTP POST transport.
pub mod http;

/// In-memory transport replaying canned responses.
pub mod scripted;

// ============================================================================
// Re-exports
// ============================================================================

pub use http::{Credentials, HttpTransport};
pub use scripted::ScriptedTransport;

// ============================================================================
// Constants
// ============================================================================

/// The only status treated as success.
pub const STATUS_OK: u16 = 200;

/// Status reported when a 200 reply body cannot be used.
pub const STATUS_BAD_BODY: u16 = 500;

// ============================================================================
// Body
// ============================================================================

/// A response body as the engine sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Nothing was sent back.
    Empty,
    /// A parsed JSON document.
    Json(Value),
    /// Text that was not parsed: a status text or an unparsable reply.
    Raw(String),
}

impl Body {
    /// Returns `true` for an empty body.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Raw(text) => text.is_empty(),
            Self::Json(_) => false,
        }
    }

    /// Returns the parsed document, if any.
    #[inline]
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns a member of a JSON object body.
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_json().and_then(|value| value.as_object()?.get(key))
    }

    /// Returns `true` if the body is a JSON object with member `key`.
    #[inline]
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Renders the body as a JSON value (text bodies become strings).
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Empty => Value::String(String::new()),
            Self::Json(value) => value.clone(),
            Self::Raw(text) => Value::String(text.clone()),
        }
    }
}

impl From<Value> for Body {
    #[inline]
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

// ============================================================================
// TransportResponse
// ============================================================================

/// Status and body of one transport call.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// HTTP-like status code; `0` when no status was obtained at all.
    pub status: u16,
    /// The reply body.
    pub body: Body,
}

impl TransportResponse {
    /// Creates a response.
    #[inline]
    #[must_use]
    pub fn new(status: u16, body: Body) -> Self {
        Self { status, body }
    }

    /// A 200 reply with a JSON body.
    #[inline]
    #[must_use]
    pub fn json(value: Value) -> Self {
        Self::new(STATUS_OK, Body::Json(value))
    }

    /// A 200 reply with no body.
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::new(STATUS_OK, Body::Empty)
    }

    /// A failed call with a text body.
    #[inline]
    #[must_use]
    pub fn failure(status: u16, text: impl Into<String>) -> Self {
        Self::new(status, Body::Raw(text.into()))
    }

    /// Returns `true` if the status is 200.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }
}

// ============================================================================
// Transport
// ============================================================================

/// Sends one serialized payload and returns the reply.
///
/// Implementations must return exactly one response per call.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `payload` and waits for the reply.
    async fn send(&self, payload: String) -> TransportResponse;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, payload: String) -> TransportResponse {
        (**self).send(payload).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_body_is_empty() {
        assert!(Body::Empty.is_empty());
        assert!(Body::Raw(String::new()).is_empty());
        assert!(!Body::Raw("Not Found".into()).is_empty());
        assert!(!Body::Json(json!("")).is_empty());
    }

    #[test]
    fn test_body_members() {
        let body = Body::Json(json!({"result": 42, "id": 7}));
        assert!(body.has("result"));
        assert!(!body.has("error"));
        assert_eq!(body.get("result"), Some(&json!(42)));

        assert!(!Body::Json(json!([1, 2])).has("result"));
        assert!(!Body::Raw("result".into()).has("result"));
    }

    #[test]
    fn test_body_to_value() {
        assert_eq!(Body::Empty.to_value(), json!(""));
        assert_eq!(Body::Raw("Bad Gateway".into()).to_value(), json!("Bad Gateway"));
        assert_eq!(Body::Json(json!({"a": 1})).to_value(), json!({"a": 1}));
    }

    #[test]
    fn test_response_constructors() {
        assert!(TransportResponse::json(json!({})).is_success());
        assert!(TransportResponse::empty().is_success());
        assert!(TransportResponse::empty().body.is_empty());

        let failure = TransportResponse::failure(404, "Not Found");
        assert!(!failure.is_success());
        assert_eq!(failure.body, Body::Raw("Not Found".into()));
    }
}
