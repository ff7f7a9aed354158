//! Error objects delivered to callbacks.
//!
//! [`ClassifiedError`] is what a request's exception callback (and a batch's
//! exception gate) receives. [`ErrorCode`] is the enumerable form of the
//! batch-level classification, so handlers can branch on it instead of on
//! magic numbers.
//!
//! | Code | Variant | Meaning |
//! |------|---------|---------|
//! | -32700 | [`ErrorCode::Parse`] | Server could not parse the request |
//! | -32001 | [`ErrorCode::MissingResponse`] | A request got no reply |
//! | -32002 | [`ErrorCode::ItemError`] | A batch member's reply carried `error` |
//! | -32003 | [`ErrorCode::Mixed`] | Both of the above |
//! | other | [`ErrorCode::Status`] | Transport status (e.g. 404, 500) |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

// ============================================================================
// Constants
// ============================================================================

/// Server could not parse the request.
pub const PARSE_ERROR: i64 = -32700;

/// A request in a batch received no reply.
pub const MISSING_RESPONSE: i64 = -32001;

/// At least one batch member's reply carried an `error`.
pub const ITEM_ERROR: i64 = -32002;

/// Missing replies and error replies in the same batch.
pub const MIXED_ERROR: i64 = -32003;

// ============================================================================
// ErrorCode
// ============================================================================

/// Batch-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The server could not parse the batch at all.
    Parse,
    /// One or more requests got no reply.
    MissingResponse,
    /// One or more replies carried an `error`, none missing.
    ItemError,
    /// Both missing replies and error replies.
    Mixed,
    /// A raw transport status (non-200, or 500 for an unusable body).
    Status(i64),
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Parse => PARSE_ERROR,
            Self::MissingResponse => MISSING_RESPONSE,
            Self::ItemError => ITEM_ERROR,
            Self::Mixed => MIXED_ERROR,
            Self::Status(status) => status,
        }
    }

    /// Maps a numeric code back onto the taxonomy.
    #[must_use]
    pub const fn from_code(code: i64) -> Self {
        match code {
            PARSE_ERROR => Self::Parse,
            MISSING_RESPONSE => Self::MissingResponse,
            ITEM_ERROR => Self::ItemError,
            MIXED_ERROR => Self::Mixed,
            other => Self::Status(other),
        }
    }

    /// Returns `true` for the codes whose replies are correlated per id
    /// (-32001, -32002, -32003).
    #[inline]
    #[must_use]
    pub const fn is_correlation_error(self) -> bool {
        matches!(self, Self::MissingResponse | Self::ItemError | Self::Mixed)
    }

    /// Returns `true` for a raw transport status.
    #[inline]
    #[must_use]
    pub const fn is_transport(self) -> bool {
        matches!(self, Self::Status(_))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse => write!(f, "parse error ({PARSE_ERROR})"),
            Self::MissingResponse => write!(f, "missing response ({MISSING_RESPONSE})"),
            Self::ItemError => write!(f, "item error ({ITEM_ERROR})"),
            Self::Mixed => write!(f, "missing and item errors ({MIXED_ERROR})"),
            Self::Status(status) => write!(f, "transport status {status}"),
        }
    }
}

// ============================================================================
// ClassifiedError
// ============================================================================

/// Error delivered to an exception callback.
///
/// For server-reported errors this is the reply's `error` member. For
/// transport failures `code` is the status and `message` is the raw body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedError {
    /// Numeric error code.
    pub code: i64,

    /// A string, or the whole reply body for transport failures.
    #[serde(default)]
    pub message: Value,

    /// Optional extra data supplied by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ClassifiedError {
    /// Creates an error without `data`.
    #[inline]
    #[must_use]
    pub fn new(code: i64, message: impl Into<Value>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Reads a reply's `error` member.
    ///
    /// Members the server left out default (`code` to 0, `message` to
    /// null). A non-object `error` becomes the message of a code-0 error.
    #[must_use]
    pub fn from_error_member(error: &Value) -> Self {
        match error {
            Value::Object(members) => Self {
                code: members.get("code").and_then(Value::as_i64).unwrap_or(0),
                message: members.get("message").cloned().unwrap_or(Value::Null),
                data: members.get("data").cloned(),
            },
            other => Self::new(0, other.clone()),
        }
    }

    /// Returns the batch-level classification of this error's code.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ErrorCode {
        ErrorCode::from_code(self.code)
    }

    /// Returns the message if it is a plain string.
    #[inline]
    #[must_use]
    pub fn message_str(&self) -> Option<&str> {
        self.message.as_str()
    }

    /// Builds a JSON-RPC error member `{code, message, data: null}`.
    pub(crate) fn error_member(code: i64, message: &str) -> Value {
        json!({"code": code, "message": message, "data": null})
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Value::String(text) => write!(f, "[{}] {}", self.code, text),
            other => write!(f, "[{}] {}", self.code, other),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_round_trip() {
        for code in [PARSE_ERROR, MISSING_RESPONSE, ITEM_ERROR, MIXED_ERROR, 404, 500] {
            assert_eq!(ErrorCode::from_code(code).code(), code);
        }
    }

    #[test]
    fn test_error_code_predicates() {
        assert!(ErrorCode::MissingResponse.is_correlation_error());
        assert!(ErrorCode::ItemError.is_correlation_error());
        assert!(ErrorCode::Mixed.is_correlation_error());
        assert!(!ErrorCode::Parse.is_correlation_error());
        assert!(!ErrorCode::Status(500).is_correlation_error());

        assert!(ErrorCode::Status(404).is_transport());
        assert!(!ErrorCode::Parse.is_transport());
    }

    #[test]
    fn test_unrelated_negative_code_is_not_correlation_error() {
        // Standard server codes like -32601 must not be mistaken for the
        // -32001..-32003 family.
        assert_eq!(ErrorCode::from_code(-32601), ErrorCode::Status(-32601));
        assert!(!ErrorCode::from_code(-32601).is_correlation_error());
    }

    #[test]
    fn test_from_error_member() {
        let error = ClassifiedError::from_error_member(&json!({
            "code": -32601,
            "message": "Method not found",
            "data": {"method": "nope"}
        }));

        assert_eq!(error.code, -32601);
        assert_eq!(error.message_str(), Some("Method not found"));
        assert_eq!(error.data, Some(json!({"method": "nope"})));
    }

    #[test]
    fn test_from_error_member_not_an_object() {
        let error = ClassifiedError::from_error_member(&json!("boom"));
        assert_eq!(error.code, 0);
        assert_eq!(error.message, json!("boom"));
    }

    #[test]
    fn test_display() {
        let error = ClassifiedError::new(404, "Not Found");
        assert_eq!(error.to_string(), "[404] Not Found");
        assert_eq!(ErrorCode::Mixed.to_string(), "missing and item errors (-32003)");
    }

    #[test]
    fn test_error_member_shape() {
        assert_eq!(
            ClassifiedError::error_member(PARSE_ERROR, "Parse error occurred."),
            json!({"code": -32700, "message": "Parse error occurred.", "data": null})
        );
    }
}
