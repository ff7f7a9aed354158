//! Error types for the JSON-RPC client.
//!
//! This module defines the crate-level error type. These are the errors
//! that surface to the immediate caller as `Err`. Per-request failures
//! (transport status, server error objects, missing batch replies) are
//! never returned this way: they are delivered to the request's
//! exception callback as a [`ClassifiedError`](crate::protocol::ClassifiedError).
//!
//! # Usage
//!
//! ```ignore
//! use jsonrpc_batch_client::{Client, Result};
//!
//! async fn example(client: &Client) -> Result<()> {
//!     let request = client.request("math.add", Some(serde_json::json!([1, 2])))?;
//!     client.execute(request).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Validation | [`Error::InvalidParams`], [`Error::InvalidMethod`], [`Error::DuplicateId`], [`Error::UnknownMethod`] |
//! | Configuration | [`Error::Config`] |
//! | Protocol | [`Error::MalformedResponse`], [`Error::MalformedBatch`] |
//! | External | [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

use crate::identifiers::RequestId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// Params were supplied but are neither an array nor an object.
    #[error(
        "The parameters for {method}() must be passed as an array or an object; \
         the value you supplied ({value}) is of type \"{kind}\""
    )]
    InvalidParams {
        /// Method the params were meant for.
        method: String,
        /// The rejected value, rendered as JSON.
        value: String,
        /// JSON type name of the rejected value.
        kind: &'static str,
    },

    /// Method name is empty or otherwise unusable.
    #[error("Invalid method name: {message}")]
    InvalidMethod {
        /// Description of the problem.
        message: String,
    },

    /// Two batch members share an id.
    ///
    /// Only possible when requests built by different id generators are
    /// mixed in one batch.
    #[error("Duplicate request id in batch: {id}")]
    DuplicateId {
        /// The id that was already registered.
        id: RequestId,
    },

    /// Method is not present in the client's method table.
    #[error("Unknown method: {method}")]
    UnknownMethod {
        /// The name that was looked up.
        method: String,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Client configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// A success-status response carried neither `result` nor `error`.
    ///
    /// No callback can be chosen for such a reply, so it is surfaced here.
    #[error("The JSON RPC response {response} has neither \"result\" nor \"error\"")]
    MalformedResponse {
        /// Id of the request the reply was resolved against, if any.
        id: Option<RequestId>,
        /// The offending status and body, rendered as JSON.
        response: String,
    },

    /// One or more members of a batch received a malformed reply.
    ///
    /// The remaining members were still delivered.
    #[error("Malformed responses for batch members: {ids:?}")]
    MalformedBatch {
        /// Ids whose replies were malformed, in delivery order.
        ids: Vec<RequestId>,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl Error {
    /// Creates an invalid params error.
    pub fn invalid_params(method: impl Into<String>, value: &serde_json::Value) -> Self {
        Self::InvalidParams {
            method: method.into(),
            value: value.to_string(),
            kind: json_kind(value),
        }
    }

    /// Creates an invalid method error.
    #[inline]
    pub fn invalid_method(message: impl Into<String>) -> Self {
        Self::InvalidMethod {
            message: message.into(),
        }
    }

    /// Creates an unknown method error.
    #[inline]
    pub fn unknown_method(method: impl Into<String>) -> Self {
        Self::UnknownMethod {
            method: method.into(),
        }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a malformed response error.
    #[inline]
    pub fn malformed_response(id: Option<RequestId>, response: impl Into<String>) -> Self {
        Self::MalformedResponse {
            id,
            response: response.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error was caused by bad caller input.
    #[inline]
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidParams { .. }
                | Self::InvalidMethod { .. }
                | Self::DuplicateId { .. }
                | Self::UnknownMethod { .. }
        )
    }

    /// Returns `true` if the server sent a reply that could not be delivered.
    #[inline]
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::MalformedResponse { .. } | Self::MalformedBatch { .. }
        )
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Returns the JSON type name of a value.
fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Tests
// ============================================================================
