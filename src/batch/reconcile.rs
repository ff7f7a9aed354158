//! Batch outcome classification and reply reconciliation.
//!
//! Both steps are pure functions of the transport outcome and the set of
//! registered ids, so classifying the same outcome twice always yields the
//! same code and the same reply list.
//!
//! # Classification
//!
//! First match wins:
//!
//! | Outcome | Result |
//! |---------|--------|
//! | status ≠ 200 | `Status(status)` |
//! | 200, empty body, ids registered | `Status(500)` |
//! | 200, empty body, nothing registered | silent |
//! | 200, unparsed text | `Status(500)` |
//! | 200, array | -32001 / -32002 / -32003 / clean |
//! | 200, object with `error.code == -32700` | -32700 |
//! | 200, object, more than one id registered | -32001 |
//! | 200, value not carrying the one registered id | -32001 / -32003 with `error` |
//! | 200, object with `error` | -32002 |
//! | 200, other object | clean |

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashSet;
use serde_json::{Value, json};

use crate::identifiers::RequestId;
use crate::protocol::{
    ClassifiedError, ErrorCode, MISSING_RESPONSE, PARSE_ERROR, PROTOCOL_VERSION,
};
use crate::transport::{Body, STATUS_BAD_BODY, STATUS_OK};

// ============================================================================
// Constants
// ============================================================================

/// Message of the synthesized parse error.
pub const PARSE_ERROR_MESSAGE: &str = "Parse error occurred.";

/// Message of the synthesized missing-reply error.
pub const MISSING_RESPONSE_MESSAGE: &str = "This request didn't get a response.";

/// Message of the placeholder built for transport failures.
pub const HTTP_ERROR_MESSAGE: &str = "Http error occured.";

// ============================================================================
// Classification
// ============================================================================

/// Batch-level verdict on a transport outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Every member was a notification and the server acknowledged with an
    /// empty body. Nothing more to do.
    Silent,
    /// Every registered id has a reply and none carries `error`.
    Clean,
    /// Something went wrong; the gate decides whether to deliver.
    Failed(ErrorCode),
}

impl Classification {
    /// Returns the error code, if any.
    #[inline]
    #[must_use]
    pub fn error_code(self) -> Option<ErrorCode> {
        match self {
            Self::Failed(code) => Some(code),
            Self::Silent | Self::Clean => None,
        }
    }
}

/// Classifies a batch outcome.
///
/// `registered` holds the ids of the batch's non-notification members.
#[must_use]
pub fn classify(status: u16, body: &Body, registered: &[RequestId]) -> Classification {
    if status != STATUS_OK {
        return Classification::Failed(ErrorCode::Status(i64::from(status)));
    }

    if body.is_empty() {
        return if registered.is_empty() {
            Classification::Silent
        } else {
            Classification::Failed(ErrorCode::Status(i64::from(STATUS_BAD_BODY)))
        };
    }

    match body {
        Body::Json(Value::Array(items)) => classify_array(items, registered),
        Body::Json(single) => classify_single(single, registered),
        Body::Empty | Body::Raw(_) => {
            Classification::Failed(ErrorCode::Status(i64::from(STATUS_BAD_BODY)))
        }
    }
}

/// Classifies an array reply.
fn classify_array(items: &[Value], registered: &[RequestId]) -> Classification {
    let answered: FxHashSet<RequestId> = items.iter().filter_map(RequestId::of_response).collect();

    let missing = registered.iter().any(|id| !answered.contains(id));
    let item_errors = items.iter().any(|item| item.get("error").is_some());

    match (missing, item_errors) {
        (true, true) => Classification::Failed(ErrorCode::Mixed),
        (true, false) => Classification::Failed(ErrorCode::MissingResponse),
        (false, true) => Classification::Failed(ErrorCode::ItemError),
        (false, false) => Classification::Clean,
    }
}

/// Classifies a single-value reply to a batch.
///
/// With one id registered, a reply that does not carry that id counts as
/// missing, so the request still gets the synthesized missing-reply error.
fn classify_single(reply: &Value, registered: &[RequestId]) -> Classification {
    let error = reply.get("error");

    if error
        .and_then(|error| error.get("code"))
        .and_then(Value::as_i64)
        == Some(PARSE_ERROR)
    {
        return Classification::Failed(ErrorCode::Parse);
    }

    if registered.len() > 1 {
        return Classification::Failed(ErrorCode::MissingResponse);
    }

    let missing = registered
        .first()
        .is_some_and(|id| RequestId::of_response(reply) != Some(*id));

    match (missing, error.is_some()) {
        (true, true) => Classification::Failed(ErrorCode::Mixed),
        (true, false) => Classification::Failed(ErrorCode::MissingResponse),
        (false, true) => Classification::Failed(ErrorCode::ItemError),
        (false, false) => Classification::Clean,
    }
}

// ============================================================================
// Reconciliation
// ============================================================================

/// Builds the per-request reply list for a batch outcome.
///
/// - no code: the server's replies as sent (a lone object is wrapped)
/// - -32700: a synthesized parse error for every registered id
/// - -32001/-32002/-32003: the server's reply for each registered id, or a
///   synthesized missing-reply error where there is none
/// - transport status: a `{id, message}` placeholder for every registered
///   id, with neither `result` nor `error`
///
/// Synthesized entries follow `registered` order.
#[must_use]
pub fn reconcile(code: Option<ErrorCode>, body: &Body, registered: &[RequestId]) -> Vec<Value> {
    let Some(code) = code else {
        return replies(body).to_vec();
    };

    match code {
        ErrorCode::Parse => registered
            .iter()
            .map(|id| synthesized_error(*id, PARSE_ERROR, PARSE_ERROR_MESSAGE))
            .collect(),

        code if code.is_correlation_error() => {
            let replies = replies(body);
            registered
                .iter()
                .map(|id| {
                    replies
                        .iter()
                        .find(|reply| RequestId::of_response(reply) == Some(*id))
                        .cloned()
                        .unwrap_or_else(|| {
                            synthesized_error(*id, MISSING_RESPONSE, MISSING_RESPONSE_MESSAGE)
                        })
                })
                .collect()
        }

        _ => registered
            .iter()
            .map(|id| json!({"id": id, "message": HTTP_ERROR_MESSAGE}))
            .collect(),
    }
}

/// Views a reply body as a list of replies.
fn replies(body: &Body) -> &[Value] {
    match body {
        Body::Json(Value::Array(items)) => items,
        Body::Json(single) => std::slice::from_ref(single),
        Body::Empty | Body::Raw(_) => &[],
    }
}

/// Builds a JSON-RPC error reply for `id`.
fn synthesized_error(id: RequestId, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": PROTOCOL_VERSION,
        "id": id,
        "error": ClassifiedError::error_member(code, message),
    })
}

// ============================================================================
// Tests
// ============================================================================
