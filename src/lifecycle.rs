//! Single-request response resolution.
//!
//! [`resolve`] turns one status/body pair into callback invocations on one
//! [`Request`]. It is used directly by [`Request::execute`] and once per
//! reconciled reply by [`Batch::execute`](crate::batch::Batch::execute).
//!
//! # Resolution Rules
//!
//! Evaluated in order:
//!
//! 1. Notification + status 200 + empty body: nothing fires.
//! 2. Status 200 and body has `result`: success callback.
//! 3. Status not 200, or body has `error`: exception callback with
//!    `{code: status, message: body}` or the body's `error` member.
//! 4. Otherwise the reply is malformed: [`Error::MalformedResponse`].
//!
//! The complete callback fires after 2 and 3.

// ============================================================================
// Imports
// ============================================================================

use serde_json::json;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::protocol::{ClassifiedError, Request};
use crate::transport::{Body, STATUS_OK, Transport};

// ============================================================================
// Delivery
// ============================================================================

/// Which callback path a reply took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Acknowledged notification; no callback fired.
    Silent,
    /// Success and complete callbacks fired.
    Success,
    /// Exception and complete callbacks fired.
    Exception,
}

// ============================================================================
// Resolution
// ============================================================================

/// Delivers one reply to `request`'s callbacks.
///
/// # Errors
///
/// Returns [`Error::MalformedResponse`] when a 200 reply has neither
/// `result` nor `error`. No callback fires in that case.
pub fn resolve(request: &mut Request, status: u16, body: &Body) -> Result<Delivery> {
    let success = status == STATUS_OK;

    if request.is_notification() && success && body.is_empty() {
        trace!(method = request.method(), "Notification acknowledged");
        return Ok(Delivery::Silent);
    }

    let delivery = if success && let Some(result) = body.get("result") {
        request.fire_success(result.clone());
        Delivery::Success
    } else if !success || body.has("error") {
        let error = match body.get("error") {
            Some(member) if success => ClassifiedError::from_error_member(member),
            _ => ClassifiedError::new(i64::from(status), body.to_value()),
        };
        debug!(id = ?request.id(), code = error.code, "Delivering exception");
        request.fire_exception(error);
        Delivery::Exception
    } else {
        let response = json!({"code": status, "message": body.to_value()});
        warn!(id = ?request.id(), %response, "Reply has neither result nor error");
        return Err(Error::malformed_response(request.id(), response.to_string()));
    };

    request.fire_complete();
    Ok(delivery)
}

// ============================================================================
// Request - Execution
// ============================================================================

impl Request {
    /// Sends this request on its own and delivers the reply.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the body cannot be serialized
    /// - [`Error::MalformedResponse`] if the reply cannot be delivered
    pub async fn execute(mut self, transport: &dyn Transport) -> Result<Delivery> {
        let payload = serde_json::to_string(self.body())?;
        debug!(method = self.method(), id = ?self.id(), "Executing request");

        let response = transport.send(payload).await;
        resolve(&mut self, response.status, &response.body)
    }
}

// ============================================================================
// Tests
// ============================================================================
