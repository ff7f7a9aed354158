//! Batch request coordinator.
//!
//! A [`Batch`] collects requests, sends them as one JSON array and maps
//! the single reply back onto each request's callbacks.
//!
//! # Lifecycle
//!
//! 1. [`Batch::add`] / [`Batch::add_all`] - wire order follows add order
//! 2. [`Batch::on_exception`] - optional batch-level gate
//! 3. [`Batch::execute`] - one transport call, then reconciliation
//!
//! Replies are delivered by id, not by wire order.

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::lifecycle::resolve;
use crate::protocol::{ClassifiedError, ErrorCode, Request};
use crate::transport::{Body, Transport, TransportResponse};

use super::reconcile::{Classification, classify, reconcile};

// ============================================================================
// Types
// ============================================================================

/// Batch-level exception gate.
///
/// Receives `{code, message: body}` whenever the batch outcome was
/// classified as an error. Returning `false` suppresses every per-request
/// callback for the batch; returning `true` lets delivery proceed.
pub type ExceptionGate = Box<dyn FnMut(&ClassifiedError) -> bool + Send>;

// ============================================================================
// BatchOutcome
// ============================================================================

/// What happened to a batch after its reply arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Only notifications were sent and the server acknowledged them.
    Silent,
    /// The gate rejected delivery for this error.
    Vetoed(ErrorCode),
    /// Replies were delivered to the members' callbacks.
    Delivered {
        /// Batch-level error, if the outcome was not clean.
        code: Option<ErrorCode>,
        /// Number of replies delivered.
        count: usize,
    },
}

impl BatchOutcome {
    /// Returns the batch-level error code, if any.
    #[inline]
    #[must_use]
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Silent => None,
            Self::Vetoed(code) => Some(*code),
            Self::Delivered { code, .. } => *code,
        }
    }
}

// ============================================================================
// Batch
// ============================================================================

/// A set of requests sent as one payload.
pub struct Batch {
    /// Wire bodies in add order, notifications included.
    wire: Vec<Value>,
    /// Non-notification members by id.
    registry: BTreeMap<RequestId, Request>,
    /// Batch-level exception gate.
    gate: ExceptionGate,
}

impl Default for Batch {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Batch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Batch")
            .field("wire", &self.wire)
            .field("registered", &self.registry.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Batch - Building
// ============================================================================

impl Batch {
    /// Creates an empty batch.
    ///
    /// Without [`Batch::on_exception`], any batch-level error suppresses
    /// per-request delivery.
    #[must_use]
    pub fn new() -> Self {
        Self {
            wire: Vec::new(),
            registry: BTreeMap::new(),
            gate: Box::new(|_| false),
        }
    }

    /// Appends a request.
    ///
    /// Notifications go on the wire but are not registered: no reply can
    /// ever be correlated to them, so the request itself is dropped here.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the body cannot be serialized
    /// - [`Error::DuplicateId`] if a member with the same id was added
    pub fn add(&mut self, request: Request) -> Result<&mut Self> {
        let body = request.to_value()?;

        match request.id() {
            Some(id) => match self.registry.entry(id) {
                Entry::Occupied(_) => return Err(Error::DuplicateId { id }),
                Entry::Vacant(slot) => {
                    slot.insert(request);
                }
            },
            None => trace!(method = request.method(), "Adding notification to batch"),
        }

        self.wire.push(body);
        Ok(self)
    }

    /// Appends several requests, preserving their order.
    ///
    /// # Errors
    ///
    /// Stops at the first request [`Batch::add`] rejects; earlier ones stay
    /// in the batch.
    pub fn add_all<I>(&mut self, requests: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = Request>,
    {
        for request in requests {
            self.add(request)?;
        }
        Ok(self)
    }

    /// Sets the batch-level exception gate.
    pub fn on_exception<F>(&mut self, gate: F) -> &mut Self
    where
        F: FnMut(&ClassifiedError) -> bool + Send + 'static,
    {
        self.gate = Box::new(gate);
        self
    }
}

// ============================================================================
// Batch - Accessors
// ============================================================================

impl Batch {
    /// Returns the number of members, notifications included.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.wire.len()
    }

    /// Returns `true` if nothing was added.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wire.is_empty()
    }

    /// Returns the ids awaiting a reply, ascending.
    #[must_use]
    pub fn ids(&self) -> Vec<RequestId> {
        self.registry.keys().copied().collect()
    }

    /// Returns the wire bodies in add order.
    #[inline]
    #[must_use]
    pub fn wire(&self) -> &[Value] {
        &self.wire
    }
}

// ============================================================================
// Batch - Execution
// ============================================================================

impl Batch {
    /// Sends the batch and delivers the reply.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the payload cannot be serialized
    /// - [`Error::MalformedBatch`] if some replies could not be delivered;
    ///   every other member was still delivered
    pub async fn execute(self, transport: &dyn Transport) -> Result<BatchOutcome> {
        let payload = serde_json::to_string(&self.wire)?;
        debug!(
            members = self.wire.len(),
            registered = self.registry.len(),
            "Executing batch"
        );

        let response = transport.send(payload).await;
        self.deliver(response)
    }

    /// Classifies a reply and runs the members' callbacks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedBatch`] if some replies had neither
    /// `result` nor `error` at status 200.
    pub fn deliver(mut self, response: TransportResponse) -> Result<BatchOutcome> {
        let TransportResponse { status, body } = response;
        let ids = self.ids();

        let code = match classify(status, &body, &ids) {
            Classification::Silent => {
                trace!("Batch of notifications acknowledged");
                return Ok(BatchOutcome::Silent);
            }
            Classification::Clean => None,
            Classification::Failed(code) => {
                let error = ClassifiedError::new(code.code(), body.to_value());
                if !(self.gate)(&error) {
                    debug!(%code, "Batch delivery vetoed");
                    return Ok(BatchOutcome::Vetoed(code));
                }
                debug!(%code, "Delivering failed batch");
                Some(code)
            }
        };

        let mut count = 0;
        let mut malformed = Vec::new();

        for reply in reconcile(code, &body, &ids) {
            let Some(id) = RequestId::of_response(&reply) else {
                warn!(%reply, "Reply without usable id");
                continue;
            };
            let Some(request) = self.registry.get_mut(&id) else {
                warn!(%id, "Reply for unknown request");
                continue;
            };

            match resolve(request, status, &Body::Json(reply)) {
                Ok(_) => count += 1,
                Err(e) => {
                    warn!(%id, error = %e, "Undeliverable reply");
                    malformed.push(id);
                }
            }
        }

        if !malformed.is_empty() {
            return Err(Error::MalformedBatch { ids: malformed });
        }

        Ok(BatchOutcome::Delivered { code, count })
    }
}

// ============================================================================
// Tests
// ============================================================================
