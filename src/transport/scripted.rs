//! In-memory transport replaying canned responses.
//!
//! Responses are returned in the order they were queued; every payload
//! sent is recorded so callers can inspect what went over the "wire".

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{trace, warn};

use super::{Transport, TransportResponse};

// ============================================================================
// Constants
// ============================================================================

/// Body returned once the queue runs dry.
const EXHAUSTED_MESSAGE: &str = "No scripted response left";

// ============================================================================
// ScriptedTransport
// ============================================================================

/// A [`Transport`] that replays queued responses.
///
/// When the queue is empty it answers with status 0, the same status a
/// transport reports when no HTTP exchange happened at all.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<TransportResponse>>,
    sent: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    /// Creates a transport with an empty queue.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport that will answer with `response` once.
    #[must_use]
    pub fn replying(response: TransportResponse) -> Self {
        let transport = Self::new();
        transport.push(response);
        transport
    }

    /// Queues another response.
    pub fn push(&self, response: TransportResponse) {
        self.responses.lock().push_back(response);
    }

    /// Returns every payload sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    /// Returns every payload sent so far, parsed as JSON.
    ///
    /// Payloads that are not valid JSON are skipped.
    #[must_use]
    pub fn sent_json(&self) -> Vec<Value> {
        self.sent
            .lock()
            .iter()
            .filter_map(|payload| serde_json::from_str(payload).ok())
            .collect()
    }

    /// Returns the number of queued responses not yet consumed.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.responses.lock().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, payload: String) -> TransportResponse {
        trace!(bytes = payload.len(), "Scripted send");
        self.sent.lock().push(payload);

        match self.responses.lock().pop_front() {
            Some(response) => response,
            None => {
                warn!("Scripted transport exhausted");
                TransportResponse::failure(0, EXHAUSTED_MESSAGE)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
