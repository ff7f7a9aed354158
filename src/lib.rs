//! JSON-RPC 2.0 client engine with batch reconciliation.
//!
//! This library builds JSON-RPC request and notification envelopes, sends
//! them over a pluggable transport and delivers each reply to per-request
//! callbacks. Batches travel as one payload; their single reply is
//! classified and mapped back onto every member by id.
//!
//! # Architecture
//!
//! ```text
//! Request ──► Batch ──► Transport ──► classify ──► gate ──► reconcile ──► resolve
//!    │                                                                       ▲
//!    └──────────────────────────► Transport ─────────────────────────────────┘
//! ```
//!
//! Key design principles:
//!
//! - Ids come from one process-wide counter (injectable for tests)
//! - Replies are correlated by id, never by position
//! - Per-request failures go to callbacks; only malformed replies and bad
//!   input surface as [`Error`]
//! - A batch-level exception gate can veto all per-request delivery
//!
//! # Quick Start
//!
//! ```no_run
//! use jsonrpc_batch_client::{Client, Result};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::builder()
//!         .url("http://localhost:8080/rpc")
//!         .build()?;
//!
//!     let request = client
//!         .request("math.add", Some(json!([1, 2])))?
//!         .on_success(|sum| println!("sum = {sum}"))
//!         .on_exception(|error| eprintln!("failed: {error}"));
//!
//!     client.execute(request).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`batch`] | [`Batch`] building, classification, reconciliation |
//! | [`client`] | [`Client`], builder, configuration, method table |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | [`RequestId`] and id generators |
//! | [`lifecycle`] | Single-reply resolution |
//! | [`protocol`] | Envelope and error object types |
//! | [`transport`] | [`Transport`] trait, HTTP and scripted transports |

// ============================================================================
// Modules
// ============================================================================

/// Batch requests.
///
/// - [`Batch`] - Collects requests and executes them as one payload
/// - [`batch::classify`] / [`batch::reconcile`] - Pure outcome handling
pub mod batch;

/// Client entry point.
///
/// Use [`Client::builder()`] to create a configured client.
pub mod client;

/// Error types and result aliases.
pub mod error;

/// Request ids and id generation.
pub mod identifiers;

/// Single-reply resolution.
pub mod lifecycle;

/// JSON-RPC message types.
pub mod protocol;

/// Transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Batch types
pub use batch::{Batch, BatchOutcome, Classification};

// Client types
pub use client::{Client, ClientBuilder, ClientConfig, MethodFactory, MethodTable};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{GlobalIdGenerator, IdGenerator, RequestId, SequenceIdGenerator};

// Lifecycle types
pub use lifecycle::Delivery;

// Protocol types
pub use protocol::{ClassifiedError, ErrorCode, Params, Request};

// Transport types
pub use transport::{
    Body, Credentials, HttpTransport, ScriptedTransport, Transport, TransportResponse,
};
