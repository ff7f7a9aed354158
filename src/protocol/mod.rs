//! JSON-RPC 2.0 message types.
//!
//! # Protocol Overview
//!
//! | Message | Direction | Shape |
//! |---------|-----------|-------|
//! | Request | Client → Server | `{"jsonrpc":"2.0","method":..,"params"?:..,"id":n}` |
//! | Notification | Client → Server | same, without `id` |
//! | Batch | Client → Server | JSON array of the above |
//! | Success | Server → Client | `{"jsonrpc":"2.0","result":..,"id":n}` |
//! | Failure | Server → Client | `{"jsonrpc":"2.0","error":{"code":..,"message":..},"id":n\|null}` |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `fault` | Error objects and the batch error taxonomy |
//! | `request` | Request envelope and its callbacks |

// ============================================================================
// Submodules
// ============================================================================

/// Error objects and the batch error taxonomy.
pub mod fault;

/// Request envelope type.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use fault::{
    ClassifiedError, ErrorCode, ITEM_ERROR, MISSING_RESPONSE, MIXED_ERROR, PARSE_ERROR,
};
pub use request::{
    CompleteHandler, ExceptionHandler, PROTOCOL_VERSION, Params, Request, RequestBody,
    SuccessHandler,
};
