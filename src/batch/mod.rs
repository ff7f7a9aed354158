//! Batch requests.
//!
//! # Reconciliation
//!
//! ```text
//! transport reply ──► classify ──► gate ──► reconcile ──► resolve (per id)
//!                       │           │
//!                       │           └─ false: stop, no callbacks
//!                       └─ silent: notifications only, nothing to do
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `coordinator` | [`Batch`] building and execution |
//! | `reconcile` | Pure classification and reply-list construction |

// ============================================================================
// Submodules
// ============================================================================

/// Batch building and execution.
pub mod coordinator;

/// Outcome classification and reply reconciliation.
pub mod reconcile;

// ============================================================================
// Re-exports
// ============================================================================

pub use coordinator::{Batch, BatchOutcome, ExceptionGate};
pub use reconcile::{Classification, classify, reconcile};
