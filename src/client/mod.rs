//! Client entry point.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Client`] | Builds and executes requests and batches |
//! | [`ClientBuilder`] | Fluent configuration builder |
//! | [`ClientConfig`] | Serializable configuration |
//! | [`MethodTable`] | Known methods and their notification flag |
//! | [`MethodFactory`] | Request factory for one method |
//!
//! # Example
//!
//! ```no_run
//! use jsonrpc_batch_client::{Client, Result};
//! use serde_json::json;
//!
//! # async fn example() -> Result<()> {
//! let client = Client::builder()
//!     .url("http://localhost:8080/rpc")
//!     .method("math.add", false)
//!     .build()?;
//!
//! let mut batch = client.batch();
//! batch
//!     .add(client.call("math.add", Some(json!([1, 2])))?)?
//!     .add(client.call("math.add", Some(json!([3, 4])))?)?
//!     .on_exception(|error| {
//!         eprintln!("batch failed: {error}");
//!         true
//!     });
//!
//! client.execute_batch(batch).await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for client configuration.
pub mod builder;

/// Serializable client configuration.
pub mod config;

/// Core client implementation.
pub mod core;

/// Method table and request factories.
pub mod methods;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ClientBuilder;
pub use config::ClientConfig;
pub use self::core::Client;
pub use methods::{MethodFactory, MethodTable};
