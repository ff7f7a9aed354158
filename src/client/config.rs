//! Serializable client configuration.
//!
//! # Example
//!
//! ```ignore
//! let config = ClientConfig::from_json(r#"{
//!     "url": "http://localhost:8080/rpc",
//!     "user": "alice",
//!     "password": "secret",
//!     "methods": {"math.add": false, "log.write": true}
//! }"#)?;
//!
//! let client = Client::from_config(config)?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::transport::Credentials;

use super::methods::MethodTable;

// ============================================================================
// ClientConfig
// ============================================================================

/// Endpoint, credentials and method table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// JSON-RPC endpoint URL.
    pub url: String,

    /// Basic-auth user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Basic-auth password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Methods exposed through [`Client::call`](super::Client::call).
    #[serde(default)]
    pub methods: MethodTable,
}

impl ClientConfig {
    /// Creates a configuration for `url` with no credentials or methods.
    #[inline]
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the document is invalid.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Returns the basic-auth credentials, if a user is set.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        self.user
            .as_ref()
            .map(|user| Credentials::new(user, self.password.clone()))
    }
}

// ============================================================================
// Tests
// ============================================================================
