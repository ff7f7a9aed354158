//! Builder pattern for client configuration.
//!
//! # Example
//!
//! ```no_run
//! use jsonrpc_batch_client::Client;
//!
//! # fn example() -> jsonrpc_batch_client::Result<()> {
//! let client = Client::builder()
//!     .url("http://localhost:8080/rpc")
//!     .credentials("alice", Some("secret"))
//!     .method("math.add", false)
//!     .method("log.write", true)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::identifiers::{GlobalIdGenerator, IdGenerator};
use crate::transport::{Credentials, HttpTransport, Transport};

use super::config::ClientConfig;
use super::core::Client;
use super::methods::MethodTable;

// ============================================================================
// ClientBuilder
// ============================================================================

/// Builder for configuring a [`Client`].
///
/// Use [`Client::builder()`] to create a new builder.
#[derive(Default, Clone)]
pub struct ClientBuilder {
    /// Endpoint for the default HTTP transport.
    url: Option<String>,
    /// Basic-auth credentials for the default HTTP transport.
    credentials: Option<Credentials>,
    /// Method table entries, in the order given.
    methods: Vec<(String, bool)>,
    /// Explicit transport; replaces the HTTP transport.
    transport: Option<Arc<dyn Transport>>,
    /// Id source; the process-wide counter when unset.
    ids: Option<Arc<dyn IdGenerator>>,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("url", &self.url)
            .field("credentials", &self.credentials)
            .field("methods", &self.methods)
            .field("transport", &self.transport.is_some())
            .field("ids", &self.ids.is_some())
            .finish()
    }
}

// ============================================================================
// ClientBuilder Implementation
// ============================================================================

impl ClientBuilder {
    /// Creates a new builder with no configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder pre-filled from a [`ClientConfig`].
    #[must_use]
    pub fn from_config(config: ClientConfig) -> Self {
        let methods = config
            .methods
            .iter()
            .map(|(name, flag)| (name.clone(), *flag))
            .collect();

        Self {
            credentials: config.credentials(),
            url: Some(config.url),
            methods,
            ..Self::default()
        }
    }

    /// Sets the endpoint URL.
    #[inline]
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets basic-auth credentials.
    #[inline]
    #[must_use]
    pub fn credentials(mut self, user: impl Into<String>, password: Option<&str>) -> Self {
        self.credentials = Some(Credentials::new(user, password.map(str::to_owned)));
        self
    }

    /// Registers a method for [`Client::call`].
    #[inline]
    #[must_use]
    pub fn method(mut self, name: impl Into<String>, is_notification: bool) -> Self {
        self.methods.push((name.into(), is_notification));
        self
    }

    /// Registers every method of a table.
    #[must_use]
    pub fn methods(mut self, table: &MethodTable) -> Self {
        self.methods
            .extend(table.iter().map(|(name, flag)| (name.clone(), *flag)));
        self
    }

    /// Uses `transport` instead of an HTTP transport.
    ///
    /// URL and credentials are not used when a transport is set.
    #[inline]
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Uses `ids` instead of the process-wide counter.
    #[inline]
    #[must_use]
    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Builds the client with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if neither a URL nor a transport is set
    /// - [`Error::Config`] if the URL is invalid
    /// - [`Error::InvalidMethod`] if a method name is empty
    pub fn build(self) -> Result<Client> {
        let methods = self.validate_methods()?;
        let transport = self.resolve_transport()?;
        let ids = self.ids.unwrap_or_else(|| Arc::new(GlobalIdGenerator));

        debug!(methods = methods.len(), "Client built");
        Ok(Client::new(transport, ids, methods))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ClientBuilder {
    /// Builds the method table.
    fn validate_methods(&self) -> Result<MethodTable> {
        let mut table = MethodTable::new();
        for (name, is_notification) in &self.methods {
            table.insert(name.clone(), *is_notification)?;
        }
        Ok(table)
    }

    /// Picks the explicit transport or builds the HTTP one.
    fn resolve_transport(&self) -> Result<Arc<dyn Transport>> {
        if let Some(transport) = &self.transport {
            return Ok(Arc::clone(transport));
        }

        let url = self.url.as_deref().ok_or_else(|| {
            Error::config(
                "Endpoint URL is required. Use .url() or .transport() to set it.\n\
                 Example: Client::builder().url(\"http://localhost:8080/rpc\")",
            )
        })?;

        let mut transport = HttpTransport::new(url)?;
        if let Some(credentials) = self.credentials.clone() {
            transport = transport.with_credentials(credentials);
        }

        Ok(Arc::new(transport))
    }
}

// ============================================================================
// Tests
// ============================================================================
