//! Client implementation.
//!
//! The [`Client`] ties together a transport, an id source and a method
//! table. It builds requests and batches and executes them.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::batch::{Batch, BatchOutcome};
use crate::error::{Error, Result};
use crate::identifiers::IdGenerator;
use crate::lifecycle::Delivery;
use crate::protocol::Request;
use crate::transport::Transport;

use super::builder::ClientBuilder;
use super::config::ClientConfig;
use super::methods::{MethodFactory, MethodTable};

// ============================================================================
// Client
// ============================================================================

/// JSON-RPC 2.0 client.
///
/// Cheap to clone; clones share the transport and id source.
///
/// # Example
///
/// ```ignore
/// let client = Client::builder().url("http://localhost:8080/rpc").build()?;
///
/// let request = client
///     .request("math.add", Some(json!([1, 2])))?
///     .on_success(|sum| println!("sum = {sum}"));
/// client.execute(request).await?;
/// ```
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    ids: Arc<dyn IdGenerator>,
    methods: MethodTable,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Client - Constructors
// ============================================================================

impl Client {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        ids: Arc<dyn IdGenerator>,
        methods: MethodTable,
    ) -> Self {
        Self {
            transport,
            ids,
            methods,
        }
    }

    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates an HTTP client from a [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// See [`ClientBuilder::build`].
    #[inline]
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        ClientBuilder::from_config(config).build()
    }
}

// ============================================================================
// Client - Request Factories
// ============================================================================

impl Client {
    /// Builds a call to `method`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidMethod`] if `method` is empty
    /// - [`Error::InvalidParams`] if `params` is neither array nor object
    #[inline]
    pub fn request(&self, method: impl Into<String>, params: Option<Value>) -> Result<Request> {
        Request::build(method, params, false, self.ids.as_ref())
    }

    /// Builds a notification to `method`.
    ///
    /// # Errors
    ///
    /// Same as [`Client::request`].
    #[inline]
    pub fn notify(&self, method: impl Into<String>, params: Option<Value>) -> Result<Request> {
        Request::build(method, params, true, self.ids.as_ref())
    }

    /// Returns the factory for a method of the table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownMethod`] if `name` is not in the table.
    pub fn method(&self, name: &str) -> Result<MethodFactory> {
        let is_notification = self
            .methods
            .get(name)
            .ok_or_else(|| Error::unknown_method(name))?;

        Ok(MethodFactory::new(
            name,
            is_notification,
            Arc::clone(&self.ids),
        ))
    }

    /// Builds a request for a method of the table.
    ///
    /// Whether it is a call or a notification follows the table entry.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownMethod`] if `name` is not in the table
    /// - [`Error::InvalidParams`] if `params` is neither array nor object
    pub fn call(&self, name: &str, params: Option<Value>) -> Result<Request> {
        self.method(name)?.create(params)
    }

    /// Creates an empty batch.
    #[inline]
    #[must_use]
    pub fn batch(&self) -> Batch {
        Batch::new()
    }
}

// ============================================================================
// Client - Execution
// ============================================================================

impl Client {
    /// Sends a single request and delivers its reply.
    ///
    /// # Errors
    ///
    /// See [`Request::execute`].
    #[inline]
    pub async fn execute(&self, request: Request) -> Result<Delivery> {
        request.execute(self.transport.as_ref()).await
    }

    /// Sends a batch and delivers its replies.
    ///
    /// # Errors
    ///
    /// See [`Batch::execute`].
    #[inline]
    pub async fn execute_batch(&self, batch: Batch) -> Result<BatchOutcome> {
        batch.execute(self.transport.as_ref()).await
    }
}

// ============================================================================
// Client - Accessors
// ============================================================================

impl Client {
    /// Returns the method table.
    #[inline]
    #[must_use]
    pub fn methods(&self) -> &MethodTable {
        &self.methods
    }

    /// Returns the transport.
    #[inline]
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, Ordering};

    use serde_json::json;

    use crate::identifiers::{RequestId, SequenceIdGenerator};
    use crate::transport::{ScriptedTransport, TransportResponse};

    fn client_with(transport: Arc<ScriptedTransport>) -> Client {
        Client::builder()
            .transport(transport)
            .id_generator(Arc::new(SequenceIdGenerator::starting_at(1)))
            .method("math.add", false)
            .method("log.write", true)
            .build()
            .expect("build")
    }

    #[test]
    fn test_call_follows_table() {
        let client = client_with(Arc::new(ScriptedTransport::new()));

        let call = client.call("math.add", Some(json!([1, 2]))).expect("call");
        let notification = client.call("log.write", Some(json!(["x"]))).expect("call");

        assert_eq!(call.id(), Some(RequestId::new(1)));
        assert!(notification.is_notification());
    }

    #[test]
    fn test_unknown_method() {
        let client = client_with(Arc::new(ScriptedTransport::new()));
        assert!(matches!(
            client.call("nope", None),
            Err(Error::UnknownMethod { .. })
        ));
    }

    #[test]
    fn test_request_and_notify() {
        let client = client_with(Arc::new(ScriptedTransport::new()));
        assert!(!client.request("anything", None).expect("request").is_notification());
        assert!(client.notify("anything", None).expect("notify").is_notification());
    }

    #[test]
    fn test_clones_share_id_source() {
        let client = client_with(Arc::new(ScriptedTransport::new()));
        let clone = client.clone();

        let first = client.request("a", None).expect("request");
        let second = clone.request("b", None).expect("request");
        assert_eq!(first.id(), Some(RequestId::new(1)));
        assert_eq!(second.id(), Some(RequestId::new(2)));
    }

    #[tokio::test]
    async fn test_execute() {
        let transport = Arc::new(ScriptedTransport::replying(TransportResponse::json(json!({
            "jsonrpc": "2.0", "result": 3, "id": 1
        }))));
        let client = client_with(Arc::clone(&transport));
        let succeeded = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&succeeded);

        let request = client
            .call("math.add", Some(json!([1, 2])))
            .expect("call")
            .on_success(move |result| {
                assert_eq!(result, json!(3));
                flag.store(true, Ordering::SeqCst);
            });

        let delivery = client.execute(request).await.expect("execute");
        assert_eq!(delivery, Delivery::Success);
        assert!(succeeded.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_execute_batch() {
        let transport = Arc::new(ScriptedTransport::replying(TransportResponse::json(json!([
            {"jsonrpc": "2.0", "result": 3, "id": 1}
        ]))));
        let client = client_with(Arc::clone(&transport));

        let mut batch = client.batch();
        batch
            .add(client.call("math.add", Some(json!([1, 2]))).expect("call"))
            .expect("add")
            .add(client.call("log.write", None).expect("call"))
            .expect("add");

        let outcome = client.execute_batch(batch).await.expect("execute");
        assert_eq!(outcome, BatchOutcome::Delivered { code: None, count: 1 });
        assert_eq!(transport.sent_json()[0].as_array().map(Vec::len), Some(2));
    }
}
