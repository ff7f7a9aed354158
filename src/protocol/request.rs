//! Request envelope type.
//!
//! A [`Request`] describes one JSON-RPC call or notification and owns the
//! three callbacks that receive its outcome.
//!
//! # Format
//!
//! ```json
//! {
//!   "jsonrpc": "2.0",
//!   "method": "math.add",
//!   "params": [1, 2],
//!   "id": 7
//! }
//! ```
//!
//! `params` is omitted when none were supplied; `id` is omitted for
//! notifications.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{Error, Result};
use crate::identifiers::{GlobalIdGenerator, IdGenerator, RequestId};

use super::ClassifiedError;

// ============================================================================
// Constants
// ============================================================================

/// Protocol version written into every envelope.
pub const PROTOCOL_VERSION: &str = "2.0";

// ============================================================================
// Types
// ============================================================================

/// Callback receiving the `result` member of a successful reply.
pub type SuccessHandler = Box<dyn FnMut(Value) + Send>;

/// Callback receiving the error of a failed call.
pub type ExceptionHandler = Box<dyn FnMut(ClassifiedError) + Send>;

/// Callback fired after either of the above.
pub type CompleteHandler = Box<dyn FnMut() + Send>;

// ============================================================================
// Params
// ============================================================================

/// Call parameters: positional or named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Params {
    /// Positional parameters.
    Array(Vec<Value>),
    /// Named parameters.
    Object(Map<String, Value>),
}

impl Params {
    /// Validates a JSON value as call parameters for `method`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] for anything but an array or object.
    pub fn from_value(method: &str, value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => Ok(Self::Array(items)),
            Value::Object(members) => Ok(Self::Object(members)),
            other => Err(Error::invalid_params(method, &other)),
        }
    }
}

impl From<Params> for Value {
    fn from(params: Params) -> Self {
        match params {
            Params::Array(items) => Value::Array(items),
            Params::Object(members) => Value::Object(members),
        }
    }
}

// ============================================================================
// RequestBody
// ============================================================================

/// The wire form of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Protocol version, always `"2.0"`.
    pub jsonrpc: String,

    /// Method name.
    pub method: String,

    /// Parameters, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,

    /// Correlation id; absent for notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
}

// ============================================================================
// Request
// ============================================================================

/// One JSON-RPC call description plus its callbacks.
///
/// Callbacks default to no-ops, so callers attach only the ones they need.
/// Notifications never receive a reply and therefore never run a callback;
/// attaching one to a notification is silently ignored.
///
/// # Example
///
/// ```ignore
/// let request = Request::call("math.add", Some(json!([1, 2])))?
///     .on_success(|result| println!("sum = {result}"))
///     .on_exception(|error| eprintln!("failed: {}", error.code));
/// ```
pub struct Request {
    body: RequestBody,
    success: SuccessHandler,
    exception: ExceptionHandler,
    complete: CompleteHandler,
}

// ============================================================================
// Request - Constructors
// ============================================================================

impl Request {
    /// Creates a request whose id comes from `ids`.
    ///
    /// The id is drawn only after the params have been validated and only
    /// when `is_notification` is `false`, so rejected input and
    /// notifications never consume an id.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidMethod`] if `method` is empty
    /// - [`Error::InvalidParams`] if `params` is neither array nor object
    pub fn build(
        method: impl Into<String>,
        params: Option<Value>,
        is_notification: bool,
        ids: &dyn IdGenerator,
    ) -> Result<Self> {
        let method = method.into();
        if method.is_empty() {
            return Err(Error::invalid_method("method name must not be empty"));
        }

        let params = params
            .map(|value| Params::from_value(&method, value))
            .transpose()?;

        let id = (!is_notification).then(|| ids.next_id());

        Ok(Self {
            body: RequestBody {
                jsonrpc: PROTOCOL_VERSION.to_string(),
                method,
                params,
                id,
            },
            success: Box::new(|_| {}),
            exception: Box::new(|_| {}),
            complete: Box::new(|| {}),
        })
    }

    /// Creates a call with an id from the process-wide counter.
    ///
    /// # Errors
    ///
    /// See [`Request::build`].
    #[inline]
    pub fn call(method: impl Into<String>, params: Option<Value>) -> Result<Self> {
        Self::build(method, params, false, &GlobalIdGenerator)
    }

    /// Creates a notification (no id, no reply expected).
    ///
    /// # Errors
    ///
    /// See [`Request::build`].
    #[inline]
    pub fn notification(method: impl Into<String>, params: Option<Value>) -> Result<Self> {
        Self::build(method, params, true, &GlobalIdGenerator)
    }
}

// ============================================================================
// Request - Callbacks
// ============================================================================

impl Request {
    /// Sets the callback receiving the reply's `result`.
    #[must_use]
    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: FnMut(Value) + Send + 'static,
    {
        if self.is_notification() {
            trace!(method = %self.body.method, "Ignoring success handler on notification");
        } else {
            self.success = Box::new(callback);
        }
        self
    }

    /// Sets the callback receiving the error of a failed call.
    #[must_use]
    pub fn on_exception<F>(mut self, callback: F) -> Self
    where
        F: FnMut(ClassifiedError) + Send + 'static,
    {
        if self.is_notification() {
            trace!(method = %self.body.method, "Ignoring exception handler on notification");
        } else {
            self.exception = Box::new(callback);
        }
        self
    }

    /// Sets the callback fired once a reply was delivered, success or not.
    #[must_use]
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        if self.is_notification() {
            trace!(method = %self.body.method, "Ignoring complete handler on notification");
        } else {
            self.complete = Box::new(callback);
        }
        self
    }

    pub(crate) fn fire_success(&mut self, result: Value) {
        (self.success)(result);
    }

    pub(crate) fn fire_exception(&mut self, error: ClassifiedError) {
        (self.exception)(error);
    }

    pub(crate) fn fire_complete(&mut self) {
        (self.complete)();
    }
}

// ============================================================================
// Request - Accessors
// ============================================================================

impl Request {
    /// Returns the correlation id, or `None` for notifications.
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<RequestId> {
        self.body.id
    }

    /// Returns the method name.
    #[inline]
    #[must_use]
    pub fn method(&self) -> &str {
        &self.body.method
    }

    /// Returns the parameters, if any.
    #[inline]
    #[must_use]
    pub fn params(&self) -> Option<&Params> {
        self.body.params.as_ref()
    }

    /// Returns `true` if this request expects no reply.
    #[inline]
    #[must_use]
    pub fn is_notification(&self) -> bool {
        self.body.id.is_none()
    }

    /// Returns the wire body.
    #[inline]
    #[must_use]
    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Returns the wire body as a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(&self.body)?)
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
