//! HTTP POST transport.
//!
//! Sends each payload as the body of a `POST` to one endpoint and maps the
//! reply onto a [`TransportResponse`]:
//!
//! | Reply | Status | Body |
//! |-------|--------|------|
//! | non-200 | the HTTP status | [`Body::Raw`] with the status text |
//! | 200, empty | 200 | [`Body::Empty`] |
//! | 200, JSON | 200 | [`Body::Json`] |
//! | 200, not JSON | 500 | [`Body::Raw`] with the reply text |
//! | no reply at all | 0 | [`Body::Raw`] with the error text |

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{Error, Result};

use super::{Body, STATUS_BAD_BODY, STATUS_OK, Transport, TransportResponse};

// ============================================================================
// Constants
// ============================================================================

/// Media type sent and accepted.
const JSON_MEDIA_TYPE: &str = "application/json";

/// User agent of the default HTTP client.
const USER_AGENT: &str = concat!("jsonrpc-batch-client/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Credentials
// ============================================================================

/// Basic-auth credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// User name.
    pub user: String,
    /// Password, if any.
    #[serde(default)]
    pub password: Option<String>,
}

impl Credentials {
    /// Creates credentials.
    #[inline]
    #[must_use]
    pub fn new(user: impl Into<String>, password: Option<String>) -> Self {
        Self {
            user: user.into(),
            password,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

// ============================================================================
// HttpTransport
// ============================================================================

/// Transport posting payloads to a JSON-RPC HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
    credentials: Option<Credentials>,
}

impl HttpTransport {
    /// Creates a transport for `endpoint`.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the URL does not parse or is not http(s)
    /// - [`Error::Config`] if the HTTP client cannot be built
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {e}")))?;

        Self::with_client(endpoint, client)
    }

    /// Creates a transport using a preconfigured client.
    ///
    /// Timeouts, proxies and TLS settings belong on the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL does not parse or is not http(s).
    pub fn with_client(endpoint: &str, client: Client) -> Result<Self> {
        let endpoint = parse_endpoint(endpoint)?;

        Ok(Self {
            client,
            endpoint,
            credentials: None,
        })
    }

    /// Sends basic-auth credentials with every request.
    #[inline]
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Returns the endpoint URL.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Maps a status and reply text onto a [`TransportResponse`].
    fn classify_reply(status: u16, text: String) -> TransportResponse {
        if text.is_empty() {
            return TransportResponse::empty();
        }

        match serde_json::from_str(&text) {
            Ok(value) => TransportResponse::new(status, Body::Json(value)),
            Err(e) => {
                warn!(error = %e, "Reply is not valid JSON");
                TransportResponse::new(STATUS_BAD_BODY, Body::Raw(text))
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, payload: String) -> TransportResponse {
        trace!(endpoint = %self.endpoint, bytes = payload.len(), "POST");

        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, JSON_MEDIA_TYPE)
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .body(payload);

        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.user, credentials.password.as_ref());
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "HTTP request failed");
                return TransportResponse::failure(0, e.to_string());
            }
        };

        let status = response.status();
        if status.as_u16() != STATUS_OK {
            debug!(status = status.as_u16(), "HTTP error status");
            let text = status.canonical_reason().unwrap_or_default();
            return TransportResponse::failure(status.as_u16(), text);
        }

        match response.text().await {
            Ok(text) => Self::classify_reply(status.as_u16(), text),
            Err(e) => {
                warn!(error = %e, "Failed to read reply body");
                TransportResponse::failure(STATUS_BAD_BODY, e.to_string())
            }
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Parses and validates an endpoint URL.
fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint)
        .map_err(|e| Error::config(format!("Invalid endpoint URL '{endpoint}': {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::config(format!(
            "Invalid scheme for HTTP transport: {}",
            url.scheme()
        )));
    }

    Ok(url)
}

// ============================================================================
// Tests
// ============================================================================
