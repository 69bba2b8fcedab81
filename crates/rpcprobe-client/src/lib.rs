//! rpcprobe client library
//!
//! Performs single-shot JSON-RPC 2.0 exchanges over WebSocket: connect, send
//! one text frame, wait for one text frame, close. Replies are returned as
//! the raw text the server sent.

pub mod error;
mod session;

pub use error::{ProbeError, Result};

use rpcprobe_core::models::config::validate_endpoint;
use rpcprobe_core::{payload, Fixture, OpenParams, ProbeConfig, RequestId, RpcRequest};
use session::Session;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Send `request_payload` to `endpoint_uri` and return the reply text unchanged.
///
/// `timeout` bounds connection establishment and, separately, the wait for
/// the reply. A peer that accepts the socket but stalls either phase past the
/// deadline is a `Timeout`; refused, unresolvable or rejected handshakes are
/// `Connection` errors. The connection is released before this returns, on
/// every path.
pub async fn send_request(
    endpoint_uri: &str,
    request_payload: &str,
    timeout: Duration,
) -> Result<String> {
    validate_endpoint(endpoint_uri).map_err(|e| ProbeError::InvalidEndpoint(e.to_string()))?;

    tracing::debug!("Connecting to {}", endpoint_uri);
    let mut session = match tokio::time::timeout(timeout, Session::connect(endpoint_uri)).await {
        Ok(session) => session?,
        Err(_) => {
            tracing::debug!("Handshake not completed within {:?}", timeout);
            return Err(ProbeError::Timeout {
                endpoint: endpoint_uri.to_string(),
                timeout,
            });
        }
    };

    let exchange = async {
        session.send_text(request_payload).await?;
        session.recv_text().await
    };

    let outcome = tokio::time::timeout(timeout, exchange).await;

    match outcome {
        Ok(Ok(response)) => {
            session.close().await;
            Ok(response)
        }
        Ok(Err(e)) => {
            tracing::debug!("Exchange failed, dropping connection: {}", e);
            drop(session);
            Err(e)
        }
        Err(_) => {
            tracing::debug!("No response within {:?}, dropping connection", timeout);
            drop(session);
            Err(ProbeError::Timeout {
                endpoint: endpoint_uri.to_string(),
                timeout,
            })
        }
    }
}

/// Probe client bound to one endpoint configuration
pub struct ProbeClient {
    config: ProbeConfig,
    timeout: Duration,
    request_counter: AtomicI64,
}

impl ProbeClient {
    pub fn new(config: ProbeConfig) -> Self {
        let timeout = config.timeout();
        Self {
            config,
            timeout,
            request_counter: AtomicI64::new(1),
        }
    }

    /// Override the reply deadline taken from the config
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send a request payload as-is.
    /// In strict mode the payload must be a JSON-RPC request object.
    pub async fn send(&self, request_payload: &str) -> Result<String> {
        if self.config.strict {
            payload::validate_request(request_payload)?;
        }
        send_request(&self.config.endpoint, request_payload, self.timeout).await
    }

    /// Send raw bytes; they must be UTF-8
    pub async fn send_bytes(&self, request_payload: Vec<u8>) -> Result<String> {
        let text = payload::decode_payload(request_payload)?;
        self.send(&text).await
    }

    pub async fn call(&self, request: &RpcRequest) -> Result<String> {
        let text = request.to_payload()?;
        send_request(&self.config.endpoint, &text, self.timeout).await
    }

    pub async fn fixture(&self, fixture: Fixture) -> Result<String> {
        self.call(&fixture.request()?).await
    }

    // Viewer plugin methods

    /// Remove everything from the scene
    pub async fn clear(&self, id: Option<RequestId>) -> Result<String> {
        let id = id.unwrap_or_else(|| self.next_id());
        self.call(&RpcRequest::clear(id)).await
    }

    /// Load a file with the server's default options
    pub async fn open(&self, filename: &str, id: Option<RequestId>) -> Result<String> {
        self.open_with(&OpenParams::new(filename), id).await
    }

    pub async fn open_with(&self, params: &OpenParams, id: Option<RequestId>) -> Result<String> {
        let id = id.unwrap_or_else(|| self.next_id());
        self.call(&RpcRequest::open(params, id)?).await
    }

    fn next_id(&self) -> RequestId {
        RequestId::Number(self.request_counter.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for ProbeClient {
    fn default() -> Self {
        Self::new(ProbeConfig::default())
    }
}
