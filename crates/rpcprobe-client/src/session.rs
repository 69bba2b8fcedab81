//! One WebSocket connection, owned for exactly one exchange

use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::{ProbeError, Result};

/// Upper bound on the close handshake after a successful exchange
const CLOSE_GRACE: Duration = Duration::from_secs(1);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Dropping a session closes the socket without a close handshake.
pub(crate) struct Session {
    ws: WsStream,
}

impl Session {
    pub(crate) async fn connect(endpoint: &str) -> Result<Self> {
        let (ws, response) = connect_async(endpoint)
            .await
            .map_err(|e| ProbeError::Connection {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        tracing::debug!(status = %response.status(), "WebSocket handshake complete");
        Ok(Self { ws })
    }

    pub(crate) async fn send_text(&mut self, payload: &str) -> Result<()> {
        self.ws
            .send(Message::text(payload.to_owned()))
            .await
            .map_err(|e| ProbeError::Transport(format!("failed to send request: {}", e)))?;

        tracing::debug!(bytes = payload.len(), "Request sent");
        Ok(())
    }

    /// Wait for the next text frame, skipping control frames
    pub(crate) async fn recv_text(&mut self) -> Result<String> {
        while let Some(message) = self.ws.next().await {
            let message = message
                .map_err(|e| ProbeError::Transport(format!("connection lost: {}", e)))?;

            match message {
                Message::Text(text) => {
                    tracing::debug!(bytes = text.len(), "Response received");
                    return Ok(text.as_str().to_owned());
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
                Message::Binary(data) => {
                    return Err(ProbeError::Transport(format!(
                        "expected a text frame, got {} bytes of binary data",
                        data.len()
                    )));
                }
                Message::Close(frame) => {
                    let reason = frame
                        .map(|f| format!(" ({}: {})", f.code, f.reason))
                        .unwrap_or_default();
                    return Err(ProbeError::Transport(format!(
                        "server closed the connection before replying{}",
                        reason
                    )));
                }
            }
        }

        Err(ProbeError::Transport(
            "connection closed before a response arrived".to_string(),
        ))
    }

    /// Close handshake; failures are logged, the socket is released either way
    pub(crate) async fn close(mut self) {
        let handshake = async {
            self.ws.close(None).await?;
            while let Some(message) = self.ws.next().await {
                message?;
            }
            Ok::<_, tungstenite::Error>(())
        };

        match tokio::time::timeout(CLOSE_GRACE, handshake).await {
            Ok(Ok(())) => tracing::debug!("Connection closed"),
            Ok(Err(e)) => tracing::warn!("Close handshake failed: {}", e),
            Err(_) => tracing::warn!("Close handshake timed out, dropping connection"),
        }
    }
}
