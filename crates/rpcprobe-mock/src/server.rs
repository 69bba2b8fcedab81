use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use crate::dispatch::{dispatch, Handler};

#[derive(Debug, thiserror::Error)]
pub enum MockServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

pub type Result<T> = std::result::Result<T, MockServerError>;

/// What the server does with each text frame it receives
#[derive(Clone)]
pub enum Behavior {
    /// Answer with this exact text
    Reply(String),
    /// Send a ping first, then answer with this exact text
    PingThenReply(String),
    /// Answer with a binary frame holding these bytes
    ReplyBinary(Vec<u8>),
    /// Never answer; keep reading until the peer goes away
    Silent,
    /// Start a close handshake instead of answering
    CloseWithoutReply,
    /// Answer like a JSON-RPC server; binary frames are echoed
    Dispatch(Handler),
}

struct State {
    behavior: Behavior,
    accepted: AtomicUsize,
    active: AtomicUsize,
    received: Mutex<Vec<String>>,
}

/// Decrements the open-connection count when a connection task ends
struct ActiveGuard(Arc<State>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// WebSocket server on an ephemeral localhost port. Stops when dropped.
pub struct MockServer {
    addr: SocketAddr,
    state: Arc<State>,
    accept_loop: JoinHandle<()>,
}

impl MockServer {
    pub async fn start(behavior: Behavior) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tracing::info!("Mock server listening on {}", addr);

        let state = Arc::new(State {
            behavior,
            accepted: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        });

        let accept_loop = {
            let state = state.clone();
            tokio::spawn(async move {
                loop {
                    match listener.accept().await {
                        Ok((stream, peer)) => {
                            state.accepted.fetch_add(1, Ordering::SeqCst);
                            state.active.fetch_add(1, Ordering::SeqCst);
                            let guard = ActiveGuard(state.clone());
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, &guard.0).await {
                                    tracing::debug!("Connection {} ended with error: {}", peer, e);
                                }
                                drop(guard);
                            });
                        }
                        Err(e) => {
                            tracing::error!("Failed to accept connection: {}", e);
                        }
                    }
                }
            })
        };

        Ok(Self {
            addr,
            state,
            accept_loop,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn endpoint(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Connections accepted since start
    pub fn accepted(&self) -> usize {
        self.state.accepted.load(Ordering::SeqCst)
    }

    /// Connections currently open
    pub fn active(&self) -> usize {
        self.state.active.load(Ordering::SeqCst)
    }

    /// Text frames received so far, in arrival order
    pub async fn received(&self) -> Vec<String> {
        self.state.received.lock().await.clone()
    }

    /// Wait until no connection is open. Returns false if `timeout` passes first.
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.active() > 0 {
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        true
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.accept_loop.abort();
    }
}

async fn handle_connection(stream: TcpStream, state: &State) -> Result<()> {
    let mut ws = tokio_tungstenite::accept_async(stream).await?;
    tracing::debug!("New client connected");

    while let Some(message) = ws.next().await {
        match message? {
            Message::Text(text) => {
                tracing::debug!("Message received: {}", text.as_str());
                state.received.lock().await.push(text.as_str().to_owned());

                match &state.behavior {
                    Behavior::Reply(reply) => ws.send(Message::text(reply.clone())).await?,
                    Behavior::PingThenReply(reply) => {
                        ws.send(Message::Ping(vec![1u8, 2].into())).await?;
                        ws.send(Message::text(reply.clone())).await?;
                    }
                    Behavior::ReplyBinary(data) => ws.send(Message::binary(data.clone())).await?,
                    Behavior::Silent => {}
                    Behavior::CloseWithoutReply => ws.close(None).await?,
                    Behavior::Dispatch(handler) => {
                        if let Some(reply) = dispatch(handler, text.as_str()) {
                            ws.send(Message::text(reply)).await?;
                        }
                    }
                }
            }
            Message::Binary(data) => {
                if let Behavior::Dispatch(_) = state.behavior {
                    ws.send(Message::Binary(data)).await?;
                }
            }
            // Close replies are queued by tungstenite and flushed by the next read
            Message::Close(_) | Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
        }
    }

    tracing::debug!("Client disconnected");
    Ok(())
}
