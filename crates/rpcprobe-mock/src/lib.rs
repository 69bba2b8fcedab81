//! Mock JSON-RPC WebSocket server
//!
//! A scriptable stand-in for the viewer's plugin server, used to exercise the
//! probe client and the `probe` binary in tests.

pub mod dispatch;
pub mod server;

pub use dispatch::{dispatch, viewer_plugin, Handler};
pub use server::{Behavior, MockServer, MockServerError};
