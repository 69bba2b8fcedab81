//! rpcprobe core
//!
//! Request model, configuration and built-in fixtures shared by the probe
//! client, the mock server and the `probe` binary.

pub mod error;
pub mod fixtures;
pub mod models;
pub mod payload;
pub mod storage;

pub use error::{Error, Result};
pub use fixtures::Fixture;
pub use models::{
    OpenParams, ProbeConfig, RequestId, RpcError, RpcRequest, RpcResponse, Transformation,
};
