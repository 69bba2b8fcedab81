pub mod config;
pub mod request;
pub mod response;

pub use config::ProbeConfig;
pub use request::{OpenParams, RequestId, RpcRequest, Transformation};
pub use response::{RpcError, RpcResponse};
