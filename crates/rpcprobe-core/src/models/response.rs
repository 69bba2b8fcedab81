//! JSON-RPC 2.0 response model
//!
//! The probe client hands replies back as raw text; these types are for the
//! mock server and for callers that want to inspect a reply themselves.

use super::request::JSONRPC_VERSION;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    /// Echo of the request's `id`, whatever JSON value it was
    #[serde(default)]
    pub id: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::application_error(-32700, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::application_error(-32600, message)
    }

    pub fn method_not_found() -> Self {
        Self::application_error(-32601, "Method not found")
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::application_error(-32602, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::application_error(-32603, message)
    }

    pub fn application_error(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

impl RpcResponse {
    pub fn success(result: Value, id: impl Into<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id: id.into(),
        }
    }

    pub fn error(error: RpcError, id: impl Into<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(error),
            id: id.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
