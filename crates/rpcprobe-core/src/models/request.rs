//! JSON-RPC 2.0 request model

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    pub id: RequestId,
}

/// Request ID (number or string)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

impl From<i64> for RequestId {
    fn from(id: i64) -> Self {
        RequestId::Number(id)
    }
}

impl From<i32> for RequestId {
    fn from(id: i32) -> Self {
        RequestId::Number(id.into())
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        RequestId::String(id.to_string())
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        RequestId::String(id)
    }
}

impl From<RequestId> for Value {
    fn from(id: RequestId) -> Self {
        match id {
            RequestId::Number(n) => Value::from(n),
            RequestId::String(s) => Value::String(s),
        }
    }
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Option<Value>, id: impl Into<RequestId>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id: id.into(),
        }
    }

    /// `clear` takes no params
    pub fn clear(id: impl Into<RequestId>) -> Self {
        Self::new("clear", None, id)
    }

    pub fn open(params: &OpenParams, id: impl Into<RequestId>) -> Result<Self> {
        let params = serde_json::to_value(params)?;
        Ok(Self::new("open", Some(params), id))
    }

    /// Serialize into the text sent as a single WebSocket frame
    pub fn to_payload(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Parameters of the `open` method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenParams {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub silent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation: Option<Transformation>,
}

impl OpenParams {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            filter: None,
            silent: None,
            transformation: None,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = Some(silent);
        self
    }

    pub fn with_transformation(mut self, transformation: Transformation) -> Self {
        self.transformation = Some(transformation);
        self
    }
}

/// 4x4 transformation matrix, stored and sent row-major as 16 numbers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transformation([f64; 16]);

impl Transformation {
    pub const LEN: usize = 16;

    pub fn identity() -> Self {
        Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        let mut values = [0.0; 16];
        for (r, row) in rows.iter().enumerate() {
            values[r * 4..r * 4 + 4].copy_from_slice(row);
        }
        Self(values)
    }

    /// Element at `row`, `col`; `None` outside 0..4
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < 4 && col < 4 {
            Some(self.0[row * 4 + col])
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for Transformation {
    type Error = Error;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        let values: [f64; 16] = values.try_into().map_err(|v: Vec<f64>| {
            Error::Validation(format!(
                "Transformation needs {} values, got {}",
                Self::LEN,
                v.len()
            ))
        })?;
        Ok(Self(values))
    }
}
