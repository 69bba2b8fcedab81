//! Request handling modelled on the viewer's JSON-RPC plugin

use rpcprobe_core::{RpcError, RpcResponse};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Executes one method call: `(method, params)` to a result or an error object
pub type Handler = Arc<dyn Fn(&str, &Map<String, Value>) -> Result<Value, RpcError> + Send + Sync>;

/// Build the reply text for one incoming text frame.
///
/// Returns `None` when no reply is due: requests without an `id` are
/// notifications, and that includes text that is not a JSON object at all.
pub fn dispatch(handler: &Handler, message: &str) -> Option<String> {
    let obj = match serde_json::from_str::<Value>(message) {
        Ok(Value::Object(obj)) => obj,
        _ => Map::new(),
    };

    let method = obj.get("method").and_then(Value::as_str).unwrap_or_default();
    let version = obj.get("jsonrpc").and_then(Value::as_str).unwrap_or_default();
    let params = match obj.get("params") {
        Some(Value::Object(params)) => params.clone(),
        _ => Map::new(),
    };

    let result = if !method.is_empty() && !version.is_empty() {
        tracing::debug!("method: {}, params: {:?}", method, params);
        handler(method, &params)
    } else {
        Err(RpcError::invalid_request("Invalid Request"))
    };

    // Echoed as sent, whatever its type
    let id = obj.get("id")?.clone();

    let response = match result {
        Ok(value) => RpcResponse::success(value, id),
        Err(error) => RpcResponse::error(error, id),
    };

    match serde_json::to_string(&response) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::error!("Failed to serialize response: {}", e);
            None
        }
    }
}

/// Stand-in for the viewer plugin's `clear` and `open` methods.
///
/// `open` succeeds when `filename` names an existing file and otherwise fails
/// the way the plugin reports an aborted load.
pub fn viewer_plugin() -> Handler {
    Arc::new(|method: &str, params: &Map<String, Value>| match method {
        "clear" => Ok(json!(0)),
        "open" => {
            let filename = params.get("filename").and_then(Value::as_str).unwrap_or_default();
            if !filename.is_empty() && std::path::Path::new(filename).is_file() {
                Ok(json!(0))
            } else {
                Err(RpcError::application_error(1, "cancelled by user"))
            }
        }
        other => {
            tracing::debug!("Unknown method: {}", other);
            Err(RpcError::method_not_found())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(message: &str) -> Option<Value> {
        dispatch(&viewer_plugin(), message).map(|text| serde_json::from_str(&text).unwrap())
    }

    #[test]
    fn test_clear_succeeds() {
        let resp = reply(r#"{"jsonrpc":"2.0","method":"clear","id":5}"#).unwrap();
        assert_eq!(resp, json!({"jsonrpc": "2.0", "result": 0, "id": 5}));
    }

    #[test]
    fn test_open_missing_file_is_cancelled() {
        let resp = reply(
            r#"{"jsonrpc":"2.0","method":"open","params":{"filename":"/nonexistent/x.ply"},"id":4}"#,
        )
        .unwrap();
        assert_eq!(resp["error"]["code"], 1);
        assert_eq!(resp["error"]["message"], "cancelled by user");
        assert_eq!(resp["id"], 4);
    }

    #[test]
    fn test_unknown_method() {
        let resp = reply(r#"{"jsonrpc":"2.0","method":"rotate","id":"a"}"#).unwrap();
        assert_eq!(resp["error"]["code"], -32601);
        assert_eq!(resp["error"]["message"], "Method not found");
        assert_eq!(resp["id"], "a");
    }

    #[test]
    fn test_id_is_echoed_verbatim() {
        let resp = reply(r#"{"jsonrpc":"2.0","method":"clear","id":1.5}"#).unwrap();
        assert_eq!(resp["id"], json!(1.5));

        let resp = reply(r#"{"jsonrpc":"2.0","method":"clear","id":{"seq":[1,2]}}"#).unwrap();
        assert_eq!(resp["id"], json!({"seq": [1, 2]}));

        let text = dispatch(&viewer_plugin(), r#"{"jsonrpc":"2.0","method":"clear","id":null}"#)
            .unwrap();
        assert!(text.contains(r#""id":null"#));
    }

    #[test]
    fn test_missing_version_is_invalid_request() {
        let resp = reply(r#"{"method":"clear","id":7}"#).unwrap();
        assert_eq!(resp["error"]["code"], -32600);
        assert_eq!(resp["error"]["message"], "Invalid Request");
    }

    #[test]
    fn test_notifications_get_no_reply() {
        assert!(reply(r#"{"jsonrpc":"2.0","method":"clear"}"#).is_none());
        assert!(reply("definitely not json").is_none());
    }
}
