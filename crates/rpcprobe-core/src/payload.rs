//! Request payload loading
//!
//! A payload is given either inline or as a path to a file holding it. It is
//! sent verbatim; the only hard requirement is that it is UTF-8 text.

use crate::{models::request::JSONRPC_VERSION, Error, Result};
use serde_json::Value;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadSource {
    Inline(OsString),
    File(PathBuf),
}

impl PayloadSource {
    /// Classify a command-line argument. JSON text is never looked up on disk.
    pub fn from_arg(arg: impl AsRef<OsStr>) -> Self {
        let arg = arg.as_ref();
        let looks_like_json = arg
            .to_str()
            .map(|s| s.trim_start().starts_with(['{', '[']))
            .unwrap_or(false);

        if !looks_like_json && Path::new(arg).is_file() {
            PayloadSource::File(PathBuf::from(arg))
        } else {
            PayloadSource::Inline(arg.to_os_string())
        }
    }

    pub fn load(&self) -> Result<String> {
        match self {
            PayloadSource::Inline(text) => text.clone().into_string().map_err(|_| {
                Error::MalformedInput("request payload is not valid UTF-8".to_string())
            }),
            PayloadSource::File(path) => decode_payload(std::fs::read(path)?),
        }
    }
}

pub fn decode_payload(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| {
        Error::MalformedInput(format!(
            "request payload is not valid UTF-8 (invalid byte at offset {})",
            e.utf8_error().valid_up_to()
        ))
    })
}

/// Strict-mode check: the text must be a JSON-RPC 2.0 request object
pub fn validate_request(text: &str) -> Result<()> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| Error::MalformedInput(format!("request payload is not valid JSON: {}", e)))?;

    let obj = value
        .as_object()
        .ok_or_else(|| Error::MalformedInput("request payload must be a JSON object".to_string()))?;

    if obj.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
        return Err(Error::MalformedInput(
            "request payload must carry \"jsonrpc\": \"2.0\"".to_string(),
        ));
    }

    match obj.get("method").and_then(Value::as_str) {
        Some(method) if !method.is_empty() => Ok(()),
        _ => Err(Error::MalformedInput(
            "request payload must name a \"method\"".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_inline_json_is_not_a_path() {
        let source = PayloadSource::from_arg(r#"{"jsonrpc":"2.0","method":"clear","id":5}"#);
        assert!(matches!(source, PayloadSource::Inline(_)));
        assert_eq!(
            source.load().unwrap(),
            r#"{"jsonrpc":"2.0","method":"clear","id":5}"#
        );
    }

    #[test]
    fn test_file_payload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("clear.json");
        std::fs::write(&path, "{\"jsonrpc\":\"2.0\",\"method\":\"clear\",\"id\":5}\n").unwrap();

        let source = PayloadSource::from_arg(&path);
        assert_eq!(source, PayloadSource::File(path));
        // File contents are sent as-is, trailing newline included
        assert!(source.load().unwrap().ends_with("}\n"));
    }

    #[test]
    fn test_invalid_utf8_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        std::fs::write(&path, [b'{', 0xff, 0xfe, b'}']).unwrap();

        let err = PayloadSource::from_arg(&path).load().unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_invalid_utf8_arg() {
        use std::os::unix::ffi::OsStringExt;

        let arg = OsString::from_vec(vec![b'{', 0x80, b'}']);
        let err = PayloadSource::from_arg(&arg).load().unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn test_validate_request() {
        assert!(validate_request(r#"{"jsonrpc":"2.0","method":"clear","id":5}"#).is_ok());
        assert!(validate_request(r#"{"jsonrpc":"2.0","method":"clear"}"#).is_ok());
        assert!(validate_request(r#"{"jsonrpc":"1.0","method":"clear","id":5}"#).is_err());
        assert!(validate_request(r#"{"jsonrpc":"2.0","id":5}"#).is_err());
        assert!(validate_request(r#"[1, 2]"#).is_err());
        assert!(validate_request(r#"{"jsonrpc": "2.0", "method": "open""#).is_err());
    }
}
