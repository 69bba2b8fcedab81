use std::time::Duration;

/// Failure of a single probe exchange. Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Failed to connect to {endpoint}: {reason}")]
    Connection { endpoint: String, reason: String },

    #[error("No response from {endpoint} within {}s", .timeout.as_secs_f64())]
    Timeout { endpoint: String, timeout: Duration },

    #[error("Transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, ProbeError>;

impl From<rpcprobe_core::Error> for ProbeError {
    fn from(err: rpcprobe_core::Error) -> Self {
        match err {
            rpcprobe_core::Error::MalformedInput(msg) => ProbeError::MalformedInput(msg),
            other => ProbeError::MalformedInput(other.to_string()),
        }
    }
}
