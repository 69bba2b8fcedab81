//! Probe configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "ws://localhost:6001";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProbeConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
    /// Reject payloads that are not JSON-RPC request objects before sending
    pub strict: bool,
    pub log_level: String,
}

impl ProbeConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_endpoint(&self.endpoint)?;

        const MAX_TIMEOUT: u64 = 3600;
        if self.timeout_seconds == 0 {
            return Err(Error::Validation(
                "Timeout must be greater than 0".to_string(),
            ));
        }
        if self.timeout_seconds > MAX_TIMEOUT {
            return Err(Error::Validation(format!(
                "Timeout too long (max {} seconds)",
                MAX_TIMEOUT
            )));
        }

        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(Error::Validation(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.log_level,
                valid_log_levels.join(", ")
            )));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            strict: false,
            log_level: "warn".to_string(),
        }
    }
}

/// Check that `endpoint` is a `ws://` or `wss://` URL with a host
pub fn validate_endpoint(endpoint: &str) -> Result<url::Url> {
    if endpoint.trim().is_empty() {
        return Err(Error::Validation("Endpoint cannot be empty".to_string()));
    }

    let url = url::Url::parse(endpoint)
        .map_err(|e| Error::Validation(format!("Invalid endpoint '{}': {}", endpoint, e)))?;

    if !matches!(url.scheme(), "ws" | "wss") {
        return Err(Error::Validation(format!(
            "Invalid endpoint scheme '{}': expected ws or wss",
            url.scheme()
        )));
    }

    if !url.host_str().is_some_and(|host| !host.is_empty()) {
        return Err(Error::Validation(format!(
            "Endpoint '{}' has no host",
            endpoint
        )));
    }

    Ok(url)
}
