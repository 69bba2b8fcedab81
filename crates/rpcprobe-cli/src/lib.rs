//! `probe` command-line front end
//!
//! Exposed as a library so argument handling and exit codes can be tested
//! without spawning the binary.

use anyhow::Context;
use clap::Parser;
use rpcprobe_client::{ProbeClient, ProbeError};
use rpcprobe_core::models::config::validate_endpoint;
use rpcprobe_core::payload::PayloadSource;
use rpcprobe_core::storage::{get_config_dir, ConfigStorage};
use rpcprobe_core::{Fixture, ProbeConfig};
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "probe")]
#[command(about = "Send one JSON-RPC request over WebSocket and print the reply", long_about = None)]
pub struct Args {
    /// WebSocket endpoint, e.g. ws://localhost:6001.
    /// With a single positional argument it is taken as the request instead,
    /// unless it is a ws:// or wss:// URL.
    pub endpoint: Option<String>,

    /// Request JSON text, or a path to a file containing it
    pub request: Option<OsString>,

    /// Send a built-in request: clear, open or open-matrix
    #[arg(short, long)]
    pub fixture: Option<Fixture>,

    /// Seconds to wait for the reply
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Reject requests that are not JSON-RPC 2.0 objects before connecting
    #[arg(long)]
    pub strict: bool,

    /// Config file (defaults to <config dir>/rpcprobe/config.json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level
    #[arg(short, long)]
    pub log_level: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("{0:#}")]
    Config(anyhow::Error),

    #[error("{0}")]
    Input(#[from] rpcprobe_core::Error),

    #[error("{0}")]
    Probe(#[from] ProbeError),
}

impl CliError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Usage(_) | CliError::Config(_) => 1,
            CliError::Input(rpcprobe_core::Error::MalformedInput(_)) => 5,
            CliError::Input(_) => 1,
            CliError::Probe(e) => match e {
                ProbeError::Connection { .. } => 2,
                ProbeError::Timeout { .. } => 3,
                ProbeError::Transport(_) => 4,
                ProbeError::MalformedInput(_) => 5,
                ProbeError::InvalidEndpoint(_) => 1,
            },
        }
    }
}

/// What to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestSource {
    Payload(PayloadSource),
    Fixture(Fixture),
}

/// Config file values with command-line overrides applied
pub fn load_config(args: &Args) -> anyhow::Result<ProbeConfig> {
    let mut config = match &args.config {
        Some(path) => ConfigStorage::load_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => match get_config_dir() {
            Some(dir) => {
                let storage = ConfigStorage::new(dir);
                storage.load().with_context(|| {
                    format!("Failed to load config from {}", storage.config_path().display())
                })?
            }
            None => ProbeConfig::default(),
        },
    };

    if let Some(timeout) = args.timeout {
        config.timeout_seconds = timeout;
    }
    if args.strict {
        config.strict = true;
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }

    Ok(config)
}

/// Work out the endpoint and request from the positional arguments
pub fn resolve_target(
    args: &Args,
    config: &ProbeConfig,
) -> Result<(String, RequestSource), CliError> {
    match (&args.endpoint, &args.request, args.fixture) {
        (_, Some(_), Some(_)) => Err(CliError::Usage(
            "a request and --fixture cannot be used together".to_string(),
        )),
        (Some(endpoint), Some(request), None) => Ok((
            endpoint.clone(),
            RequestSource::Payload(PayloadSource::from_arg(request)),
        )),
        (None, Some(request), None) => Ok((
            config.endpoint.clone(),
            RequestSource::Payload(PayloadSource::from_arg(request)),
        )),
        (Some(endpoint), None, None) if validate_endpoint(endpoint).is_ok() => {
            Err(CliError::Usage(format!(
                "missing REQUEST after endpoint {}; pass REQUEST or --fixture",
                endpoint
            )))
        }
        (Some(request), None, None) => Ok((
            config.endpoint.clone(),
            RequestSource::Payload(PayloadSource::from_arg(request)),
        )),
        (endpoint, None, Some(fixture)) => Ok((
            endpoint.clone().unwrap_or_else(|| config.endpoint.clone()),
            RequestSource::Fixture(fixture),
        )),
        (None, None, None) => Err(CliError::Usage(
            "no request given; pass REQUEST or --fixture".to_string(),
        )),
    }
}

/// Perform the exchange and return the reply text
pub async fn run(args: &Args, mut config: ProbeConfig) -> Result<String, CliError> {
    let (endpoint, source) = resolve_target(args, &config)?;
    config.endpoint = endpoint;
    config
        .validate()
        .map_err(|e| CliError::Config(anyhow::Error::new(e).context("Invalid configuration")))?;

    tracing::info!("Probing {} (timeout {}s)", config.endpoint, config.timeout_seconds);

    let client = ProbeClient::new(config);
    let response = match source {
        RequestSource::Payload(payload) => {
            let text = payload.load()?;
            client.send(&text).await?
        }
        RequestSource::Fixture(fixture) => {
            tracing::debug!("Sending fixture {}", fixture);
            client.fixture(fixture).await?
        }
    };

    Ok(response)
}

/// Write the reply unchanged, terminated by a newline if it lacks one
pub fn write_response(out: &mut impl Write, response: &str) -> std::io::Result<()> {
    out.write_all(response.as_bytes())?;
    if !response.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    out.flush()
}
