//! probe
//!
//! Sends one JSON-RPC request to a WebSocket endpoint and prints the reply.

use anyhow::Result;
use clap::Parser;
use rpcprobe_cli::{load_config, run, write_response, Args};
use std::process::ExitCode;

fn setup_logging(log_level: &str) -> Result<()> {
    // stdout is reserved for the reply
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_level)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(1);
        }
    };

    if let Err(e) = setup_logging(&config.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(&args, config).await {
        Ok(response) => {
            if let Err(e) = write_response(&mut std::io::stdout().lock(), &response) {
                eprintln!("Error: failed to write response: {}", e);
                return ExitCode::from(1);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!("Probe failed: {:?}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
