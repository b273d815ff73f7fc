// src/main.rs

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod client;
mod config;
mod error;
mod sys;

use crate::cli::Cli;
use crate::client::PassphraseClient;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::sys::acquire::RawStdin;
use crate::sys::assuan::AssuanConnection;

// Any reported error exits with 2, as does a usage error from clap.
const EXIT_FAILURE: u8 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // ==============================================================================
    // 1. Configuration & Environment
    // ==============================================================================

    let config = ClientConfig::load(Cli::parse());
    init_tracing(config.verbose);

    // ==============================================================================
    // 2. Single Request, No Retry
    // ==============================================================================

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

async fn run(config: ClientConfig) -> Result<(), ClientError> {
    let channel = AssuanConnection::connect(&config.socket_path)
        .await
        .map_err(ClientError::Connect)?;

    let mut client = PassphraseClient::new(config, Box::new(channel));
    client.run(&mut RawStdin).await
}

/// Logs go to stderr. `RUST_LOG` overrides the level picked from `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
