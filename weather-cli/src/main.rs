//! Binary crate for the `weather-alerts` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive ZIP code entry
//! - Logging setup and handing off to the core poll loop

use clap::{Parser, error::ErrorKind};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cmd = match cli::Cli::try_parse() {
        Ok(cmd) => cmd,
        Err(err) => {
            // Help and usage errors both exit with 1; only --version is a clean exit.
            let code = if err.kind() == ErrorKind::DisplayVersion {
                0
            } else {
                1
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    cmd.run().await
}
