//! prefixid-gen - scan sources for `#[prefixed_id]` declarations and write
//! the generated ID types.
//!
//! Intended for projects that check generated code in, and for CI checks
//! that every declaration is valid.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

use commands::Cli;

/// Log level used when neither `RUST_LOG` nor `PREFIXID_LOG_LEVEL` is set.
const DEFAULT_LOG_LEVEL: &str = "warn";

fn main() -> Result<()> {
    // Prefer RUST_LOG, fallback to PREFIXID_LOG_LEVEL
    let fallback =
        std::env::var("PREFIXID_LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = cli.run() {
        error::print_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
