//! CLI commands.

mod check;
mod generate;
mod list;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use prefixid_codegen::{Cancellation, ConflictPolicy};
use tracing::debug;

use crate::config::{Config, Overrides, Settings};
use crate::output::OutputFormat;

/// prefixid-gen - find `#[prefixed_id]` declarations and generate ID types.
#[derive(Debug, Parser)]
#[command(name = "prefixid-gen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file. Defaults to ./prefixid.toml when present.
    #[arg(long, global = true, value_name = "PATH", env = "PREFIXID_CONFIG")]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// File or directory to scan. Repeatable; replaces `sources` from the config.
    #[arg(
        long = "source",
        global = true,
        value_name = "PATH",
        env = "PREFIXID_SOURCES",
        value_delimiter = ','
    )]
    sources: Vec<PathBuf>,

    /// What to do when one type is declared with two prefixes (reject or last-wins).
    #[arg(long, global = true, env = "PREFIXID_CONFLICT")]
    conflict: Option<ConflictPolicy>,

    /// Path of the runtime crate in generated code.
    #[arg(long, global = true, env = "PREFIXID_CRATE_PATH")]
    crate_path: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List discovered declarations.
    List,

    /// Validate every declaration; fails on invalid or conflicting ones.
    Check,

    /// Write the generated ID types to a file.
    Generate(generate::GenerateArgs),
}

impl Cli {
    /// Run the CLI command.
    pub fn run(self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;
        let settings = Settings::resolve(
            config,
            Overrides {
                sources: self.sources,
                out: None,
                conflict: self.conflict,
                crate_path: self.crate_path,
            },
        )?;
        debug!(?settings, "resolved settings");

        let cancellation = Cancellation::new();
        let handler = cancellation.clone();
        if let Err(e) = ctrlc::set_handler(move || handler.cancel()) {
            debug!(error = %e, "failed to install Ctrl+C handler");
        }

        let ctx = CommandContext {
            settings,
            format: self.format,
            cancellation,
        };

        match self.command {
            Commands::List => list::run(&ctx),
            Commands::Check => check::run(&ctx),
            Commands::Generate(args) => generate::run(ctx, args),
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    pub settings: Settings,
    pub format: OutputFormat,
    pub cancellation: Cancellation,
}
