//! `generate`: write the generated ID types to a file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::output::{print_info, print_single, print_success, OutputFormat};

use super::CommandContext;

#[derive(Debug, Args)]
pub(super) struct GenerateArgs {
    /// Output file. Overrides `out` from the config.
    #[arg(long, value_name = "PATH", env = "PREFIXID_OUT")]
    pub(super) out: Option<PathBuf>,
}

pub(super) fn run(ctx: CommandContext, args: GenerateArgs) -> Result<()> {
    let out = args.out.or_else(|| ctx.settings.out.clone()).context(
        "No output file specified. Use --out or set `out` in prefixid.toml.",
    )?;

    let generated = ctx.settings.builder(&ctx.cancellation).out_file(&out).generate()?;

    match ctx.format {
        OutputFormat::Json => print_single(&serde_json::json!({
            "path": generated.path.display().to_string(),
            "types": generated.types,
            "written": generated.written,
        })),
        OutputFormat::Table if generated.written => {
            print_success(&format!("Wrote {}", generated.path.display()));
            print_info(&format!("{} ID type(s)", generated.types));
        }
        OutputFormat::Table => {
            print_info(&format!("{} is up to date", generated.path.display()));
        }
    }
    Ok(())
}
