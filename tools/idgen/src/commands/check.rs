//! `check`: validate declarations without writing anything.

use anyhow::{bail, Result};

use crate::output::{print_problem, print_single, print_success, OutputFormat};

use super::CommandContext;

pub(super) fn run(ctx: &CommandContext) -> Result<()> {
    let discovery = ctx.settings.builder(&ctx.cancellation).discover()?;
    let valid = discovery.errors.is_empty();

    match ctx.format {
        OutputFormat::Json => {
            let errors: Vec<String> = discovery.errors.iter().map(ToString::to_string).collect();
            print_single(&serde_json::json!({
                "valid": valid,
                "types": discovery.requests.len(),
                "files": discovery.files.len(),
                "errors": errors,
            }));
        }
        OutputFormat::Table => {
            for error in &discovery.errors {
                print_problem(&error.to_string());
            }
            if valid {
                print_success(&format!(
                    "{} ID type(s) in {} file(s)",
                    discovery.requests.len(),
                    discovery.files.len()
                ));
            }
        }
    }

    if !valid {
        bail!(
            "Declaration check failed ({} error(s))",
            discovery.errors.len()
        );
    }
    Ok(())
}
