//! `list`: show every declaration the scanner finds.

use anyhow::Result;
use prefixid_codegen::Discovery;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_output, print_problem};

use super::CommandContext;

/// Length of the zero-filled value in an empty ID.
const EMPTY_VALUE_LEN: usize = 26;

#[derive(Debug, Clone, Serialize, Tabled)]
pub(super) struct DeclarationRow {
    #[tabled(rename = "Type")]
    #[serde(rename = "type")]
    type_name: String,

    #[tabled(rename = "Prefix")]
    prefix: String,

    #[tabled(rename = "Empty")]
    empty: String,

    #[tabled(rename = "Declared at")]
    declared_at: String,
}

pub(super) fn run(ctx: &CommandContext) -> Result<()> {
    let discovery = ctx.settings.builder(&ctx.cancellation).discover()?;

    for error in &discovery.errors {
        print_problem(&error.to_string());
    }
    print_output(&rows(&discovery), ctx.format);
    Ok(())
}

pub(super) fn rows(discovery: &Discovery) -> Vec<DeclarationRow> {
    discovery
        .requests
        .iter()
        .map(|request| {
            let prefix = request.context.prefix().as_str();
            DeclarationRow {
                type_name: request.context.qualified_name(),
                prefix: prefix.to_string(),
                empty: format!("{prefix}_{}", "0".repeat(EMPTY_VALUE_LEN)),
                declared_at: request
                    .sources
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            }
        })
        .collect()
}
