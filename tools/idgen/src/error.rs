//! Error display for the CLI.

use colored::Colorize;
use prefixid_codegen::{DedupError, ScanError};

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);

    let Some(scan_err) = err.downcast_ref::<ScanError>() else {
        return;
    };

    match scan_err {
        ScanError::Extraction(errors) if errors.len() > 1 => {
            for error in &errors[1..] {
                eprintln!("{} {}", "Error:".red().bold(), error);
            }
        }
        ScanError::Dedup(DedupError::ConflictingPrefix { .. }) => {
            eprintln!(
                "\n{}",
                "Hint: Declare the type with one prefix, or set `conflict = \"last-wins\"` in prefixid.toml."
                    .yellow()
            );
        }
        ScanError::InvalidCratePath(_) => {
            eprintln!(
                "\n{}",
                "Hint: --crate-path takes a Rust path such as `::prefixid` or `crate::ids`.".yellow()
            );
        }
        ScanError::Parse { .. } => {
            eprintln!(
                "\n{}",
                "Hint: Sources must parse as Rust. Run `cargo check` for details.".yellow()
            );
        }
        _ => {}
    }
}
