//! Export command implementation.

use std::path::PathBuf;

use anyhow::Result;
use gtm_lib::util::default_export_file_name;

use super::{CommandContext, load_store};
use crate::cli::ExportArgs;
use crate::format::WriteOutput;

/// Execute the export command.
///
/// # Errors
///
/// Returns an error if the container cannot be loaded or written.
pub fn execute(args: &ExportArgs, ctx: &CommandContext) -> Result<()> {
    let store = load_store(&args.container, ctx)?;

    if args.stdout {
        println!("{}", store.to_json_pretty()?);
        return Ok(());
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(default_export_file_name()));
    store.save_to(&output)?;
    tracing::info!(path = %output.display(), "exported container");

    if ctx.json {
        return ctx.print_json(&WriteOutput {
            action: "export",
            count: 1,
            output,
        });
    }
    if !ctx.quiet {
        println!("Exported to {}", output.display());
    }
    Ok(())
}
