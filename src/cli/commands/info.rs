//! Info command implementation.

use anyhow::Result;

use super::{CommandContext, load_store};
use crate::cli::InfoArgs;
use crate::format::format_summary;

/// Execute the info command.
///
/// # Errors
///
/// Returns an error if the container cannot be loaded.
pub fn execute(args: &InfoArgs, ctx: &CommandContext) -> Result<()> {
    let store = load_store(&args.container, ctx)?;
    let summary = store.summary();

    if ctx.json {
        ctx.print_json(&summary)?;
    } else {
        println!("{}", format_summary(&summary));
    }
    Ok(())
}
