//! Delete command implementation.

use anyhow::{Result, bail};

use super::{CommandContext, load_store, persist};
use crate::cli::DeleteArgs;
use crate::format::WriteOutput;

/// Execute the delete command.
///
/// Deletion is refused without `--yes`. IDs that match nothing are
/// ignored; deleting nothing still leaves the file untouched.
///
/// # Errors
///
/// Returns an error if confirmation is missing or the write fails.
pub fn execute(args: &DeleteArgs, ctx: &CommandContext) -> Result<()> {
    if !args.yes {
        bail!(
            "refusing to delete {} {} without --yes",
            args.ids.len(),
            args.kind.plural()
        );
    }

    let mut store = load_store(&args.container, ctx)?;
    let count = store.delete_items(args.kind, &args.ids);
    if count == 0 {
        if ctx.json {
            return ctx.print_json(&serde_json::json!({ "action": "delete", "count": 0 }));
        }
        println!("No matching {} found.", args.kind.plural());
        return Ok(());
    }

    let output = persist(&mut store, args.output.output.as_deref())?;
    if ctx.json {
        return ctx.print_json(&WriteOutput {
            action: "delete",
            count,
            output,
        });
    }
    if !ctx.quiet {
        println!("Deleted {count} {}", args.kind.plural());
        println!("Saved to {}", output.display());
    }
    Ok(())
}
