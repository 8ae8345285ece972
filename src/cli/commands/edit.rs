//! Edit, toggle and bulk-edit command implementations.

use anyhow::Result;
use gtm_lib::{BulkEdit, ItemUpdate};

use super::{CommandContext, item_ref, load_store, persist};
use crate::cli::{BulkEditArgs, EditArgs, ToggleArgs};
use crate::format::{WriteOutput, format_status_badge};

/// `--folder X` / `--no-folder` as the double option the store expects.
fn folder_choice(folder: Option<&String>, no_folder: bool) -> Option<Option<String>> {
    if no_folder {
        Some(None)
    } else {
        folder.map(|id| Some(id.clone()))
    }
}

/// Execute the edit command.
///
/// # Errors
///
/// Returns an error if the item is missing, the update is invalid, or the
/// container cannot be written.
pub fn execute(args: &EditArgs, ctx: &CommandContext) -> Result<()> {
    let mut store = load_store(&args.container, ctx)?;
    let update = ItemUpdate {
        name: args.name.clone(),
        parent_folder_id: folder_choice(args.folder.as_ref(), args.no_folder),
        notes: args.notes.clone(),
        parameters: args.params.clone(),
        paused: args.paused,
    };
    let target = item_ref(&args.id, args.index)?;
    store.update_item(args.kind, target.clone(), &update)?;
    let output = persist(&mut store, args.output.output.as_deref())?;

    if ctx.json {
        return ctx.print_json(&WriteOutput {
            action: "edit",
            count: 1,
            output,
        });
    }
    if !ctx.quiet {
        println!("Updated {} {target}", args.kind);
        println!("Saved to {}", output.display());
    }
    Ok(())
}

/// Execute the toggle command.
///
/// # Errors
///
/// Returns an error if the item is not a tag, is missing, or the
/// container cannot be written.
pub fn execute_toggle(args: &ToggleArgs, ctx: &CommandContext) -> Result<()> {
    let mut store = load_store(&args.container, ctx)?;
    let target = item_ref(&args.id, args.index)?;
    let paused = store.toggle_paused(args.kind, target.clone())?;
    let output = persist(&mut store, args.output.output.as_deref())?;

    if ctx.json {
        return ctx.print_json(&serde_json::json!({
            "id": target.to_string(),
            "paused": paused,
            "output": output,
        }));
    }
    if !ctx.quiet {
        let state = if paused { "disabled" } else { "enabled" };
        println!("{} {target} {state}", format_status_badge(paused));
    }
    Ok(())
}

/// Execute the bulk-edit command.
///
/// # Errors
///
/// Returns an error if the edit is empty or invalid, or the container
/// cannot be written.
pub fn execute_bulk(args: &BulkEditArgs, ctx: &CommandContext) -> Result<()> {
    let mut store = load_store(&args.container, ctx)?;
    let edit = BulkEdit {
        toggle_paused: args.toggle_status,
        folder: folder_choice(args.folder.as_ref(), args.no_folder),
        find_replace: args.find.clone().zip(args.replace.clone()),
    };

    let count = store.bulk_edit(args.kind, &args.ids, &edit)?;
    if count < args.ids.len() {
        tracing::warn!(
            requested = args.ids.len(),
            edited = count,
            "some IDs did not match any {}",
            args.kind
        );
    }
    if count == 0 {
        if ctx.json {
            return ctx.print_json(&serde_json::json!({
                "action": "bulk_edit",
                "count": 0,
                "output": null,
            }));
        }
        if !ctx.quiet {
            println!("No changes; nothing written");
        }
        return Ok(());
    }
    let output = persist(&mut store, args.output.output.as_deref())?;

    if ctx.json {
        return ctx.print_json(&WriteOutput {
            action: "bulk_edit",
            count,
            output,
        });
    }
    if !ctx.quiet {
        println!("Updated {count} {}", args.kind.plural());
        println!("Saved to {}", output.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_choice() {
        let id = "7".to_string();
        assert_eq!(folder_choice(None, false), None);
        assert_eq!(folder_choice(Some(&id), false), Some(Some("7".to_string())));
        assert_eq!(folder_choice(None, true), Some(None));
    }
}
