//! Show command implementation.

use anyhow::Result;
use gtm_lib::{Entity, ItemRef};

use super::{CommandContext, item_ref, load_store};
use crate::cli::ShowArgs;
use crate::format::{ItemDetails, format_item_line};

/// Execute the show command.
///
/// # Errors
///
/// Returns an error if the container cannot be loaded or the item is not found.
pub fn execute(args: &ShowArgs, ctx: &CommandContext) -> Result<()> {
    let store = load_store(&args.container, ctx)?;
    let item = match item_ref(&args.id, args.index)? {
        ItemRef::Index(index) => store.get_item_at(args.kind, index)?,
        ItemRef::Id(id) => store.get_item(args.kind, &id)?,
    };
    let folder_name = item.parent_folder_id().map(|id| store.folder_name(id));

    if ctx.json {
        return ctx.print_json(&ItemDetails {
            kind: args.kind,
            folder_name,
            item,
        });
    }

    println!("{}", format_item_line(&item, None));
    if let Some(folder) = &folder_name {
        println!("Folder: {folder}");
    }
    if let Some(notes) = item.notes().filter(|n| !n.is_empty()) {
        println!("Notes: {notes}");
    }

    let params = item.parameters();
    if !params.is_empty() {
        println!("\nParameters:");
        for param in params {
            let key = param.key.as_deref().unwrap_or("?");
            match &param.value {
                Some(value) => println!("  {key} = {value}"),
                None => println!("  {key} ({})", param.param_type.as_deref().unwrap_or("?")),
            }
        }
    }

    if !ctx.quiet {
        println!("\n{}", serde_json::to_string_pretty(&item.to_json())?);
    }
    if item.id().is_none() {
        tracing::debug!(kind = %args.kind, "item has no ID; edits must go through the list position");
    }
    Ok(())
}
