//! List command implementation.
//!
//! Primary discovery interface: one kind at a time, filtered by a
//! case-insensitive search over name and type plus an enabled/disabled
//! status filter.

use anyhow::Result;
use gtm_lib::{EntityFilter, EntityKind};

use super::{CommandContext, load_store};
use crate::cli::ListArgs;
use crate::format::{ItemList, format_item_line};

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if the container cannot be loaded or the configured
/// default kind is invalid.
pub fn execute(args: &ListArgs, ctx: &CommandContext) -> Result<()> {
    let store = load_store(&args.container, ctx)?;
    let kind = match args.kind {
        Some(kind) => kind,
        None => ctx.config.ui.default_kind.parse::<EntityKind>()?,
    };

    let filter = EntityFilter::new(args.search.clone(), args.status);
    let items = store.list(kind, &filter);
    let total = store.count(kind);

    if ctx.json {
        return ctx.print_json(&ItemList { kind, total, items });
    }

    if items.is_empty() {
        println!("No {} found.", kind.plural());
        return Ok(());
    }
    for item in &items {
        let folder = item.parent_folder_id().map(|id| store.folder_name(id));
        println!("{}", format_item_line(item, folder.as_deref()));
    }
    println!("\nShowing {} of {total} {}", items.len(), kind.plural());
    Ok(())
}
