//! Settings command implementation.

use anyhow::Result;
use gtm_lib::ContainerSettings;

use super::{CommandContext, load_store, persist};
use crate::cli::SettingsArgs;
use crate::format::WriteOutput;

/// Execute the settings command.
///
/// Without any flag the current settings are printed; otherwise the given
/// fields are overwritten and the container is written.
///
/// # Errors
///
/// Returns an error if the container cannot be loaded or written.
pub fn execute(args: &SettingsArgs, ctx: &CommandContext) -> Result<()> {
    let mut store = load_store(&args.container, ctx)?;
    let update = ContainerSettings {
        name: args.name.clone(),
        description: args.description.clone(),
        notes: args.notes.clone(),
    };

    if update.is_empty() {
        let current = store.settings();
        if ctx.json {
            return ctx.print_json(&current);
        }
        for (field, value) in ContainerSettings::FIELDS.into_iter().zip(current.values()) {
            println!("{field:<12} {}", value.unwrap_or("-"));
        }
        return Ok(());
    }

    store.update_settings(&update)?;
    let output = persist(&mut store, args.output.output.as_deref())?;

    if ctx.json {
        return ctx.print_json(&WriteOutput {
            action: "settings",
            count: update.values().iter().flatten().count(),
            output,
        });
    }
    if !ctx.quiet {
        println!("Updated container settings");
        println!("Saved to {}", output.display());
    }
    Ok(())
}
