//! Template cache commands.

use anyhow::Result;
use gtm_lib::{ContainerStore, document};

use super::CommandContext;
use crate::cli::{TemplateCommand, TemplateSubcommand};
use crate::format::format_summary;
use crate::storage::Slot;

/// Execute a template subcommand.
///
/// # Errors
///
/// Returns an error if the file cannot be parsed or the cache cannot be
/// read or written.
pub fn execute(cmd: &TemplateCommand, ctx: &CommandContext) -> Result<()> {
    let local = ctx.local_store()?;

    match &cmd.command {
        TemplateSubcommand::Save { file } => {
            let container = document::load(file)?;
            local.save_template(&container)?;
            let path = local.path(Slot::Template);
            if ctx.json {
                ctx.print_json(&serde_json::json!({ "saved": true, "path": path }))?;
            } else if !ctx.quiet {
                println!("Template saved to {}", path.display());
            }
        }
        TemplateSubcommand::Clear => {
            let existed = local.remove(Slot::Template)?;
            if ctx.json {
                ctx.print_json(&serde_json::json!({ "cleared": existed }))?;
            } else if existed {
                println!("Template cleared");
            } else {
                println!("No template cached");
            }
        }
        TemplateSubcommand::Status => {
            let template = local.template()?;
            let summary = template.map(|c| ContainerStore::from_container(c).summary());
            if ctx.json {
                ctx.print_json(&serde_json::json!({
                    "cached": summary.is_some(),
                    "path": local.path(Slot::Template),
                    "summary": summary,
                }))?;
            } else if let Some(summary) = summary {
                println!("Template cached at {}", local.path(Slot::Template).display());
                println!("{}", format_summary(&summary));
            } else {
                println!("No template cached");
            }
        }
    }
    Ok(())
}
