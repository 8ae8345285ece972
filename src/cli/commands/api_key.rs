//! API key commands.

use anyhow::{Result, bail};
use serde::Serialize;

use super::CommandContext;
use crate::cli::{ApiKeyCommand, ApiKeySubcommand};
use crate::storage::{Slot, mask_secret};

/// Where the effective key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum KeySource {
    Config,
    Stored,
}

/// Execute an api-key subcommand.
///
/// # Errors
///
/// Returns an error if the key is blank or the slot cannot be accessed.
pub fn execute(cmd: &ApiKeyCommand, ctx: &CommandContext) -> Result<()> {
    let local = ctx.local_store()?;

    match &cmd.command {
        ApiKeySubcommand::Set { key } => {
            let key = key.trim();
            if key.is_empty() {
                bail!("API key cannot be empty");
            }
            local.set(Slot::ApiKey, key)?;
            if ctx.json {
                ctx.print_json(&serde_json::json!({ "stored": true, "key": mask_secret(key) }))?;
            } else if !ctx.quiet {
                println!("API key stored ({})", mask_secret(key));
            }
        }
        ApiKeySubcommand::Clear => {
            let existed = local.remove(Slot::ApiKey)?;
            if ctx.json {
                ctx.print_json(&serde_json::json!({ "cleared": existed }))?;
            } else if existed {
                println!("API key cleared");
            } else {
                println!("No API key stored");
            }
        }
        ApiKeySubcommand::Show => {
            let effective = match ctx.config.sheets.api_key.clone() {
                Some(key) => Some((key, KeySource::Config)),
                None => local.api_key()?.map(|key| (key, KeySource::Stored)),
            };
            if ctx.json {
                let (key, source) = effective.map_or((None, None), |(k, s)| {
                    (Some(mask_secret(&k)), Some(s))
                });
                ctx.print_json(&serde_json::json!({ "key": key, "source": source }))?;
            } else if let Some((key, source)) = effective {
                let from = match source {
                    KeySource::Config => "config or environment",
                    KeySource::Stored => "stored",
                };
                println!("{} ({from})", mask_secret(&key));
            } else {
                println!("No API key configured");
            }
        }
    }
    Ok(())
}
