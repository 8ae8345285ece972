//! Sync command implementation.
//!
//! Looks up one property row in the tracker sheet, proposes variable and
//! CallRail edits for it, and with `--apply` writes them to the container.
//! Without `--apply` the container is never touched.

use anyhow::Result;
use gtm_lib::{Change, ContainerStore, GtmError, LookupKey, ValueRange, locate_row};

use super::{CommandContext, load_store, persist};
use crate::cli::SyncArgs;
use crate::format::{SyncOutput, format_change};
use crate::sheets::{SheetsClient, SheetsError, load_value_file};

/// Execute the sync command.
///
/// # Errors
///
/// Returns an error if the lookup is blank, the sheet cannot be fetched,
/// no row matches, or the container cannot be written.
pub fn execute(args: &SyncArgs, ctx: &CommandContext) -> Result<()> {
    let key = lookup_key(args)?;
    let mut store = load_store(&args.container, ctx)?;
    let values = fetch_values(args, ctx)?;

    let row = locate_row(&values.values, &key).ok_or_else(|| GtmError::PropertyNotFound {
        lookup: key.value().to_string(),
    })?;
    tracing::info!(lookup = %key, "located sheet row");

    let changes = store.build_changes(&row);
    if changes.is_empty() {
        if ctx.json {
            return ctx.print_json(&SyncOutput {
                lookup: key.to_string(),
                changes,
                applied: false,
                report: None,
                output: None,
            });
        }
        println!("No changes found for {key}");
        return Ok(());
    }

    if !args.apply {
        return report_preview(ctx, &key, changes);
    }
    apply(ctx, args, &key, &mut store, changes)
}

fn lookup_key(args: &SyncArgs) -> Result<LookupKey> {
    let key = match (&args.property, &args.url) {
        (Some(name), _) => LookupKey::Name(name.clone()),
        (None, Some(url)) => LookupKey::Url(url.clone()),
        (None, None) => return Err(GtmError::validation("lookup", "give --property or --url").into()),
    };
    if key.value().trim().is_empty() {
        return Err(GtmError::validation(key.kind(), "lookup value is empty").into());
    }
    Ok(key)
}

/// Values from `--sheet-file`, or from the Sheets API using flags, then
/// config, then the stored key.
fn fetch_values(args: &SyncArgs, ctx: &CommandContext) -> Result<ValueRange> {
    if let Some(path) = &args.sheet_file {
        tracing::debug!(path = %path.display(), "reading sheet values from file");
        return Ok(load_value_file(path)?);
    }

    let sheets = &ctx.config.sheets;
    let sheet_id = args
        .sheet_id
        .clone()
        .or_else(|| sheets.sheet_id.clone())
        .filter(|id| !id.trim().is_empty())
        .ok_or(SheetsError::MissingSheetId)?;
    let api_key = match args.api_key.clone().or_else(|| sheets.api_key.clone()) {
        Some(key) => Some(key),
        None => ctx.local_store()?.api_key()?,
    }
    .filter(|key| !key.trim().is_empty())
    .ok_or(SheetsError::MissingApiKey)?;
    let range = args.range.as_deref().unwrap_or(&sheets.range);

    Ok(SheetsClient::new().fetch_values(&sheet_id, range, api_key.trim())?)
}

fn report_preview(ctx: &CommandContext, key: &LookupKey, changes: Vec<Change>) -> Result<()> {
    if ctx.json {
        return ctx.print_json(&SyncOutput {
            lookup: key.to_string(),
            changes,
            applied: false,
            report: None,
            output: None,
        });
    }

    println!("Proposed changes for {key}:\n");
    for (i, change) in changes.iter().enumerate() {
        println!("{}", format_change(i, change));
    }
    println!("\n{} change(s). Re-run with --apply to write them.", changes.len());
    Ok(())
}

fn apply(
    ctx: &CommandContext,
    args: &SyncArgs,
    key: &LookupKey,
    store: &mut ContainerStore,
    changes: Vec<Change>,
) -> Result<()> {
    let report = store.apply_changes(changes.clone());
    let output = persist(store, args.output.output.as_deref())?;

    if ctx.json {
        return ctx.print_json(&SyncOutput {
            lookup: key.to_string(),
            changes,
            applied: true,
            report: Some(report),
            output: Some(output),
        });
    }

    if !ctx.quiet {
        for (i, change) in changes.iter().enumerate() {
            println!("{}", format_change(i, change));
        }
        println!();
    }
    for (description, outcome) in &report.outcomes {
        if !outcome.is_applied() {
            eprintln!("Skipped: {description}");
        }
    }
    println!(
        "Applied {} change(s) for {key}; saved to {}",
        report.applied(),
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::{Cli, Commands};

    fn sync_args(argv: &[&str]) -> SyncArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Some(Commands::Sync(args)) => args,
            other => panic!("expected sync, got {other:?}"),
        }
    }

    #[test]
    fn test_lookup_key_prefers_property() {
        let args = sync_args(&["gtmx", "sync", "--property", "Acme"]);
        assert_eq!(lookup_key(&args).unwrap(), LookupKey::Name("Acme".into()));

        let args = sync_args(&["gtmx", "sync", "--url", "https://acme.test"]);
        assert_eq!(
            lookup_key(&args).unwrap(),
            LookupKey::Url("https://acme.test".into())
        );
    }

    #[test]
    fn test_blank_lookup_is_rejected() {
        let args = sync_args(&["gtmx", "sync", "--property", "   "]);
        let err = lookup_key(&args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GtmError>(),
            Some(GtmError::Validation { .. })
        ));
    }
}
