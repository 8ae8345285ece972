//! Command-line interface for `gtmx`.
//!
//! This module provides the CLI parsing and command routing using clap.

pub mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};
use clap_complete::Shell;
use gtm_lib::{EntityKind, StatusFilter};

use crate::config::Config;
use crate::logging;

/// `gtmx` - GTM container export editor.
#[derive(Parser, Debug)]
#[command(name = "gtmx")]
#[command(
    author,
    version,
    about = "Edit Google Tag Manager container exports and reconcile them against a tracking sheet",
    long_about = None,
    after_help = "Edits are written back to the input file unless --output is given."
)]
pub struct Cli {
    /// Output format: text (default) or json
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show container name, IDs and entity counts
    Info(InfoArgs),

    /// List entities of one kind
    List(ListArgs),

    /// Show one entity in full
    Show(ShowArgs),

    /// Edit one entity
    Edit(EditArgs),

    /// Enable or disable a tag
    Toggle(ToggleArgs),

    /// Show or change the container version name, description and notes
    Settings(SettingsArgs),

    /// Apply the same edit to several entities
    BulkEdit(BulkEditArgs),

    /// Delete entities
    Delete(DeleteArgs),

    /// Reconcile variables and the CallRail tag against a sheet row
    Sync(SyncArgs),

    /// Write the container to a dated export file
    Export(ExportArgs),

    /// Manage the cached template container
    Template(TemplateCommand),

    /// Manage the stored Sheets API key
    ApiKey(ApiKeyCommand),

    /// Generate shell completions
    Completions(CompletionsArgs),

    /// Show version information
    Version,
}

/// Where the container comes from.
#[derive(Args, Debug, Clone, Default)]
pub struct ContainerArgs {
    /// Container export JSON file
    #[arg(short, long, env = "GTMX_FILE", value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Load the cached template instead of a file
    #[arg(long, conflicts_with = "file")]
    pub template: bool,
}

/// Where edits are written.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Write the result here instead of back to the input file
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub container: ContainerArgs,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub container: ContainerArgs,

    /// Entity kind (tags, triggers, variables, folders)
    pub kind: Option<EntityKind>,

    /// Case-insensitive search over name and type
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Status filter: all, enabled, disabled
    #[arg(long, default_value = "all")]
    pub status: StatusFilter,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub container: ContainerArgs,

    /// Entity kind
    pub kind: EntityKind,

    /// Entity ID (or zero-based position with --index)
    pub id: String,

    /// Treat ID as a position in the list
    #[arg(long)]
    pub index: bool,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("folder_choice").args(["folder", "no_folder"])))]
pub struct EditArgs {
    #[command(flatten)]
    pub container: ContainerArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Entity kind
    pub kind: EntityKind,

    /// Entity ID (or zero-based position with --index)
    pub id: String,

    /// Treat ID as a position in the list
    #[arg(long)]
    pub index: bool,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// Move into this folder (by folder ID)
    #[arg(long, value_name = "FOLDER_ID")]
    pub folder: Option<String>,

    /// Remove the folder assignment
    #[arg(long)]
    pub no_folder: bool,

    /// Replace notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Set an existing parameter (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Pause or enable a tag
    #[arg(long)]
    pub paused: Option<bool>,
}

#[derive(Args, Debug)]
pub struct ToggleArgs {
    #[command(flatten)]
    pub container: ContainerArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Tag ID (or zero-based position with --index)
    pub id: String,

    /// Treat ID as a position in the list
    #[arg(long)]
    pub index: bool,

    /// Entity kind (only tags can be toggled)
    #[arg(long, default_value = "tag")]
    pub kind: EntityKind,
}

#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[command(flatten)]
    pub container: ContainerArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    /// New container version name
    #[arg(long)]
    pub name: Option<String>,

    /// New description
    #[arg(long)]
    pub description: Option<String>,

    /// New notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("folder_choice").args(["folder", "no_folder"])))]
pub struct BulkEditArgs {
    #[command(flatten)]
    pub container: ContainerArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Entity kind
    pub kind: EntityKind,

    /// Entity IDs
    #[arg(long, value_delimiter = ',', required = true, num_args = 1..)]
    pub ids: Vec<String>,

    /// Flip the paused state (tags only)
    #[arg(long)]
    pub toggle_status: bool,

    /// Move into this folder
    #[arg(long, value_name = "FOLDER_ID")]
    pub folder: Option<String>,

    /// Remove folder assignments
    #[arg(long)]
    pub no_folder: bool,

    /// Regex to find in names
    #[arg(long, requires = "replace")]
    pub find: Option<String>,

    /// Replacement text ($1 etc. refer to capture groups)
    #[arg(long, requires = "find")]
    pub replace: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub container: ContainerArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Entity kind
    pub kind: EntityKind,

    /// Entity IDs
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Confirm the deletion
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("lookup").required(true).args(["property", "url"])))]
pub struct SyncArgs {
    #[command(flatten)]
    pub container: ContainerArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Property name to look up (substring of the property column)
    #[arg(long)]
    pub property: Option<String>,

    /// Website URL to look up
    #[arg(long)]
    pub url: Option<String>,

    /// Spreadsheet ID
    #[arg(long)]
    pub sheet_id: Option<String>,

    /// Sheets API key
    #[arg(long)]
    pub api_key: Option<String>,

    /// A1 range to fetch
    #[arg(long)]
    pub range: Option<String>,

    /// Read sheet values from a saved JSON response instead of the API
    #[arg(long, value_name = "PATH", conflicts_with_all = ["sheet_id", "api_key", "range"])]
    pub sheet_file: Option<PathBuf>,

    /// Apply the changes and write the container
    #[arg(long)]
    pub apply: bool,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub container: ContainerArgs,

    /// Destination (defaults to gtm-container-modified-<date>.json)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print the JSON to stdout instead of writing a file
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,
}

#[derive(Args, Debug)]
pub struct TemplateCommand {
    /// Template subcommand
    #[command(subcommand)]
    pub command: TemplateSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum TemplateSubcommand {
    /// Cache a container as the template
    Save {
        /// Container export JSON file
        file: PathBuf,
    },

    /// Remove the cached template
    Clear,

    /// Show whether a template is cached
    Status,
}

#[derive(Args, Debug)]
pub struct ApiKeyCommand {
    /// API key subcommand
    #[command(subcommand)]
    pub command: ApiKeySubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ApiKeySubcommand {
    /// Store an API key
    Set {
        /// The key
        key: String,
    },

    /// Remove the stored API key
    Clear,

    /// Show the effective API key (masked) and where it comes from
    Show,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))?;
    if key.trim().is_empty() {
        return Err("parameter key cannot be empty".to_string());
    }
    Ok((key.trim().to_string(), value.to_string()))
}

/// Run the CLI.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    let Some(command) = cli.command else {
        println!("gtmx - GTM container editor. Use --help for usage.");
        return Ok(());
    };

    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    let config = Config::load(&cwd)?;
    let ctx = commands::CommandContext {
        json: cli.json,
        quiet: cli.quiet,
        config,
    };
    tracing::debug!(command = command.name(), "dispatching");

    match command {
        Commands::Info(args) => commands::info::execute(&args, &ctx),
        Commands::List(args) => commands::list::execute(&args, &ctx),
        Commands::Show(args) => commands::show::execute(&args, &ctx),
        Commands::Edit(args) => commands::edit::execute(&args, &ctx),
        Commands::Toggle(args) => commands::edit::execute_toggle(&args, &ctx),
        Commands::Settings(args) => commands::settings::execute(&args, &ctx),
        Commands::BulkEdit(args) => commands::edit::execute_bulk(&args, &ctx),
        Commands::Delete(args) => commands::delete::execute(&args, &ctx),
        Commands::Sync(args) => commands::sync::execute(&args, &ctx),
        Commands::Export(args) => commands::export::execute(&args, &ctx),
        Commands::Template(cmd) => commands::template::execute(&cmd, &ctx),
        Commands::ApiKey(cmd) => commands::api_key::execute(&cmd, &ctx),
        Commands::Completions(args) => {
            commands::completions::execute(&args);
            Ok(())
        }
        Commands::Version => commands::version::execute(&ctx),
    }
}

impl Commands {
    const fn name(&self) -> &'static str {
        match self {
            Self::Info(_) => "info",
            Self::List(_) => "list",
            Self::Show(_) => "show",
            Self::Edit(_) => "edit",
            Self::Toggle(_) => "toggle",
            Self::Settings(_) => "settings",
            Self::BulkEdit(_) => "bulk-edit",
            Self::Delete(_) => "delete",
            Self::Sync(_) => "sync",
            Self::Export(_) => "export",
            Self::Template(t) => match t.command {
                TemplateSubcommand::Save { .. } => "template save",
                TemplateSubcommand::Clear => "template clear",
                TemplateSubcommand::Status => "template status",
            },
            Self::ApiKey(k) => match k.command {
                ApiKeySubcommand::Set { .. } => "api-key set",
                ApiKeySubcommand::Clear => "api-key clear",
                ApiKeySubcommand::Show => "api-key show",
            },
            Self::Completions(_) => "completions",
            Self::Version => "version",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("html=<p>a=b</p>").unwrap(),
            ("html".to_string(), "<p>a=b</p>".to_string())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_sync_requires_a_lookup() {
        let result = Cli::try_parse_from(["gtmx", "sync", "-f", "c.json"]);
        assert!(result.is_err());
        let ok = Cli::try_parse_from(["gtmx", "sync", "-f", "c.json", "--url", "example.com"]);
        assert!(ok.is_ok());
    }

    #[test]
    fn test_kind_accepts_plural() {
        let cli = Cli::try_parse_from(["gtmx", "list", "-f", "c.json", "variables"]).unwrap();
        let Some(Commands::List(args)) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.kind, Some(EntityKind::Variable));
    }
}
