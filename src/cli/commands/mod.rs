//! Command implementations.
//!
//! Shared plumbing lives here: every command that reads a container goes
//! through [`load_store`], and every command that writes one goes through
//! [`persist`].

pub mod api_key;
pub mod completions;
pub mod delete;
pub mod edit;
pub mod export;
pub mod info;
pub mod list;
pub mod settings;
pub mod show;
pub mod sync;
pub mod template;
pub mod version;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use gtm_lib::{ContainerStore, ItemRef};
use gtm_lib::util::default_export_file_name;
use serde::Serialize;

use crate::cli::ContainerArgs;
use crate::config::Config;
use crate::storage::LocalStore;

/// Positional argument as an ID, or as a list position with `--index`.
///
/// # Errors
///
/// Returns an error if `index` is set and `id` is not a number.
pub fn item_ref(id: &str, index: bool) -> Result<ItemRef> {
    if !index {
        return Ok(ItemRef::from(id));
    }
    let position: usize = id
        .parse()
        .with_context(|| format!("`{id}` is not a list position"))?;
    Ok(ItemRef::Index(position))
}

/// Settings every command sees.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub json: bool,
    pub quiet: bool,
    pub config: Config,
}

impl CommandContext {
    /// Print `value` as indented JSON on stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Local slot store honoring `template.path` from config.
    ///
    /// # Errors
    ///
    /// Returns an error if no data directory can be determined.
    pub fn local_store(&self) -> Result<LocalStore> {
        Ok(LocalStore::open_default()?.with_template_path(self.config.template.path.clone()))
    }
}

/// Open the container named by `args`.
///
/// Falls back to the cached template when `--template` is given or
/// `template.auto_load` is set and no file was named.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded, or no source is available.
pub fn load_store(args: &ContainerArgs, ctx: &CommandContext) -> Result<ContainerStore> {
    if let Some(path) = &args.file {
        tracing::debug!(path = %path.display(), "loading container");
        return Ok(ContainerStore::open(path)?);
    }

    if args.template || ctx.config.template.auto_load {
        let local = ctx.local_store()?;
        if let Some(container) = local.template()? {
            tracing::debug!("loading cached template");
            return Ok(ContainerStore::from_container(container));
        }
        if args.template {
            bail!("no template cached; run `gtmx template save <FILE>` first");
        }
    }

    bail!("no container given; pass --file <FILE> or --template")
}

/// Write `store` to `output`, back to its source file, or to a dated
/// export file in the current directory. Returns the path written.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn persist(store: &mut ContainerStore, output: Option<&Path>) -> Result<PathBuf> {
    let target = match (output, store.path()) {
        (Some(out), _) => out.to_path_buf(),
        (None, Some(src)) => src.to_path_buf(),
        (None, None) => PathBuf::from(default_export_file_name()),
    };
    store.save_to(&target)?;
    store.clear_dirty();
    tracing::info!(path = %target.display(), "container written");
    Ok(target)
}
