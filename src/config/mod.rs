//! Configuration management for `gtmx`.
//!
//! Configuration is loaded from YAML files with support for:
//! - User config (~/.config/gtmx/config.yaml, or `$GTMX_CONFIG_DIR/config.yaml`)
//! - Workspace config (.gtmx/config.yaml)
//! - Environment variable overrides (`GTMX_SHEET_ID`, `GTMX_SHEETS_API_KEY`)
//!
//! Later layers win. CLI flags are applied on top by the commands.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default sheet range for the tracker spreadsheet.
pub const DEFAULT_RANGE: &str = "Tracker Sheet!A:AZ";

pub const ENV_CONFIG_DIR: &str = "GTMX_CONFIG_DIR";
pub const ENV_SHEET_ID: &str = "GTMX_SHEET_ID";
pub const ENV_API_KEY: &str = "GTMX_SHEETS_API_KEY";

const CONFIG_FILE: &str = "config.yaml";
const WORKSPACE_DIR: &str = ".gtmx";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Effective configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub sheets: SheetsConfig,
    pub template: TemplateConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetsConfig {
    pub sheet_id: Option<String>,
    pub api_key: Option<String>,
    pub range: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateConfig {
    /// Cache file location; defaults to the data directory slot.
    pub path: Option<PathBuf>,
    /// Load the cached template when no `--file` is given.
    pub auto_load: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiConfig {
    pub default_kind: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sheets: SheetsConfig {
                sheet_id: None,
                api_key: None,
                range: DEFAULT_RANGE.to_string(),
            },
            template: TemplateConfig::default(),
            ui: UiConfig {
                default_kind: "tag".to_string(),
            },
        }
    }
}

/// One YAML file's worth of settings; absent keys leave lower layers alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub sheets: SheetsLayer,
    pub template: TemplateLayer,
    pub ui: UiLayer,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetsLayer {
    pub sheet_id: Option<String>,
    pub api_key: Option<String>,
    pub range: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateLayer {
    pub path: Option<PathBuf>,
    pub auto_load: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UiLayer {
    pub default_kind: Option<String>,
}

impl Config {
    /// Load all layers for a workspace rooted at `workspace`.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or parsed.
    pub fn load(workspace: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let mut paths = Vec::new();
        if let Some(dir) = user_config_dir() {
            paths.push(dir.join(CONFIG_FILE));
        }
        paths.push(workspace.join(WORKSPACE_DIR).join(CONFIG_FILE));

        for path in paths {
            if let Some(layer) = read_layer(&path)? {
                tracing::debug!(path = %path.display(), "applying config layer");
                config.merge(layer);
            }
        }

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Overlay the keys present in `layer`.
    pub fn merge(&mut self, layer: ConfigLayer) {
        if layer.sheets.sheet_id.is_some() {
            self.sheets.sheet_id = layer.sheets.sheet_id;
        }
        if layer.sheets.api_key.is_some() {
            self.sheets.api_key = layer.sheets.api_key;
        }
        if let Some(range) = layer.sheets.range {
            self.sheets.range = range;
        }
        if layer.template.path.is_some() {
            self.template.path = layer.template.path;
        }
        if let Some(auto_load) = layer.template.auto_load {
            self.template.auto_load = auto_load;
        }
        if let Some(kind) = layer.ui.default_kind {
            self.ui.default_kind = kind;
        }
    }

    /// Apply environment overrides read through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        if let Some(id) = non_empty(ENV_SHEET_ID) {
            self.sheets.sheet_id = Some(id);
        }
        if let Some(key) = non_empty(ENV_API_KEY) {
            self.sheets.api_key = Some(key);
        }
    }
}

/// Directory holding the user-level config file.
#[must_use]
pub fn user_config_dir() -> Option<PathBuf> {
    std::env::var_os(ENV_CONFIG_DIR)
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|d| d.join("gtmx")))
}

fn read_layer(path: &Path) -> Result<Option<ConfigLayer>, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_yaml::from_str(&text)
        .map(Some)
        .map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
}
