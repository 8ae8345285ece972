//! Local key-value storage for `gtmx`.
//!
//! Two slots live under the data directory (`$GTMX_DATA_DIR`, or
//! `<data dir>/gtmx`):
//! - `api_key` - the Sheets API key, plain text
//! - `template.json` - a cached container export
//!
//! Nothing is encrypted. A template that no longer parses is removed on
//! read and reported as absent.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use gtm_lib::Container;
use gtm_lib::document;
use thiserror::Error;

pub const ENV_DATA_DIR: &str = "GTMX_DATA_DIR";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("no data directory available; set {ENV_DATA_DIR}")]
    NoDataDir,

    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Container(#[from] gtm_lib::GtmError),
}

/// A named storage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    ApiKey,
    Template,
}

impl Slot {
    #[must_use]
    pub const fn file_name(&self) -> &'static str {
        match self {
            Self::ApiKey => "api_key",
            Self::Template => "template.json",
        }
    }
}

/// File-backed slot store.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
    template_path: Option<PathBuf>,
}

impl LocalStore {
    /// Store rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            template_path: None,
        }
    }

    /// Store at the default data directory.
    ///
    /// # Errors
    ///
    /// Returns `NoDataDir` if neither `GTMX_DATA_DIR` nor a platform data
    /// directory is available.
    pub fn open_default() -> Result<Self, StorageError> {
        let dir = std::env::var_os(ENV_DATA_DIR)
            .map(PathBuf::from)
            .or_else(|| dirs::data_dir().map(|d| d.join("gtmx")))
            .ok_or(StorageError::NoDataDir)?;
        Ok(Self::new(dir))
    }

    /// Keep the template somewhere other than the data directory.
    #[must_use]
    pub fn with_template_path(mut self, path: Option<PathBuf>) -> Self {
        self.template_path = path;
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path(&self, slot: Slot) -> PathBuf {
        match (slot, &self.template_path) {
            (Slot::Template, Some(path)) => path.clone(),
            _ => self.dir.join(slot.file_name()),
        }
    }

    // ========================================================================
    // Raw slots
    // ========================================================================

    /// Read a slot. Missing or empty slots read as `None`.
    ///
    /// # Errors
    ///
    /// Returns `Io` on read failures other than not-found.
    pub fn get(&self, slot: Slot) -> Result<Option<String>, StorageError> {
        let path = self.path(slot);
        match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Ok(None),
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    /// Write a slot, creating the directory as needed.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the directory or file cannot be written.
    pub fn set(&self, slot: Slot, value: &str) -> Result<(), StorageError> {
        let path = self.path(slot);
        let io_err = |source| StorageError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut file = fs::File::create(&path).map_err(io_err)?;
        file.write_all(value.as_bytes()).map_err(io_err)?;
        tracing::debug!(slot = slot.file_name(), path = %path.display(), "stored slot");
        Ok(())
    }

    /// Remove a slot, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `Io` on removal failures other than not-found.
    pub fn remove(&self, slot: Slot) -> Result<bool, StorageError> {
        let path = self.path(slot);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    // ========================================================================
    // Typed access
    // ========================================================================

    /// Stored API key, trimmed.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the slot cannot be read.
    pub fn api_key(&self) -> Result<Option<String>, StorageError> {
        Ok(self.get(Slot::ApiKey)?.map(|k| k.trim().to_string()))
    }

    /// Cached template container.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the slot cannot be read or a corrupt entry cannot be
    /// removed.
    pub fn template(&self) -> Result<Option<Container>, StorageError> {
        let Some(text) = self.get(Slot::Template)? else {
            return Ok(None);
        };
        match document::parse(&text) {
            Ok(container) => Ok(Some(container)),
            Err(e) => {
                tracing::warn!(error = %e, "discarding corrupt template cache");
                self.remove(Slot::Template)?;
                Ok(None)
            }
        }
    }

    /// Cache `container` as the template.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save_template(&self, container: &Container) -> Result<(), StorageError> {
        let json = document::to_pretty_json(container)?;
        self.set(Slot::Template, &json)
    }
}

/// Mask all but the last four characters of a secret.
#[must_use]
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{visible}", "*".repeat(chars.len() - 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("data"));
        (dir, store)
    }

    #[test]
    fn test_slot_roundtrip() {
        let (_dir, store) = store();
        assert_eq!(store.api_key().unwrap(), None);
        store.set(Slot::ApiKey, "  key-123\n").unwrap();
        assert_eq!(store.api_key().unwrap().as_deref(), Some("key-123"));
        assert!(store.remove(Slot::ApiKey).unwrap());
        assert!(!store.remove(Slot::ApiKey).unwrap());
    }

    #[test]
    fn test_template_roundtrip() {
        let (_dir, store) = store();
        let container =
            document::parse(r#"{"exportFormatVersion": 2, "containerVersion": {"tag": []}}"#)
                .unwrap();
        store.save_template(&container).unwrap();
        assert_eq!(store.template().unwrap(), Some(container));
    }

    #[test]
    fn test_corrupt_template_is_removed() {
        let (_dir, store) = store();
        store.set(Slot::Template, "{ broken").unwrap();
        assert_eq!(store.template().unwrap(), None);
        assert!(!store.path(Slot::Template).exists());
    }

    #[test]
    fn test_template_path_override() {
        let (dir, store) = store();
        let custom = dir.path().join("elsewhere.json");
        let store = store.with_template_path(Some(custom.clone()));
        assert_eq!(store.path(Slot::Template), custom);
        assert_eq!(store.path(Slot::ApiKey), dir.path().join("data").join("api_key"));
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("abcdefgh"), "****efgh");
        assert_eq!(mask_secret("abc"), "***");
    }
}
