//! Container file I/O.
//!
//! A container file is one pretty-printed JSON document. Saving writes a
//! sibling temp file and renames it over the target.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{GtmError, Result};
use crate::model::Container;

/// Parse a container export from JSON text.
///
/// # Errors
///
/// Returns `ContainerParse` if the text is not a JSON object of the
/// expected shape.
pub fn parse(text: &str) -> Result<Container> {
    serde_json::from_str(text).map_err(|e| GtmError::ContainerParse {
        reason: e.to_string(),
    })
}

/// Load a container export from disk.
///
/// # Errors
///
/// Returns `FileNotFound` if the path does not exist, `Io` on other read
/// failures, or `ContainerParse` if the content is malformed.
pub fn load(path: &Path) -> Result<Container> {
    let text = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            GtmError::FileNotFound(path.to_path_buf())
        } else {
            GtmError::Io(e)
        }
    })?;
    let container = parse(&text)?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "loaded container");
    Ok(container)
}

/// Serialize a container as indented JSON.
///
/// # Errors
///
/// Returns `Json` if serialization fails.
pub fn to_pretty_json(container: &Container) -> Result<String> {
    Ok(serde_json::to_string_pretty(container)?)
}

/// Save a container with atomic write.
///
/// # Errors
///
/// Returns `Io` if the file cannot be written.
pub fn save(path: &Path, container: &Container) -> Result<()> {
    let json = to_pretty_json(container)?;

    let tmp_path = path.with_extension("json.tmp");
    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(json.as_bytes())?;
    writeln!(file)?;
    file.flush()?;
    drop(file);

    fs::rename(&tmp_path, path)?;
    tracing::debug!(path = %path.display(), "saved container");

    Ok(())
}
