//! Common file system operations with unified error handling

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::Result;
use crate::error::fs::{read_failed, write_failed};

/// Read a file, returning `None` if it does not exist
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(read_failed(path, e)),
    }
}

/// Write a file atomically
///
/// The content goes to a temporary file in the same directory which is then
/// renamed into place, so readers never observe a partially written file.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| write_failed(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| write_failed(path, e))?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| write_failed(path, e))?;
    tmp.persist(path).map_err(|e| write_failed(path, e.error))?;
    Ok(())
}

/// Write a file only if its content differs; returns whether it was written
pub fn write_if_changed(path: &Path, content: &str) -> Result<bool> {
    if read_optional(path)?.as_deref() == Some(content) {
        return Ok(false);
    }
    write_atomic(path, content)?;
    Ok(true)
}
