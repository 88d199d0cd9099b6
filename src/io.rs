//! Atomic JSON persistence helpers

use crate::PruneError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Serialize a value to JSON, writing to a temp file in the target
/// directory and renaming into place so readers never see a partial file.
pub(crate) fn write_json_atomic<P: AsRef<Path>, T: Serialize>(
    path: P,
    value: &T,
) -> Result<(), PruneError> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, value)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| PruneError::Io(e.error))?;
    Ok(())
}

/// Read and deserialize a JSON file
pub(crate) fn read_json<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> Result<T, PruneError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
