//! Filesystem utilities for atomic writes.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{RemnantError, Result};

/// Write `data` to `destination` via a synced temp file and rename.
///
/// Creates the parent directory if needed. Readers see either the old
/// contents or the new contents, never a partial file.
pub fn write_atomic(destination: &Path, data: &[u8]) -> Result<()> {
    let parent = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| RemnantError::Storage(format!("System time error: {}", e)))?
        .as_nanos();
    let filename = destination
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| RemnantError::Storage("Invalid filename".to_string()))?;
    let temp_path = parent.join(format!(".{}.{}.tmp", filename, nanos));

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    rename_with_fallback(&temp_path, destination)?;
    Ok(())
}

/// Rename, retrying after removing the destination on platforms where rename
/// refuses to overwrite. The temp file is removed if both attempts fail.
fn rename_with_fallback(temp_path: &Path, destination: &Path) -> io::Result<()> {
    if let Err(initial_err) = fs::rename(temp_path, destination) {
        let _ = fs::remove_file(destination);
        fs::rename(temp_path, destination).map_err(|retry_err| {
            let _ = fs::remove_file(temp_path);
            io::Error::new(
                retry_err.kind(),
                format!(
                    "Atomic rename failed (initial: {}, retry: {})",
                    initial_err, retry_err
                ),
            )
        })?;
    }
    Ok(())
}
