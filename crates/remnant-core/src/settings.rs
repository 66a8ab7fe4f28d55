//! Small named settings kept outside the encrypted archive.
//!
//! Holds the installation salt, the sealed sentinel, and the "PIN exists"
//! flag. None of these values are secret on their own.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::{RemnantError, Result};

/// Base64 installation salt.
pub const SALT_SETTING: &str = "remnant_auth_salt";

/// Base64 envelope wrapping the sentinel marker.
pub const SENTINEL_SETTING: &str = "remnant_auth_sentinel";

/// Present (as `"true"`) once a PIN has been configured.
pub const HAS_PIN_SETTING: &str = "remnant_has_pin";

/// Key-value storage for named settings.
pub trait SettingsStore: Send + Sync {
    /// Read a value; `Ok(None)` if it was never written.
    fn get(&self, name: &str) -> Result<Option<String>>;

    /// Write or overwrite a value.
    fn set(&self, name: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing a missing value is not an error.
    fn remove(&self, name: &str) -> Result<()>;
}

type Values = BTreeMap<String, String>;

fn lock_values(values: &Mutex<Values>) -> Result<MutexGuard<'_, Values>> {
    values
        .lock()
        .map_err(|_| RemnantError::Storage("Settings lock poisoned".to_string()))
}

/// Volatile settings, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: Mutex<Values>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(lock_values(&self.values)?.get(name).cloned())
    }

    fn set(&self, name: &str, value: &str) -> Result<()> {
        lock_values(&self.values)?.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        lock_values(&self.values)?.remove(name);
        Ok(())
    }
}

/// Settings persisted as a JSON object in a single file.
///
/// Every write replaces the file atomically.
#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    values: Mutex<Values>,
}

impl FileSettings {
    /// Open the settings file at `path`, starting empty if it does not exist.
    pub fn open(path: &Path) -> Result<Self> {
        let values = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            serde_json::from_str(&contents)?
        } else {
            Values::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &Values) -> Result<()> {
        let contents = serde_json::to_vec_pretty(values)?;
        crate::fs::write_atomic(&self.path, &contents)
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(lock_values(&self.values)?.get(name).cloned())
    }

    // Memory only changes once the file write has succeeded.
    fn set(&self, name: &str, value: &str) -> Result<()> {
        let mut values = lock_values(&self.values)?;
        let mut updated = values.clone();
        updated.insert(name.to_string(), value.to_string());
        self.persist(&updated)?;
        *values = updated;
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        let mut values = lock_values(&self.values)?;
        if !values.contains_key(name) {
            return Ok(());
        }
        let mut updated = values.clone();
        updated.remove(name);
        self.persist(&updated)?;
        *values = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_settings() {
        let settings = MemorySettings::new();
        assert_eq!(settings.get("a").unwrap(), None);

        settings.set("a", "1").unwrap();
        assert_eq!(settings.get("a").unwrap().as_deref(), Some("1"));

        settings.remove("a").unwrap();
        settings.remove("a").unwrap();
        assert_eq!(settings.get("a").unwrap(), None);
    }

    #[test]
    fn test_file_settings_persist_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let settings = FileSettings::open(&path).unwrap();
        settings.set(HAS_PIN_SETTING, "true").unwrap();
        settings.set(SALT_SETTING, "c2FsdA==").unwrap();
        drop(settings);

        let reopened = FileSettings::open(&path).unwrap();
        assert_eq!(
            reopened.get(HAS_PIN_SETTING).unwrap().as_deref(),
            Some("true")
        );
        assert_eq!(reopened.get(SALT_SETTING).unwrap().as_deref(), Some("c2FsdA=="));
    }

    #[test]
    fn test_file_settings_remove_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = FileSettings::open(&path).unwrap();
        settings.set("x", "1").unwrap();
        settings.remove("x").unwrap();

        let reopened = FileSettings::open(&path).unwrap();
        assert_eq!(reopened.get("x").unwrap(), None);
    }

    #[test]
    fn test_failed_set_leaves_memory_unchanged() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let settings = FileSettings::open(&blocker.join("settings.json")).unwrap();
        assert!(settings.set(SALT_SETTING, "c2FsdA==").is_err());
        assert_eq!(settings.get(SALT_SETTING).unwrap(), None);
    }

    #[test]
    fn test_failed_remove_keeps_value() {
        let dir = tempdir().unwrap();
        let parent = dir.path().join("sub");
        let settings = FileSettings::open(&parent.join("settings.json")).unwrap();
        settings.set(HAS_PIN_SETTING, "true").unwrap();

        std::fs::remove_dir_all(&parent).unwrap();
        std::fs::write(&parent, "now a file").unwrap();

        assert!(settings.remove(HAS_PIN_SETTING).is_err());
        assert_eq!(
            settings.get(HAS_PIN_SETTING).unwrap().as_deref(),
            Some("true")
        );
    }

    #[test]
    fn test_corrupt_settings_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(FileSettings::open(&path).is_err());
    }
}
