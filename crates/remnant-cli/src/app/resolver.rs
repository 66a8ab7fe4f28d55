//! Path resolution for config, archive and settings files.

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::{default_archive_path, default_config_path, read_config, RemnantConfig};

/// Resolve the config file path, checking REMNANT_CONFIG env var first.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("REMNANT_CONFIG") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Load the config file, or defaults when none exists.
pub fn load_config() -> anyhow::Result<RemnantConfig> {
    let path = resolve_config_path()?;
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(RemnantConfig::default());
    }
    read_config(&path)
}

/// Resolve the archive path from CLI args, then config, then the XDG default.
pub fn resolve_archive_path(cli: &Cli, config: &RemnantConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = cli.archive.as_deref().filter(|p| !p.trim().is_empty()) {
        return Ok(PathBuf::from(path));
    }
    if let Some(path) = config.archive.path.as_deref() {
        return Ok(PathBuf::from(path));
    }
    default_archive_path()
}

/// Resolve the settings file: configured path, else a file beside the archive.
///
/// The default archive keeps `settings.json`. Any other archive gets
/// `<stem>.settings.json`, so archives sharing a directory keep separate PINs.
pub fn resolve_settings_path(config: &RemnantConfig, archive_path: &Path) -> PathBuf {
    if let Some(path) = config.archive.settings_path.as_deref() {
        return PathBuf::from(path);
    }
    let is_default_archive = default_archive_path()
        .map(|default| default == archive_path)
        .unwrap_or(false);
    if is_default_archive {
        return archive_path.with_file_name("settings.json");
    }
    archive_path.with_extension("settings.json")
}

/// Error message when no PIN has been set up.
pub fn missing_pin_message() -> &'static str {
    "Run:\n  remnant init\n\nOr point at an existing archive:\n  REMNANT_ARCHIVE=/path/to/archive.db remnant verify"
}
