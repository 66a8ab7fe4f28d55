use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use remnant_core::crypto::key::DEFAULT_ITERATIONS;
use remnant_core::crypto::pin::DEFAULT_PIN_LENGTH;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RemnantConfig {
    #[serde(default)]
    pub archive: ArchiveSection,
    #[serde(default)]
    pub security: SecuritySection,
    #[serde(default)]
    pub analysis: AnalysisSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ArchiveSection {
    pub path: Option<String>,
    pub settings_path: Option<String>,
}

/// External analyzer program, argv style (`["llm", "--json"]`).
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AnalysisSection {
    #[serde(default)]
    pub command: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SecuritySection {
    #[serde(default = "default_pin_length")]
    pub pin_length: usize,
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            pin_length: default_pin_length(),
            kdf_iterations: default_kdf_iterations(),
        }
    }
}

fn default_pin_length() -> usize {
    DEFAULT_PIN_LENGTH
}

fn default_kdf_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_archive_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("archive.db"))
}

pub fn read_config(path: &Path) -> anyhow::Result<RemnantConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("remnant"));
        }
    }
    Ok(home_dir()?.join(".config").join("remnant"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("remnant"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("remnant"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: RemnantConfig = toml::from_str("").unwrap();
        assert!(config.archive.path.is_none());
        assert_eq!(config.security.pin_length, DEFAULT_PIN_LENGTH);
        assert_eq!(config.security.kdf_iterations, DEFAULT_ITERATIONS);
        assert!(config.analysis.command.is_empty());
    }

    #[test]
    fn test_analysis_command() {
        let config: RemnantConfig =
            toml::from_str("[analysis]\ncommand = [\"llm\", \"--json\"]\n").unwrap();
        assert_eq!(config.analysis.command, vec!["llm", "--json"]);
    }

    #[test]
    fn test_partial_config() {
        let config: RemnantConfig =
            toml::from_str("[archive]\npath = \"/tmp/a.db\"\n\n[security]\npin_length = 6\n")
                .unwrap();
        assert_eq!(config.archive.path.as_deref(), Some("/tmp/a.db"));
        assert_eq!(config.security.pin_length, 6);
        assert_eq!(config.security.kdf_iterations, DEFAULT_ITERATIONS);
    }
}
