//! Application context for the Remnant CLI.
//!
//! Bundles CLI arguments with the lazily-loaded config file.

use std::io::IsTerminal;
use std::path::PathBuf;

use once_cell::unsync::OnceCell;

use remnant_core::crypto::{KdfParams, PinPolicy, Session};
use remnant_core::settings::FileSettings;
use remnant_core::storage::SqliteArchive;
use remnant_core::PinAuthority;

use crate::cli::Cli;
use crate::config::RemnantConfig;

use super::resolver::{load_config, resolve_archive_path, resolve_settings_path};
use super::unlock::unlock_with_retry;

pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<RemnantConfig>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    pub fn no_input(&self) -> bool {
        self.cli.no_input
    }

    /// Prompts are allowed only on a TTY without `--no-input`.
    pub fn interactive(&self) -> bool {
        std::io::stdin().is_terminal() && !self.cli.no_input
    }

    /// Get the config, loading it lazily if needed.
    pub fn config(&self) -> anyhow::Result<&RemnantConfig> {
        self.config.get_or_try_init(load_config)
    }

    pub fn archive_path(&self) -> anyhow::Result<PathBuf> {
        resolve_archive_path(self.cli, self.config()?)
    }

    pub fn settings_path(&self) -> anyhow::Result<PathBuf> {
        let archive_path = self.archive_path()?;
        Ok(resolve_settings_path(self.config()?, &archive_path))
    }

    pub fn pin_policy(&self) -> anyhow::Result<PinPolicy> {
        Ok(PinPolicy {
            length: self.config()?.security.pin_length,
        })
    }

    /// PIN authority over the settings file, with the configured KDF cost.
    pub fn authority(&self) -> anyhow::Result<PinAuthority<FileSettings>> {
        let params = KdfParams::new(self.config()?.security.kdf_iterations)?;
        let settings_path = self.settings_path()?;
        let settings = FileSettings::open(&settings_path)?;
        Ok(PinAuthority::with_params(settings, params))
    }

    pub fn open_store(&self) -> anyhow::Result<SqliteArchive> {
        let path = self.archive_path()?;
        SqliteArchive::open(&path)
            .map_err(|e| anyhow::anyhow!("Failed to open archive {}: {}", path.display(), e))
    }

    /// Verify the PIN and return an unlocked session.
    pub fn unlock(&self) -> anyhow::Result<Session> {
        unlock_with_retry(self)
    }
}
