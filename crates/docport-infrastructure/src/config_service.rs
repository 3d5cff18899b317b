//! Configuration loading.
//!
//! Settings come from three layers, lowest precedence first:
//! 1. `~/.config/docport/config.toml` (`[portal]` table)
//! 2. Environment variables (`DOCPORT_API_BASE_URL`, `DOCPORT_LANGUAGE`)
//! 3. Explicit overrides from the command line

use crate::paths::DocportPaths;
use crate::storage::AtomicTomlFile;
use docport_core::Result;
use docport_core::config::{ConfigRoot, PortalConfig, PortalSettings};
use std::path::PathBuf;

pub const ENV_API_BASE_URL: &str = "DOCPORT_API_BASE_URL";
pub const ENV_LANGUAGE: &str = "DOCPORT_LANGUAGE";

/// Loads and validates [`PortalConfig`].
pub struct ConfigService {
    config_path: PathBuf,
}

impl ConfigService {
    pub fn new(paths: &DocportPaths) -> Result<Self> {
        Ok(Self::with_path(paths.config_file()?))
    }

    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Reads the `[portal]` table; a missing file yields empty settings.
    pub fn file_settings(&self) -> Result<PortalSettings> {
        let root = AtomicTomlFile::<ConfigRoot>::new(self.config_path.clone())
            .load()?
            .unwrap_or_default();
        Ok(root.portal)
    }

    /// Builds settings from an environment lookup function.
    pub fn env_settings<F>(lookup: F) -> PortalSettings
    where
        F: Fn(&str) -> Option<String>,
    {
        PortalSettings {
            api_base_url: lookup(ENV_API_BASE_URL).filter(|v| !v.trim().is_empty()),
            default_language: lookup(ENV_LANGUAGE).filter(|v| !v.trim().is_empty()),
            request_timeout_secs: None,
        }
    }

    /// Merges file, environment and override settings and validates them.
    pub fn resolve<F>(&self, lookup: F, overrides: PortalSettings) -> Result<PortalConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings = self
            .file_settings()?
            .merged_with(Self::env_settings(lookup))
            .merged_with(overrides);
        let config = PortalConfig::from_settings(settings)?;
        tracing::info!(
            "Resolved portal config: base_url={}, default_language={}",
            config.api_base_url,
            config.default_language
        );
        Ok(config)
    }

    /// Convenience wrapper over [`ConfigService::resolve`] using the process
    /// environment.
    pub fn load(&self, overrides: PortalSettings) -> Result<PortalConfig> {
        self.resolve(|key| std::env::var(key).ok(), overrides)
    }
}
