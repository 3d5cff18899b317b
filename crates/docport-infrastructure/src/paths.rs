//! Unified path management for docport files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/docport/           # Config directory
//! ├── config.toml              # Portal settings ([portal] table)
//! └── session.toml             # Stored access token (mode 600)
//!
//! ~/.local/share/docport/      # Data directory
//! └── logs/                    # Rolling log files
//!     └── docport.log.YYYY-MM-DD
//! ```

use std::path::PathBuf;

const APP_DIR: &str = "docport";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for docport_core::PortalError {
    fn from(err: PathError) -> Self {
        docport_core::PortalError::config(err.to_string())
    }
}

/// Resolves docport's file locations.
///
/// With a base directory override every path lives under that directory,
/// which keeps tests and portable installs out of the user's home.
#[derive(Debug, Clone, Default)]
pub struct DocportPaths {
    base_override: Option<PathBuf>,
}

impl DocportPaths {
    pub fn new(base_override: Option<PathBuf>) -> Self {
        Self { base_override }
    }

    /// Returns the docport configuration directory (e.g. `~/.config/docport/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base_override {
            Some(base) => Ok(base.join("config")),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    /// Returns the docport data directory (e.g. `~/.local/share/docport/`).
    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base_override {
            Some(base) => Ok(base.join("data")),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    /// Returns the path to `config.toml`.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the token file.
    ///
    /// # Security Note
    ///
    /// The file holds a bearer credential; it is written with mode 600 on Unix.
    pub fn token_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("session.toml"))
    }

    /// Returns the path to the logs directory.
    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("logs"))
    }
}
