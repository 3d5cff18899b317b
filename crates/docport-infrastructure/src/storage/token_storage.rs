//! Token file storage.
//!
//! Persists the session token to `~/.config/docport/session.toml` under the
//! fixed key `token`.

use super::atomic_toml::AtomicTomlFile;
use crate::paths::DocportPaths;
use docport_core::Result;
use docport_core::storage::TokenStore;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

/// [`TokenStore`] backed by a private TOML file.
///
/// Responsibilities:
/// - Read the raw stored token (sentinel handling is up to the caller)
/// - Write the token atomically with owner-only permissions
/// - Delete the file on logout
pub struct FileTokenStore {
    file: AtomicTomlFile<StoredSession>,
}

impl FileTokenStore {
    /// Creates a store at the default location.
    pub fn new(paths: &DocportPaths) -> Result<Self> {
        Ok(Self::with_path(paths.token_file()?))
    }

    /// Creates a store at a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path).private(),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        self.file.path()
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.file.load()?.and_then(|stored| stored.token))
    }

    fn save(&self, token: &str) -> Result<()> {
        self.file.save(&StoredSession {
            token: Some(token.to_string()),
        })?;
        tracing::debug!("Stored session token at {}", self.file.path().display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.file.remove()?;
        tracing::debug!("Removed session token at {}", self.file.path().display());
        Ok(())
    }
}
