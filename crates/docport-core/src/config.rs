use serde::{Deserialize, Serialize};

use crate::error::{PortalError, Result};
use crate::route::Language;

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigRoot {
    #[serde(default)]
    pub portal: PortalSettings,
}

/// The `[portal]` table as written by the user. Every key is optional.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PortalSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl PortalSettings {
    /// Overlays `other` on top of `self`; keys set in `other` win.
    pub fn merged_with(self, other: PortalSettings) -> PortalSettings {
        PortalSettings {
            api_base_url: other.api_base_url.or(self.api_base_url),
            default_language: other.default_language.or(self.default_language),
            request_timeout_secs: other.request_timeout_secs.or(self.request_timeout_secs),
        }
    }
}

/// Fully resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    /// Base URL of the portal API, without a trailing slash.
    pub api_base_url: String,
    pub default_language: Language,
    /// `None` means requests wait indefinitely.
    pub request_timeout_secs: Option<u64>,
}

impl PortalConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: normalize_base_url(&api_base_url.into()),
            default_language: Language::default(),
            request_timeout_secs: None,
        }
    }

    /// Validates merged settings.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::Config` when the base URL is missing or is not
    /// an http(s) URL, or when the default language is not a single path
    /// segment.
    pub fn from_settings(settings: PortalSettings) -> Result<Self> {
        let raw_url = settings
            .api_base_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                PortalError::config(
                    "API base URL is not set (use --api-base-url, DOCPORT_API_BASE_URL or [portal].api_base_url)",
                )
            })?;
        let api_base_url = normalize_base_url(&raw_url);
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(PortalError::config(format!(
                "API base URL must start with http:// or https://, got '{}'",
                api_base_url
            )));
        }

        let default_language = match settings.default_language {
            Some(raw) => Language::parse(&raw).ok_or_else(|| {
                PortalError::config(format!("Invalid default language '{}'", raw))
            })?,
            None => Language::default(),
        };

        Ok(Self {
            api_base_url,
            default_language,
            request_timeout_secs: settings.request_timeout_secs,
        })
    }

    /// Joins an endpoint path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}
