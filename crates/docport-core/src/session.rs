//! Authentication session domain model.
//!
//! The session is nothing more than an optional bearer token. It is created
//! when login or registration succeeds, persisted across restarts through a
//! [`TokenStore`](crate::storage::TokenStore), and destroyed on logout.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stored values that mean "no token" rather than a real credential.
const SENTINEL_VALUES: [&str; 3] = ["", "null", "undefined"];

/// Opaque bearer credential issued by the portal.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Interprets a value read back from durable storage.
    ///
    /// Returns `None` for sentinel values such as `"null"` that older clients
    /// wrote instead of removing the key.
    pub fn from_stored(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if SENTINEL_VALUES.contains(&trimmed) {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// Tokens never end up in logs.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// The authentication state of the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<AccessToken>,
}

impl Session {
    pub fn authenticated(token: AccessToken) -> Self {
        Self { token: Some(token) }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Username/password pair submitted to `/token` or `/register`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Which endpoint the login form submits to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        }
    }
}
