//! Durable client-side storage and other local side effects.

use crate::error::Result;

/// Durable storage for the single session token.
///
/// Access is synchronous; the token is read once at startup and written on
/// login and logout only.
pub trait TokenStore: Send + Sync {
    /// Returns the raw stored value, if any. Sentinel interpretation is left
    /// to [`AccessToken::from_stored`](crate::session::AccessToken::from_stored).
    fn load(&self) -> Result<Option<String>>;

    fn save(&self, token: &str) -> Result<()>;

    /// Removes the stored token. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;
}

/// System clipboard used by the webhook "copy" action.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}
