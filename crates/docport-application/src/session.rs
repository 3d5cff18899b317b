//! Session Controller: owns the token and decides which surface is active.

use crate::events::Reload;
use docport_core::route::{Language, Route};
use docport_core::session::{AccessToken, Session};
use docport_core::storage::TokenStore;
use std::sync::Arc;

/// Owns the authentication token and the current route.
///
/// The token lives in memory and in the [`TokenStore`]; both are updated
/// together. Views receive the token by value when they are mounted and never
/// write it back.
pub struct SessionController {
    store: Arc<dyn TokenStore>,
    session: Session,
    route: Route,
    default_language: Language,
}

impl SessionController {
    /// Builds the controller from whatever token was stored last time.
    ///
    /// Sentinel values count as "no token". A storage read failure is logged
    /// and the session starts unauthenticated.
    pub fn restore(store: Arc<dyn TokenStore>, default_language: Language) -> Self {
        let token = match store.load() {
            Ok(Some(raw)) => AccessToken::from_stored(&raw),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read stored token: {}", e);
                None
            }
        };
        tracing::debug!("Session restored (authenticated: {})", token.is_some());

        let session = Session { token };
        let route = Route::resolve("/", session.is_authenticated(), &default_language);
        Self {
            store,
            session,
            route,
            default_language,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn token(&self) -> Option<&AccessToken> {
        self.session.token.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn current_route(&self) -> &Route {
        &self.route
    }

    pub fn default_language(&self) -> &Language {
        &self.default_language
    }

    /// Accepts a freshly issued token and moves to the default chat route.
    ///
    /// A failed write to durable storage is logged; the in-memory session is
    /// still authenticated.
    pub fn set_token(&mut self, token: AccessToken) -> &Route {
        if let Err(e) = self.store.save(token.as_str()) {
            tracing::warn!("Failed to persist token: {}", e);
        }
        self.session = Session::authenticated(token);
        self.route = Route::Chat(self.default_language.clone());
        tracing::info!("Signed in, navigating to {}", self.route);
        &self.route
    }

    /// Forgets the token everywhere.
    pub fn logout(&mut self) -> Reload {
        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to clear stored token: {}", e);
        }
        self.session = Session::default();
        self.route = Route::Login;
        tracing::info!("Signed out");
        Reload
    }

    /// Resolves `path` with the redirect rules and makes it current.
    pub fn navigate(&mut self, path: &str) -> &Route {
        let route = Route::resolve(path, self.is_authenticated(), &self.default_language);
        if route.path() != path.trim() {
            tracing::debug!("Redirect {} -> {}", path, route);
        }
        self.route = route;
        &self.route
    }
}
