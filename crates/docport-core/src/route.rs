//! Client-side routes.
//!
//! The client knows three routes: `/login`, `/:lang` (the chat surface, where
//! the segment is the language sent with every question) and a catch-all
//! that redirects based on whether a session exists.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_LANGUAGE: &str = "en";

const LOGIN_SEGMENT: &str = "login";

/// Locale code taken from the chat route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language(String);

impl Language {
    /// Accepts a single, non-empty path segment other than `login`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.contains('/')
            || trimmed.contains(char::is_whitespace)
            || trimmed.eq_ignore_ascii_case(LOGIN_SEGMENT)
        {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Language {
    fn default() -> Self {
        Self(DEFAULT_LANGUAGE.to_string())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resolved route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Chat(Language),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Login => format!("/{}", LOGIN_SEGMENT),
            Route::Chat(lang) => format!("/{}", lang),
        }
    }

    /// Resolves `path` against the session state, applying redirects.
    ///
    /// - `/login` while authenticated goes to the default chat route.
    /// - `/:lang` while unauthenticated goes to `/login`.
    /// - Anything else goes to the default chat route or `/login`.
    pub fn resolve(path: &str, authenticated: bool, default_language: &Language) -> Route {
        let home = || {
            if authenticated {
                Route::Chat(default_language.clone())
            } else {
                Route::Login
            }
        };

        let segments: Vec<&str> = path
            .trim()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        match segments.as_slice() {
            [LOGIN_SEGMENT] => home(),
            [segment] => match Language::parse(segment) {
                Some(lang) if authenticated => Route::Chat(lang),
                _ => home(),
            },
            _ => home(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn en() -> Language {
        Language::default()
    }

    #[test]
    fn test_login_route() {
        assert_eq!(Route::resolve("/login", false, &en()), Route::Login);
        assert_eq!(
            Route::resolve("/login", true, &en()),
            Route::Chat(Language::default())
        );
    }

    #[test]
    fn test_language_route() {
        let fr = Language::parse("fr").unwrap();
        assert_eq!(Route::resolve("/fr", true, &en()), Route::Chat(fr));
        assert_eq!(Route::resolve("/fr", false, &en()), Route::Login);
    }

    #[test]
    fn test_catch_all_redirects() {
        assert_eq!(Route::resolve("/", false, &en()), Route::Login);
        assert_eq!(Route::resolve("", true, &en()), Route::Chat(en()));
        assert_eq!(Route::resolve("/a/b", true, &en()), Route::Chat(en()));
        assert_eq!(Route::resolve("/a/b", false, &en()), Route::Login);
    }

    #[test]
    fn test_default_language_is_configurable() {
        let de = Language::parse("de").unwrap();
        assert_eq!(Route::resolve("/login", true, &de), Route::Chat(de));
    }

    #[test]
    fn test_paths() {
        assert_eq!(Route::Login.path(), "/login");
        assert_eq!(Route::Chat(en()).path(), "/en");
    }

    #[test]
    fn test_language_parse_rejects_bad_segments() {
        assert!(Language::parse("").is_none());
        assert!(Language::parse("a/b").is_none());
        assert!(Language::parse("e n").is_none());
        assert!(Language::parse("login").is_none());
        assert!(Language::parse("LOGIN").is_none());
    }
}
