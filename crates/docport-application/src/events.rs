//! Values the controllers hand back to the shell.

use docport_core::PortalError;
use docport_core::document::Document;
use std::fmt;

/// A blocking notification the user has to acknowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert(pub String);

impl Alert {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The user's document set changed on the server.
///
/// Observed by the chat view, which refreshes the file list and, for
/// deletions, drops the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentChange {
    Uploaded { filename: String },
    Deleted { document: Document },
}

/// Returned by logout. The shell must drop every controller and build a
/// fresh portal; nothing from the old session may survive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "the portal has to be rebuilt after logout"]
pub struct Reload;

/// Detail text for a request the portal rejected.
///
/// `None` when the request never got an answer. A rejection without a
/// readable detail falls back to the status code.
pub(crate) fn rejection_detail(err: &PortalError) -> Option<String> {
    match err {
        PortalError::Server {
            detail: Some(detail),
            ..
        } => Some(detail.clone()),
        PortalError::Server { status, .. } => Some(format!("HTTP {}", status)),
        _ => None,
    }
}
