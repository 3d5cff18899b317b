//! Application layer for docport.
//!
//! The controllers here hold all view state of the portal client and know
//! nothing about how it is rendered. Every asynchronous action is split in
//! two halves:
//!
//! - a `begin_*` method that performs the synchronous state transition
//!   (control disabled, status shown) and returns a [`Request`]
//! - an `apply` method that folds the request's completion back into state
//!
//! The shell decides where requests run. The CLI spawns them on tokio and
//! feeds completions back through a channel; tests simply await them.

pub mod chat;
pub mod events;
pub mod files;
pub mod login;
pub mod portal;
pub mod session;

/// A detached network call. Owns everything it needs, so it can be spawned.
pub type Request<T> = futures::future::BoxFuture<'static, T>;

pub use chat::{ChatCompletion, ChatUpdate, ChatView};
pub use events::{Alert, DocumentChange, Reload};
pub use files::{DeleteConfirmation, FileListView, FileManager, FilesCompletion, FilesOutcome};
pub use login::LoginView;
pub use portal::{ActiveView, Portal, PortalCompletion, PortalUpdate};
pub use session::SessionController;
