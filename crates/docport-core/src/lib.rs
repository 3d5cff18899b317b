//! Domain layer for docport.
//!
//! Holds the data model of the document chat portal client and the traits
//! for everything that lives outside the process: the portal API, durable
//! token storage and the system clipboard. Nothing in this crate performs
//! I/O.

pub mod api;
pub mod config;
pub mod document;
pub mod error;
pub mod message;
pub mod route;
pub mod session;
pub mod storage;
pub mod webhook;

// Re-export common error type
pub use error::{PortalError, Result};
