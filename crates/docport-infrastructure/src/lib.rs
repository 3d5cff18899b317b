//! Infrastructure layer for docport.
//!
//! Implements the domain traits against the outside world: the portal's
//! HTTP API, the token file, configuration files, local files selected for
//! upload and the system clipboard.

pub mod clipboard;
pub mod config_service;
pub mod dto;
pub mod http_api;
pub mod local_files;
pub mod paths;
pub mod storage;

pub use crate::clipboard::SystemClipboard;
pub use crate::config_service::ConfigService;
pub use crate::http_api::HttpPortalApi;
pub use crate::paths::DocportPaths;
pub use crate::storage::FileTokenStore;
